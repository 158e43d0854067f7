//! Triton internal API collaborators for the EC2 shim.
//!
//! - [`client`] - the [`ComputeClient`] seam and its VMAPI/IMGAPI/PAPI implementation
//! - [`accesskeys`] - the account-service backed [`HttpAccessKeyStore`]
//! - [`model`] - JSON wire types of the internal APIs

pub mod accesskeys;
pub mod client;
pub mod error;
pub mod model;

#[cfg(test)]
mod testing;

pub use accesskeys::HttpAccessKeyStore;
pub use client::{
    ComputeClient, ImageFilter, PackageFilter, TritonEndpoints, TritonHttpClient, VmFilter,
    build_http_client,
};
pub use error::ProviderError;
