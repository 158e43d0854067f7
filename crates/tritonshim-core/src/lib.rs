//! Core types and configuration for the Triton EC2 shim.
//!
//! This crate provides the building blocks shared by every layer of the shim:
//! environment-driven configuration, the tenant context a request is served
//! under, and the core error type.

mod config;
mod error;
mod types;

pub use config::{LogFormat, ShimConfig, UpstreamConfig};
pub use error::{ShimError, ShimResult};
pub use types::{AccountUuid, TenantContext};
