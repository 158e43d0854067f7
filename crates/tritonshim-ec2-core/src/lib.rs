//! Resource translator for the Triton EC2 shim.
//!
//! Turns authenticated EC2 actions into Triton queries and maps the returned
//! VMs, images and packages into EC2 records.
#![allow(clippy::doc_markdown)]

pub mod error;
pub mod handler;
pub mod mapping;
pub mod provider;

#[cfg(test)]
mod testing;

pub use handler::TritonEc2Handler;
pub use provider::TritonEc2Provider;
