//! EC2 model types for the Triton shim.
//!
//! Only the subset of the EC2 API needed to answer the supported `Describe*`
//! actions is modelled. Types are hand-written; the query protocol carries
//! flat `Key.N=value` parameters, which [`params::Ec2Params`] decodes.
#![allow(clippy::doc_markdown)]

pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod params;
pub mod types;

pub use error::{Ec2Error, Ec2ErrorCode, ErrorKind};
pub use operations::Ec2Operation;
pub use params::Ec2Params;

/// XML namespace of the emulated EC2 API version.
pub const EC2_XML_NAMESPACE: &str = "http://ec2.amazonaws.com/doc/2016-11-15/";
