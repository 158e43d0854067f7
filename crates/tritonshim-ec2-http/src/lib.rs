//! EC2 HTTP service layer for the Triton shim.
//!
//! This crate implements the EC2 query protocol over hyper:
//!
//! - **Router**: Resolves the operation from the `Action` parameter
//! - **Handler trait**: Boundary between HTTP and the resource translator
//! - **Service**: Hyper `Service` running the request pipeline
//! - **Response helpers**: XML success/error response formatting

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::Ec2ResponseBody;
pub use dispatch::Ec2Handler;
pub use service::{Ec2HttpConfig, Ec2HttpService};
