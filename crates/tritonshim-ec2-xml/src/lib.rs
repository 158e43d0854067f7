//! EC2 XML serialization for the Triton shim.
//!
//! - [`Ec2Serialize`] and [`to_xml`] turn output records into response bodies
//! - [`error_to_xml`] formats the error envelope
//!
//! EC2 query-protocol conventions:
//!
//! - Namespace: `http://ec2.amazonaws.com/doc/2016-11-15/`
//! - Element names are lowerCamelCase; list entries are `<item>`
//! - Booleans: lowercase `true`/`false`
//! - Every success response carries `<requestId>`

pub mod error;
pub mod serialize;

pub use error::{XmlError, error_to_xml};
pub use serialize::{Ec2Serialize, to_xml};
