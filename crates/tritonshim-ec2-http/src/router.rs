//! EC2 action router.
//!
//! The EC2 query protocol names the operation in the `Action` parameter,
//! carried in the query string or the form body:
//!
//! ```text
//! GET /?Action=DescribeInstances&Version=2016-11-15
//! ```
//!
//! The set of actions is closed. Anything else is answered with a protocol
//! error before authentication runs, so no resource data is exposed.

use tritonshim_ec2_model::{Ec2Error, Ec2Operation, Ec2Params};

/// Resolve the EC2 operation named by the request parameters.
///
/// # Errors
///
/// `MissingAction` (406) when `Action` is absent or empty, `InvalidAction`
/// (405) when it names an unsupported operation.
pub fn resolve_operation(params: &Ec2Params) -> Result<Ec2Operation, Ec2Error> {
    let action = params.action().ok_or_else(Ec2Error::missing_action)?;
    Ec2Operation::from_name(action).ok_or_else(|| Ec2Error::invalid_action(action))
}
