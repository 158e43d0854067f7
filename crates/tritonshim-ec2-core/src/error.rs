//! Mapping of translator-side failures to EC2 errors.

use tritonshim_ec2_model::{Ec2Error, ec2_error};
use tritonshim_ec2_xml::XmlError;
use tritonshim_triton::ProviderError;

/// Map a backing-provider failure to an [`Ec2Error`].
///
/// Upstream detail is kept as the error source for logs. Clients only see a
/// generic message, except for rejected arguments, which they caused.
pub fn provider_error_to_ec2(service: &str, err: ProviderError) -> Ec2Error {
    let mapped = match &err {
        ProviderError::InvalidArgument(msg) => Ec2Error::invalid_parameter_value(msg.clone()),
        ProviderError::Unavailable(_) | ProviderError::NotFound(_) => {
            Ec2Error::unavailable(format!("{service} is unavailable"))
        }
    };
    mapped.with_source(err)
}

/// Map a serialization failure to an internal error.
pub fn xml_error_to_ec2(err: XmlError) -> Ec2Error {
    ec2_error!(InternalError, "Failed to serialize response").with_source(err)
}
