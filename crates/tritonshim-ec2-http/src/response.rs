//! EC2 response serialization and error formatting.

use tritonshim_auth::{AuthError, CredentialStoreError};
use tritonshim_ec2_model::{Ec2Error, Ec2ErrorCode};
use tritonshim_ec2_xml::error_to_xml;

use crate::body::Ec2ResponseBody;

/// Content type for EC2 XML responses.
pub const CONTENT_TYPE: &str = "text/xml;charset=UTF-8";

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "TritonShim";

/// Header carrying the gateway request id.
pub const REQUEST_ID_HEADER: &str = "x-amzn-requestid";

/// Convert an [`Ec2Error`] into a complete HTTP error response.
///
/// The body carries only the code, the message and the request id. The
/// error's source is never serialized.
#[must_use]
pub fn error_to_response(error: &Ec2Error, request_id: &str) -> http::Response<Ec2ResponseBody> {
    let xml = error_to_xml(error.code.as_str(), &error.message, request_id);

    http::Response::builder()
        .status(error.status_code)
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(Ec2ResponseBody::from_bytes(xml))
        .expect("valid error response")
}

/// Build a success response from serialized XML.
#[must_use]
pub fn xml_response(xml: Vec<u8>, request_id: &str) -> http::Response<Ec2ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(Ec2ResponseBody::from_bytes(xml))
        .expect("valid XML response")
}

/// Map a verifier rejection to its wire error. Always 401.
#[must_use]
pub fn auth_error(err: &AuthError) -> Ec2Error {
    let code = match err {
        AuthError::MissingAuthentication => Ec2ErrorCode::MissingAuthenticationToken,
        AuthError::MalformedAuthorization(_) => Ec2ErrorCode::IncompleteSignature,
        AuthError::UnknownAccessKey(_) => Ec2ErrorCode::InvalidClientTokenId,
        AuthError::MissingOrInvalidTimestamp => Ec2ErrorCode::AuthFailure,
        AuthError::SignatureMismatch => Ec2ErrorCode::SignatureDoesNotMatch,
    };
    Ec2Error::with_message(code, err.to_string())
}

/// Map an account-service failure to a 500 `Unavailable`.
///
/// The client sees a generic message; the detail stays in the source chain.
#[must_use]
pub fn credential_store_error(err: CredentialStoreError) -> Ec2Error {
    Ec2Error::unavailable("Credential service is unavailable").with_source(err)
}
