//! EC2 error types.
//!
//! EC2 reports errors in an XML envelope carrying a short `Code`, a human
//! `Message` and the request id. [`Ec2ErrorCode`] is the machine-stable code;
//! [`ErrorKind`] groups codes into the four failure classes the gateway
//! distinguishes.

use std::fmt;

/// Failure class of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or unsupported request shape (4xx).
    Protocol,
    /// Signature or credential failure (401).
    Authentication,
    /// A backing service is unreachable or answered garbage (500).
    Upstream,
    /// Unexpected failure inside the shim (500).
    Internal,
}

/// Error codes the shim can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Ec2ErrorCode {
    /// No `Action` parameter.
    MissingAction,
    /// `Action` names an unsupported operation.
    InvalidAction,
    /// The HTTP method is neither GET nor POST.
    UnsupportedHttpVerb,
    /// The request path is not the service root.
    UnknownPath,
    /// A parameter value is malformed.
    InvalidParameterValue,
    /// Parameters that cannot be used together.
    InvalidParameterCombination,
    /// No `Authorization` header.
    MissingAuthenticationToken,
    /// The `Authorization` header is malformed.
    IncompleteSignature,
    /// Authentication failed for another reason (timestamp).
    AuthFailure,
    /// The access key id is not known for this account.
    InvalidClientTokenId,
    /// The signature does not match.
    SignatureDoesNotMatch,
    /// A backing service is unavailable.
    Unavailable,
    /// Internal error.
    #[default]
    InternalError,
}

impl Ec2ErrorCode {
    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingAction => "MissingAction",
            Self::InvalidAction => "InvalidAction",
            Self::UnsupportedHttpVerb => "UnsupportedHttpVerb",
            Self::UnknownPath => "UnknownPath",
            Self::InvalidParameterValue => "InvalidParameterValue",
            Self::InvalidParameterCombination => "InvalidParameterCombination",
            Self::MissingAuthenticationToken => "MissingAuthenticationToken",
            Self::IncompleteSignature => "IncompleteSignature",
            Self::AuthFailure => "AuthFailure",
            Self::InvalidClientTokenId => "InvalidClientTokenId",
            Self::SignatureDoesNotMatch => "SignatureDoesNotMatch",
            Self::Unavailable => "Unavailable",
            Self::InternalError => "InternalError",
        }
    }

    /// Failure class of this code.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingAction
            | Self::InvalidAction
            | Self::UnsupportedHttpVerb
            | Self::UnknownPath
            | Self::InvalidParameterValue
            | Self::InvalidParameterCombination => ErrorKind::Protocol,
            Self::MissingAuthenticationToken
            | Self::IncompleteSignature
            | Self::AuthFailure
            | Self::InvalidClientTokenId
            | Self::SignatureDoesNotMatch => ErrorKind::Authentication,
            Self::Unavailable => ErrorKind::Upstream,
            Self::InternalError => ErrorKind::Internal,
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::MissingAction => http::StatusCode::NOT_ACCEPTABLE,
            Self::InvalidAction | Self::UnsupportedHttpVerb => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::UnknownPath => http::StatusCode::NOT_FOUND,
            Self::InvalidParameterValue | Self::InvalidParameterCombination => {
                http::StatusCode::BAD_REQUEST
            }
            Self::MissingAuthenticationToken
            | Self::IncompleteSignature
            | Self::AuthFailure
            | Self::InvalidClientTokenId
            | Self::SignatureDoesNotMatch => http::StatusCode::UNAUTHORIZED,
            Self::Unavailable | Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Ec2ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An EC2 error response.
#[derive(Debug)]
pub struct Ec2Error {
    /// The error code.
    pub code: Ec2ErrorCode,
    /// A human-readable error message. Never contains secrets.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any. Logged, never sent to clients.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Ec2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ec2Error({}): {}", self.code, self.message)
    }
}

impl std::error::Error for Ec2Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl Ec2Error {
    /// Create an error whose message is the code itself.
    #[must_use]
    pub fn new(code: Ec2ErrorCode) -> Self {
        Self::with_message(code, code.as_str())
    }

    /// Create an error with a custom message.
    #[must_use]
    pub fn with_message(code: Ec2ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Failure class of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// `Action` parameter absent.
    #[must_use]
    pub fn missing_action() -> Self {
        Self::with_message(
            Ec2ErrorCode::MissingAction,
            "Action parameter must be provided",
        )
    }

    /// `Action` parameter names an unsupported operation.
    #[must_use]
    pub fn invalid_action(action: &str) -> Self {
        Self::with_message(
            Ec2ErrorCode::InvalidAction,
            format!("Action {action} is not supported"),
        )
    }

    /// Method other than GET or POST.
    #[must_use]
    pub fn unsupported_http_verb(method: &str) -> Self {
        Self::with_message(
            Ec2ErrorCode::UnsupportedHttpVerb,
            format!("HTTP method {method} is not supported"),
        )
    }

    /// Path other than the service root.
    #[must_use]
    pub fn unknown_path(path: &str) -> Self {
        Self::with_message(Ec2ErrorCode::UnknownPath, format!("No such path: {path}"))
    }

    /// Malformed parameter value.
    #[must_use]
    pub fn invalid_parameter_value(message: impl Into<String>) -> Self {
        Self::with_message(Ec2ErrorCode::InvalidParameterValue, message)
    }

    /// Backing service unavailable.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_message(Ec2ErrorCode::Unavailable, message)
    }

    /// Internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(Ec2ErrorCode::InternalError, message)
    }
}

/// Create an `Ec2Error` from an error code.
///
/// # Examples
///
/// ```
/// use tritonshim_ec2_model::ec2_error;
/// use tritonshim_ec2_model::error::Ec2ErrorCode;
///
/// let err = ec2_error!(AuthFailure);
/// assert_eq!(err.code, Ec2ErrorCode::AuthFailure);
///
/// let err = ec2_error!(InvalidParameterValue, "bad index");
/// assert_eq!(err.message, "bad index");
/// ```
#[macro_export]
macro_rules! ec2_error {
    ($code:ident) => {
        $crate::error::Ec2Error::new($crate::error::Ec2ErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::Ec2Error::with_message($crate::error::Ec2ErrorCode::$code, $msg)
    };
}
