//! Error types for request authentication.
//!
//! [`AuthError`] is a terminal rejection of the current request. It is never
//! downgraded to a warning and never retried. [`CredentialStoreError`] is kept
//! separate because an outage of the account service is not an attack and is
//! reported with a different status class.

/// Reasons a request can be rejected by the signature verifier.
///
/// Messages never include secret material or the raw `Authorization` value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The request carries no `Authorization` header.
    #[error("Request is missing Authorization header")]
    MissingAuthentication,

    /// The `Authorization` header could not be parsed.
    #[error("Authorization header is malformed: {0}")]
    MalformedAuthorization(String),

    /// The claimed access key id is not in the tenant's credential set.
    #[error("The access key ID {0} does not exist")]
    UnknownAccessKey(String),

    /// The `x-amz-date` header is absent, unparsable, or outside the skew policy.
    #[error("Request timestamp is missing or invalid")]
    MissingOrInvalidTimestamp,

    /// The recomputed signature differs from the one supplied.
    #[error("The request signature we calculated does not match the signature you provided")]
    SignatureMismatch,
}

impl AuthError {
    /// Stable reason name used in audit records.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingAuthentication => "MissingAuthentication",
            Self::MalformedAuthorization(_) => "MalformedAuthorization",
            Self::UnknownAccessKey(_) => "UnknownAccessKey",
            Self::MissingOrInvalidTimestamp => "MissingOrInvalidTimestamp",
            Self::SignatureMismatch => "SignatureMismatch",
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedAuthorization(detail.into())
    }
}

/// Failures of the account service while listing access keys.
#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    /// The account service could not be reached or answered with a failure status.
    #[error("account service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The account service answered but its response could not be decoded.
    #[error("account service returned an undecodable response: {0}")]
    UpstreamProtocolError(String),
}
