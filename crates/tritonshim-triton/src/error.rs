//! Provider error type.

/// Failure of a backing-provider call.
///
/// Messages carry upstream detail for operators; the gateway never forwards
/// them to clients verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The service could not be reached, timed out, failed, or answered with
    /// a body that could not be decoded.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service rejected the request parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status with the service's error message.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            404 => Self::NotFound(message),
            400 | 409 | 422 => Self::InvalidArgument(message),
            _ => Self::Unavailable(format!("HTTP {status}: {message}")),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Unavailable(format!("undecodable response: {err}"))
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_classify_http_statuses() {
        assert!(matches!(
            ProviderError::from_status(reqwest::StatusCode::NOT_FOUND, "gone".to_owned()),
            ProviderError::NotFound(_)
        ));
        assert!(matches!(
            ProviderError::from_status(reqwest::StatusCode::CONFLICT, "bad".to_owned()),
            ProviderError::InvalidArgument(_)
        ));
        assert!(matches!(
            ProviderError::from_status(reqwest::StatusCode::BAD_GATEWAY, "down".to_owned()),
            ProviderError::Unavailable(_)
        ));
    }
}
