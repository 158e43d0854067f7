//! Error types for the shim core.

/// Core error type for shim infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum ShimError {
    /// Invalid Triton account UUID.
    #[error("invalid Triton account UUID: {0}")]
    InvalidAccount(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for shim core operations.
pub type ShimResult<T> = Result<T, ShimError>;
