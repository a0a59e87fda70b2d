//! Error types for the g7xx crate.

/// Errors that can occur when configuring a codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// An invalid input was provided to a codec function.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// A convenience Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
