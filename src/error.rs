// In: src/error.rs

//! This module defines the single, unified error type for the featurizer runtime.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every fallible operation in the crate returns `Result<T, FeaturizerError>`.
//! At the C ABI the error is flattened into an `ErrorInfo` handle carrying the
//! rendered message and the coarse `ErrorKind` below.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeaturizerError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// A null pointer, empty buffer, zero handle, malformed configuration
    /// or out-of-range construction parameter.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A handle that is not present in the registry.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A lifecycle operation called in the wrong training state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An archive that is truncated, carries an unsupported version or
    /// contains bytes that do not decode to a valid value.
    #[error("Invalid buffer: {0}")]
    Decoding(String),

    /// A failure reported by an algorithm while training.
    #[error("Training failed: {0}")]
    Training(String),

    #[error("Internal logic error (this is a bug): {0}")]
    Internal(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error from the Serde JSON library, raised while parsing configuration.
    #[error("Serde JSON error: {0}")]
    Config(#[from] serde_json::Error),

    /// An error originating from the I/O subsystem (e.g. opening a log file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The coarse error category exposed across the C ABI.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument = 1,
    NotFound = 2,
    InvalidState = 3,
    Decoding = 4,
    Training = 5,
    Internal = 6,
}

impl FeaturizerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeaturizerError::InvalidArgument(_) | FeaturizerError::Config(_) => {
                ErrorKind::InvalidArgument
            }
            FeaturizerError::NotFound(_) => ErrorKind::NotFound,
            FeaturizerError::InvalidState(_) => ErrorKind::InvalidState,
            FeaturizerError::Decoding(_) => ErrorKind::Decoding,
            FeaturizerError::Training(_) => ErrorKind::Training,
            FeaturizerError::Internal(_) | FeaturizerError::Io(_) => ErrorKind::Internal,
        }
    }

    // Shorthands used at the call sites that build messages from literals.
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        FeaturizerError::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        FeaturizerError::InvalidState(msg.into())
    }

    pub(crate) fn decoding(msg: impl Into<String>) -> Self {
        FeaturizerError::Decoding(msg.into())
    }
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<std::str::Utf8Error> for FeaturizerError {
    fn from(err: std::str::Utf8Error) -> Self {
        FeaturizerError::Decoding(format!("string is not valid UTF-8: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for FeaturizerError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        FeaturizerError::Decoding(format!("string is not valid UTF-8: {}", err))
    }
}
