// Error types module

use std::sync::Arc;
use thiserror::Error;

use crate::compression::CompressionError;
use crate::transport::TransportError;

/// Rejections raised while building a push request, before any I/O
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("path must be defined")]
    MissingPath,

    #[error("priority must be between 0-7, got {0}")]
    PriorityOutOfRange(u8),

    #[error("you must either set a body or a filename")]
    MissingBody,

    #[error("invalid content-length header: {0}")]
    InvalidContentLength(String),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid compression options: {0}")]
    InvalidCompression(String),
}

/// Centralized error type for a push
///
/// Cloneable so the acknowledge and send completions can both report the
/// same failure.
#[derive(Error, Debug, Clone)]
pub enum PushError {
    #[error("invalid push request: {0}")]
    Validation(#[from] ValidationError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("compression error: {0}")]
    Compression(#[from] CompressionError),

    /// File open or source read failure
    #[error("body source error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("channel closed before the body was fully sent")]
    ClosedPrematurely,

    #[error("configuration error: {0}")]
    Config(String),

    /// `push` was called outside a tokio runtime
    #[error("push must be called from within a tokio runtime")]
    NoRuntime,

    /// Push task went away without settling (runtime shutdown)
    #[error("push aborted before settling")]
    Aborted,
}

impl From<std::io::Error> for PushError {
    fn from(err: std::io::Error) -> Self {
        PushError::Io(Arc::new(err))
    }
}

impl PushError {
    /// True for errors raised synchronously while building the request
    pub fn is_validation(&self) -> bool {
        matches!(self, PushError::Validation(_))
    }
}
