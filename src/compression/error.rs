/// Compression error types
use thiserror::Error;

/// Errors that can occur while gzip-encoding a push body
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressionError {
    /// Encoder failed while consuming input or flushing output
    #[error("Compression failed: {0}")]
    CompressionFailed(String),
    /// Decoder rejected the payload or it exceeded the size cap
    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),
    /// Compression level outside the 0-9 range gzip understands
    #[error("Invalid compression level: {0} (expected 0-9)")]
    InvalidLevel(u32),
}

impl From<std::io::Error> for CompressionError {
    fn from(err: std::io::Error) -> Self {
        CompressionError::CompressionFailed(err.to_string())
    }
}
