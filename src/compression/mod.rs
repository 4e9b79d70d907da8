//! Compression module for pushed resources
//!
//! This module provides push body compression support with:
//! - A first-match-wins policy deciding whether a body gets gzipped
//! - A replaceable content-type filter (default: compressible MIME classifier)
//! - One-shot and streaming gzip encoders
//!
//! # Module Organization
//!
//! - [`policy`] - Compression decision and header rewriting
//! - [`filter`] - Content-type classification
//! - [`options`] - Encoder options and the per-request compression state
//! - [`compress`] - Gzip encoding
//! - [`error`] - Error types

pub mod compress;
pub mod error;
pub mod filter;
pub mod options;
pub mod policy;

// Re-export public types
pub use compress::{gunzip, gzip, GzipStream};
pub use error::CompressionError;
pub use filter::{is_compressible, ContentFilter};
pub use options::{CompressOptions, CompressSetting, Compression};
pub use policy::{decide, DEFAULT_THRESHOLD, GZIP_ENCODING};
