//! Content-type filtering for push compression
//!
//! The default classifier answers "is this MIME type worth gzipping?":
//! - Compressible: text/*, JSON, XML, JavaScript, SVG, wasm, legacy font formats
//! - Non-compressible: other image/*, video/*, audio/*, archives, woff/woff2

use std::fmt;
use std::sync::Arc;

/// Types outside the text/ and +json/+xml families that still compress well
const COMPRESSIBLE_TYPES: &[&str] = &[
    "application/json",
    "application/javascript",
    "application/x-javascript",
    "application/ecmascript",
    "application/xml",
    "application/wasm",
    "application/manifest+json",
    "application/vnd.ms-fontobject",
    "application/x-font-ttf",
    "image/svg+xml",
    "font/ttf",
    "font/otf",
];

/// Determines if a push body should be compressed based on its content type
///
/// Parameters such as `; charset=utf-8` are ignored; matching is
/// case-insensitive. An unknown content type is never compressed.
pub fn is_compressible(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type else {
        return false;
    };
    let essence = ct.split(';').next().unwrap_or("").trim().to_lowercase();
    if essence.is_empty() {
        return false;
    }

    if essence.starts_with("text/") {
        return true;
    }
    if essence.ends_with("+json") || essence.ends_with("+xml") {
        return true;
    }
    COMPRESSIBLE_TYPES.contains(&essence.as_str())
}

/// Caller-replaceable content-type predicate
#[derive(Clone)]
pub struct ContentFilter(Arc<dyn Fn(Option<&str>) -> bool + Send + Sync>);

impl ContentFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
    {
        ContentFilter(Arc::new(predicate))
    }

    pub fn accepts(&self, content_type: Option<&str>) -> bool {
        (self.0)(content_type)
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        ContentFilter::new(is_compressible)
    }
}

impl fmt::Debug for ContentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentFilter(..)")
    }
}
