//! Compression decision for a push body
//!
//! Rules, first match wins:
//! 1. `compress: false` → disabled
//! 2. `content-encoding` already present → disabled (never double-encode)
//! 3. known length below the threshold → disabled
//! 4. content-type filter rejects the type → disabled
//! 5. otherwise → enabled with the caller's options (or defaults)

use http::header::{CONTENT_ENCODING, CONTENT_LENGTH};
use http::{HeaderMap, HeaderValue};

use super::filter::ContentFilter;
use super::options::{CompressSetting, Compression};

/// Content-Encoding value written when compression is enabled
pub const GZIP_ENCODING: &str = "gzip";

/// Minimum body size worth compressing (1KB)
pub const DEFAULT_THRESHOLD: u64 = 1024;

/// Decide whether a push body should be gzip-encoded
pub fn decide(
    setting: CompressSetting,
    content_type: Option<&str>,
    length: Option<u64>,
    threshold: u64,
    already_encoded: bool,
    filter: &ContentFilter,
) -> Compression {
    if setting == CompressSetting::Disabled {
        return Compression::Disabled;
    }
    if already_encoded {
        return Compression::Disabled;
    }
    if matches!(length, Some(len) if len < threshold) {
        return Compression::Disabled;
    }
    if !filter.accepts(content_type) {
        return Compression::Disabled;
    }

    match setting {
        CompressSetting::With(options) => Compression::Enabled(options),
        _ => Compression::Enabled(Default::default()),
    }
}

/// Rewrite outgoing headers for a resolved decision
///
/// Enabled compression sets `content-encoding: gzip` and drops
/// `content-length`, since the encoded size is not known up front.
pub fn apply(decision: &Compression, headers: &mut HeaderMap) {
    if decision.is_enabled() {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static(GZIP_ENCODING));
        headers.remove(CONTENT_LENGTH);
    }
}
