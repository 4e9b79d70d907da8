//! Push request construction
//!
//! A [`PushRequest`] is built once per push from [`PushOptions`], validated
//! synchronously and never mutated afterwards except for releasing its body.

use bytes::Bytes;
use http::header::{HeaderName, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

use crate::compression::{self, CompressOptions, CompressSetting, Compression, ContentFilter};
use crate::config::PushConfig;
use crate::error::ValidationError;
use crate::mime::content_type_for;

/// Lowest priority; also the default
pub const LOWEST_PRIORITY: u8 = 7;

/// Readable body source
pub type BodyReader = Box<dyn AsyncRead + Send + Unpin>;

/// Body supplied by the caller
pub enum Body {
    Buffer(Bytes),
    Text(String),
    Stream(BodyReader),
}

impl Body {
    pub fn stream<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Body::Stream(Box::new(reader))
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Buffer(b)
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Buffer(Bytes::from(v))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Buffer(b) => write!(f, "Buffer({} bytes)", b.len()),
            Body::Text(s) => write!(f, "Text({} bytes)", s.len()),
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Resolved body of a push request
pub(crate) enum BodyDescriptor {
    Empty,
    Buffer(Bytes),
    Text(String),
    Stream(BodyReader),
    File(PathBuf),
}

/// Shape of a request body, for logging and inspection
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Empty,
    Buffer,
    Text,
    Stream,
    File,
}

impl BodyDescriptor {
    pub(crate) fn kind(&self) -> BodyKind {
        match self {
            BodyDescriptor::Empty => BodyKind::Empty,
            BodyDescriptor::Buffer(_) => BodyKind::Buffer,
            BodyDescriptor::Text(_) => BodyKind::Text,
            BodyDescriptor::Stream(_) => BodyKind::Stream,
            BodyDescriptor::File(_) => BodyKind::File,
        }
    }
}

/// Named options for a single push
///
/// ```
/// use h2push::PushOptions;
///
/// let options = PushOptions::new()
///     .header("content-type", "text/css")
///     .priority(3)
///     .body("body { margin: 0 }");
/// ```
#[derive(Debug, Default)]
pub struct PushOptions {
    path: Option<String>,
    headers: HeaderMap,
    raw_headers: Vec<(String, String)>,
    priority: Option<u8>,
    body: Option<Body>,
    filename: Option<PathBuf>,
    filter: Option<ContentFilter>,
    threshold: Option<u64>,
    compress: CompressSetting,
}

impl PushOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the path given to `push`
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Merge a prepared header map
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Add one header; names are case-insensitive and validated on push
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.raw_headers.push((name.into(), value.into()));
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn stream<R>(self, reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        self.body(Body::stream(reader))
    }

    /// Read the body from a file when the push is sent
    pub fn filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(ContentFilter::new(predicate));
        self
    }

    pub fn threshold(mut self, bytes: u64) -> Self {
        self.threshold = Some(bytes);
        self
    }

    /// `compress(false)` disables compression; `compress(true)` restores the default
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = if enabled {
            CompressSetting::Auto
        } else {
            CompressSetting::Disabled
        };
        self
    }

    pub fn compress_with(mut self, options: CompressOptions) -> Self {
        self.compress = CompressSetting::With(options);
        self
    }
}

/// Immutable descriptor of one push
pub struct PushRequest {
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) priority: u8,
    pub(crate) body: BodyDescriptor,
    pub(crate) content_type: Option<String>,
    pub(crate) length: Option<u64>,
    pub(crate) compression: Compression,
}

impl PushRequest {
    /// Validate and normalize `options` for a push of `path`
    pub fn new(
        path: &str,
        options: PushOptions,
        config: &PushConfig,
    ) -> Result<Self, ValidationError> {
        let PushOptions {
            path: path_override,
            headers: header_map,
            raw_headers,
            priority,
            body,
            filename,
            filter,
            threshold,
            compress,
        } = options;

        let path = path_override.unwrap_or_else(|| path.to_string());
        if path.is_empty() {
            return Err(ValidationError::MissingPath);
        }

        let priority = priority.unwrap_or(config.default_priority);
        if priority > LOWEST_PRIORITY {
            return Err(ValidationError::PriorityOutOfRange(priority));
        }

        if let CompressSetting::With(CompressOptions { level: Some(level) }) = compress {
            CompressOptions::with_level(level)
                .map_err(|e| ValidationError::InvalidCompression(e.to_string()))?;
        }

        let mut headers = header_map;
        for (name, value) in raw_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ValidationError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(&value).map_err(|e| ValidationError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        let (body, length) = match (body, filename) {
            (Some(Body::Buffer(bytes)), _) => {
                let length = bytes.len() as u64;
                set_default_length(&mut headers, length);
                let body = if bytes.is_empty() {
                    BodyDescriptor::Empty
                } else {
                    BodyDescriptor::Buffer(bytes)
                };
                (body, Some(length))
            }
            (Some(Body::Text(text)), _) => {
                let length = text.len() as u64;
                set_default_length(&mut headers, length);
                let body = if text.is_empty() {
                    BodyDescriptor::Empty
                } else {
                    BodyDescriptor::Text(text)
                };
                (body, Some(length))
            }
            (Some(Body::Stream(reader)), _) => {
                (BodyDescriptor::Stream(reader), declared_length(&headers)?)
            }
            (None, Some(filename)) => (
                BodyDescriptor::File(absolute(&filename)),
                declared_length(&headers)?,
            ),
            (None, None) => return Err(ValidationError::MissingBody),
        };

        let content_type = match headers.get(CONTENT_TYPE) {
            Some(value) => value.to_str().ok().map(str::to_string),
            None => {
                let looked_up = content_type_for(&path);
                if let Some(ct) = &looked_up {
                    if let Ok(value) = HeaderValue::from_str(ct) {
                        headers.insert(CONTENT_TYPE, value);
                    }
                }
                looked_up
            }
        };

        let filter = filter.unwrap_or_default();
        let decision = compression::decide(
            compress,
            content_type.as_deref(),
            length,
            threshold.unwrap_or(config.threshold),
            headers.contains_key(CONTENT_ENCODING),
            &filter,
        );
        let mut state = Compression::Unset;
        state.resolve(decision);
        compression::policy::apply(&state, &mut headers);

        tracing::debug!(
            path = %path,
            priority = priority,
            body = ?body.kind(),
            content_type = ?content_type,
            length = ?length,
            compress = state.is_enabled(),
            "push request prepared"
        );

        Ok(PushRequest {
            path,
            headers,
            priority,
            body,
            content_type,
            length,
            compression: state,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Final headers sent with the push promise
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn body_kind(&self) -> BodyKind {
        self.body.kind()
    }

    /// Drop a stream body that will never be sent. Other bodies hold no
    /// open resource. Returns true if a stream was released.
    pub(crate) fn release_stream(&mut self) -> bool {
        if !matches!(self.body, BodyDescriptor::Stream(_)) {
            return false;
        }
        drop(std::mem::replace(&mut self.body, BodyDescriptor::Empty));
        tracing::debug!(path = %self.path, "released unsent body stream");
        true
    }
}

impl fmt::Debug for PushRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushRequest")
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("priority", &self.priority)
            .field("body", &self.body.kind())
            .field("content_type", &self.content_type)
            .field("length", &self.length)
            .field("compression", &self.compression)
            .finish()
    }
}

/// Caller-supplied content-length wins over the computed one
fn set_default_length(headers: &mut HeaderMap, length: u64) {
    if !headers.contains_key(CONTENT_LENGTH) {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    }
}

fn declared_length(headers: &HeaderMap) -> Result<Option<u64>, ValidationError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| ValidationError::InvalidContentLength("non-ASCII value".to_string()))?;
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidContentLength(raw.to_string()))
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
