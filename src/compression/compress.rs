//! Gzip encoding for push bodies
use std::io::{Read, Write};

use bytes::Bytes;
use flate2::write::GzEncoder;

use super::error::CompressionError;
use super::options::MAX_LEVEL;

/// One-shot gzip for buffer and text bodies
///
/// # Arguments
/// * `data` - Input data to compress
/// * `level` - Gzip level (0-9)
pub fn gzip(data: &[u8], level: u32) -> Result<Bytes, CompressionError> {
    let mut encoder = GzipStream::new(level)?;
    let mut out = encoder.push(data)?.to_vec();
    out.extend_from_slice(&encoder.finish()?);
    Ok(Bytes::from(out))
}

/// Decompress gzip data, refusing output larger than `max_size`
///
/// Receiving side of [`gzip`]: hosts and tests use it to check pushed payloads.
pub fn gunzip(data: &[u8], max_size: usize) -> Result<Vec<u8>, CompressionError> {
    let decoder = flate2::read::GzDecoder::new(data);
    let mut reader = decoder.take(max_size.saturating_add(1) as u64);
    let mut result = Vec::new();
    reader
        .read_to_end(&mut result)
        .map_err(|e| CompressionError::DecompressionFailed(e.to_string()))?;

    if result.len() > max_size {
        return Err(CompressionError::DecompressionFailed(format!(
            "decompressed size exceeds maximum allowed size {}",
            max_size
        )));
    }
    Ok(result)
}

/// Incremental gzip encoder sitting between a body source and the channel
///
/// Each `push` returns whatever compressed output the encoder has produced
/// so far (possibly empty); `finish` flushes the trailer.
pub struct GzipStream {
    encoder: GzEncoder<Vec<u8>>,
}

impl GzipStream {
    pub fn new(level: u32) -> Result<Self, CompressionError> {
        if level > MAX_LEVEL {
            return Err(CompressionError::InvalidLevel(level));
        }
        Ok(GzipStream {
            encoder: GzEncoder::new(Vec::new(), flate2::Compression::new(level)),
        })
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<Bytes, CompressionError> {
        self.encoder.write_all(chunk)?;
        Ok(Bytes::from(std::mem::take(self.encoder.get_mut())))
    }

    pub fn finish(self) -> Result<Bytes, CompressionError> {
        Ok(Bytes::from(self.encoder.finish()?))
    }
}
