/// Compression option and decision types
use serde::{Deserialize, Serialize};

use super::error::CompressionError;

/// Highest level flate2 accepts
pub const MAX_LEVEL: u32 = 9;

/// Encoder options for a single push
///
/// An empty value (`level: None`) means "use the configured default level".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressOptions {
    /// Gzip level (0-9)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

impl CompressOptions {
    /// Options with an explicit gzip level
    pub fn with_level(level: u32) -> Result<Self, CompressionError> {
        if level > MAX_LEVEL {
            return Err(CompressionError::InvalidLevel(level));
        }
        Ok(CompressOptions { level: Some(level) })
    }

    /// Level to hand to the encoder, falling back to `default_level`
    pub fn effective_level(&self, default_level: u32) -> u32 {
        self.level.unwrap_or(default_level).min(MAX_LEVEL)
    }
}

/// What the caller asked for via the `compress` option
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressSetting {
    /// No preference: let the policy decide with empty options
    #[default]
    Auto,
    /// `compress: false`
    Disabled,
    /// `compress: { ... }`: let the policy decide, encode with these options
    With(CompressOptions),
}

/// Compression state of a push request
///
/// Starts `Unset` and is resolved exactly once, before the channel opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    Unset,
    Disabled,
    Enabled(CompressOptions),
}

impl Compression {
    /// Record a policy decision. Returns false (and changes nothing) if the
    /// state was already resolved.
    pub fn resolve(&mut self, decision: Compression) -> bool {
        match self {
            Compression::Unset if decision != Compression::Unset => {
                *self = decision;
                true
            }
            _ => false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Compression::Enabled(_))
    }

    pub fn options(&self) -> Option<CompressOptions> {
        match self {
            Compression::Enabled(options) => Some(*options),
            _ => None,
        }
    }
}
