// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod byte_size;

pub use byte_size::parse_byte_size;

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Process-wide push defaults
///
/// Immutable once loaded; shared read-only by every concurrent push and
/// overridable per call through `PushOptions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushConfig {
    /// Minimum body size in bytes worth compressing (default: 1024).
    /// Accepts integers or strings such as "1kb".
    #[serde(
        default = "default_threshold",
        deserialize_with = "byte_size::deserialize"
    )]
    pub threshold: u64,

    /// Priority used when a push does not set one, 0-7 (default: 7, lowest)
    #[serde(default = "default_priority")]
    pub default_priority: u8,

    /// Gzip level used when compression options carry none (default: 6)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Read size for stream and file bodies (default: 16KB)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_threshold() -> u64 {
    1024 // 1KB
}

fn default_priority() -> u8 {
    7
}

fn default_compression_level() -> u32 {
    6
}

fn default_chunk_size() -> usize {
    16 * 1024 // default HTTP/2 max frame size
}

impl Default for PushConfig {
    fn default() -> Self {
        PushConfig {
            threshold: default_threshold(),
            default_priority: default_priority(),
            compression_level: default_compression_level(),
            chunk_size: default_chunk_size(),
            log_format: LogFormat::default(),
        }
    }
}

impl PushConfig {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        let config: PushConfig =
            serde_yaml::from_str(&substituted).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.default_priority > 7 {
            return Err(format!(
                "default_priority must be 0-7, got {}",
                self.default_priority
            ));
        }
        if self.compression_level > 9 {
            return Err(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            ));
        }
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        Ok(())
    }
}
