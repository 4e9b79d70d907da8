//! Human-readable byte sizes ("1kb", "2.5mb", "512")

use serde::{Deserialize, Deserializer};

/// Parse a byte size. Units are binary (1kb = 1024) and case-insensitive;
/// a bare number is bytes.
pub fn parse_byte_size(input: &str) -> Result<u64, String> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err("byte size cannot be empty".to_string());
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let unit = unit.trim();
    if number.is_empty() {
        return Err(format!("invalid byte size '{}'", input));
    }

    let multiplier: u64 = match unit {
        "" | "b" => 1,
        "kb" => 1 << 10,
        "mb" => 1 << 20,
        "gb" => 1 << 30,
        "tb" => 1 << 40,
        "pb" => 1 << 50,
        other => return Err(format!("unknown byte size unit '{}' in '{}'", other, input)),
    };

    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid byte size '{}'", input))?;
    Ok((value * multiplier as f64).floor() as u64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawByteSize {
    Bytes(u64),
    Text(String),
}

/// serde adapter accepting either an integer or a size string
pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawByteSize::deserialize(deserializer)? {
        RawByteSize::Bytes(n) => Ok(n),
        RawByteSize::Text(s) => parse_byte_size(&s).map_err(serde::de::Error::custom),
    }
}
