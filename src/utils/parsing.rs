//! Parsing of command line values and lookup keys.

use byte_unit::Byte;
use std::str::FromStr;

/// Parses a log file size such as "500MB" or "1GiB" into bytes.
///
/// Used as the clap value parser of `--log-max-size`.
pub fn parse_string_to_bytes_size(s: &str) -> Result<u64, String> {
	Byte::from_str(s)
		.map(|size| size.as_u64())
		.map_err(|e| format!("Invalid size format: '{}'. Error: {}", s, e))
}

/// Canonical form of a lookup key: trimmed and lowercased.
///
/// Hex addresses are case-insensitive, so a checksummed address and its lowercase
/// form map to the same store entry. Network slugs go through the same function.
pub fn normalize_string(input: &str) -> String {
	input.trim().to_lowercase()
}
