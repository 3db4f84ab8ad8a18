//! Configuration error types.
//!
//! Loading never logs: the binary decides whether a bad network file stops it
//! (normal start) or is only reported (`--check`).

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::{collections::HashMap, path::Path};
use thiserror::Error as ThisError;

/// Why a configuration directory or file could not be used
#[derive(ThisError, Debug)]
pub enum ConfigError {
	/// A file or directory could not be read
	#[error("Cannot read configuration: {0}")]
	Unreadable(ErrorContext),

	/// A file is not a JSON document of the expected shape
	#[error("Malformed configuration: {0}")]
	Malformed(ErrorContext),

	/// A document parsed but its values cannot be used
	#[error("Invalid configuration: {0}")]
	Invalid(ErrorContext),
}

fn at(path: &Path) -> Option<HashMap<String, String>> {
	Some(HashMap::from([(
		"path".to_string(),
		path.display().to_string(),
	)]))
}

impl ConfigError {
	/// `path` could not be read
	pub fn unreadable(path: &Path, cause: std::io::Error) -> Self {
		Self::Unreadable(ErrorContext::new(cause.to_string(), Some(Box::new(cause)), at(path)))
	}

	/// `path` is not valid JSON for the expected document
	pub fn malformed(path: &Path, cause: serde_json::Error) -> Self {
		Self::Malformed(ErrorContext::new(cause.to_string(), Some(Box::new(cause)), at(path)))
	}

	/// A value of a parsed document is unusable
	pub fn invalid(msg: impl Into<String>) -> Self {
		Self::Invalid(ErrorContext::new(msg, None, None))
	}

	/// `field` holds `value` in both `first` and `second`
	pub fn duplicate(field: &str, value: &str, first: &Path, second: &Path) -> Self {
		Self::Invalid(ErrorContext::new(
			format!("Duplicate {} '{}'", field, value),
			None,
			Some(HashMap::from([
				("first".to_string(), first.display().to_string()),
				("second".to_string(), second.display().to_string()),
			])),
		))
	}

	/// The context shared by every variant
	pub fn context(&self) -> &ErrorContext {
		match self {
			Self::Unreadable(ctx) | Self::Malformed(ctx) | Self::Invalid(ctx) => ctx,
		}
	}
}

impl TraceableError for ConfigError {
	fn trace_id(&self) -> String {
		self.context().trace_id.clone()
	}
}
