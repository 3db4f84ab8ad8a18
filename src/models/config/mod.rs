//! Configuration loading and validation.
//!
//! A configuration kind lives in one directory, one JSON document per file. The
//! loader reads every `*.json` file in name order, validates each document and
//! rejects values that must be unique across files.

#![allow(clippy::result_large_err)]

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};

use crate::utils::normalize_string;

mod error;
mod network_config;

pub use error::ConfigError;

/// A configuration document stored as JSON files
#[async_trait]
pub trait ConfigLoader: DeserializeOwned + Send {
	/// Directory read when the caller does not name one
	const DEFAULT_DIR: &'static str;

	/// Checks the values of a freshly parsed document
	fn validate(&self) -> Result<(), ConfigError>;

	/// Fields that must differ between files, compared after normalization
	fn unique_fields(&self) -> Vec<(&'static str, &str)>;

	/// Parses and validates one file
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read(path)
			.await
			.map_err(|e| ConfigError::unreadable(path, e))?;
		let config: Self =
			serde_json::from_slice(&raw).map_err(|e| ConfigError::malformed(path, e))?;

		config.validate()?;
		Ok(config)
	}

	/// Loads every document of `path` (default [`Self::DEFAULT_DIR`]), keyed by file stem
	async fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let dir = path.unwrap_or_else(|| Path::new(Self::DEFAULT_DIR));
		let mut loaded = Vec::new();
		let mut owners: HashMap<(&'static str, String), PathBuf> = HashMap::new();

		for file in json_files(dir).await? {
			let config = Self::load_from_path(&file).await?;

			for (field, value) in config.unique_fields() {
				let key = (field, normalize_string(value));
				if let Some(first) = owners.get(&key) {
					return Err(ConfigError::duplicate(field, value, first, &file));
				}
				owners.insert(key, file.clone());
			}

			let stem = file
				.file_stem()
				.map(|stem| stem.to_string_lossy().into_owned())
				.unwrap_or_default();
			loaded.push((stem, config));
		}

		Ok(loaded.into_iter().collect())
	}
}

/// Lists the `*.json` files of `dir`, sorted by name
async fn json_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
	let mut entries = tokio::fs::read_dir(dir)
		.await
		.map_err(|e| ConfigError::unreadable(dir, e))?;

	let mut files = Vec::new();
	while let Some(entry) = entries
		.next_entry()
		.await
		.map_err(|e| ConfigError::unreadable(dir, e))?
	{
		let path = entry.path();
		if path
			.extension()
			.is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
		{
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}
