//! Network configuration loading and validation.
//!
//! Networks live in `config/networks`, one file per network.

use std::time::Duration;
use url::Url;

use crate::models::{config::error::ConfigError, ConfigLoader, Network};

/// Shortest block time accepted; anything faster is a unit mistake
const MIN_BLOCK_TIME_MS: u64 = 100;

impl Network {
	/// Returns the poll interval as a [`Duration`]
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	/// Number of blocks the chain is expected to produce during one poll interval.
	///
	/// A `max_backfill_depth` below this value means that every tick skips blocks
	/// even when the watcher keeps up.
	pub fn expected_blocks_per_poll(&self) -> u64 {
		if self.block_time_ms == 0 {
			return 0;
		}
		self.poll_interval_ms.div_ceil(self.block_time_ms)
	}

	fn check_endpoints(&self) -> Result<(), ConfigError> {
		if self.rpc_urls.is_empty() {
			return Err(ConfigError::invalid(format!(
				"Network '{}' has no RPC URL",
				self.slug
			)));
		}

		for endpoint in &self.rpc_urls {
			if endpoint.type_ != "rpc" {
				return Err(ConfigError::invalid(format!(
					"Unsupported RPC URL type '{}' for {}",
					endpoint.type_, endpoint.url
				)));
			}

			match Url::parse(&endpoint.url).map(|url| url.scheme().to_string()) {
				Ok(scheme) if scheme == "https" => {}
				Ok(scheme) if scheme == "http" => tracing::warn!(
					"Network '{}' uses an insecure RPC URL: {}",
					self.slug,
					endpoint.url
				),
				_ => {
					return Err(ConfigError::invalid(format!(
						"RPC URL '{}' must be an http:// or https:// URL",
						endpoint.url
					)))
				}
			}

			if endpoint.weight > 100 {
				return Err(ConfigError::invalid(format!(
					"RPC URL weight {} of {} is above 100",
					endpoint.weight, endpoint.url
				)));
			}
		}

		Ok(())
	}

	fn check_polling(&self) -> Result<(), ConfigError> {
		if self.block_time_ms < MIN_BLOCK_TIME_MS {
			return Err(ConfigError::invalid(format!(
				"block_time_ms must be at least {}",
				MIN_BLOCK_TIME_MS
			)));
		}
		if self.poll_interval_ms == 0 {
			return Err(ConfigError::invalid("poll_interval_ms must be greater than 0"));
		}
		if self.max_backfill_depth == 0 {
			return Err(ConfigError::invalid("max_backfill_depth must be greater than 0"));
		}

		let expected_blocks = self.expected_blocks_per_poll();
		if self.max_backfill_depth < expected_blocks {
			tracing::warn!(
				"Network '{}' max_backfill_depth ({}) below the {} blocks expected per poll \
				 interval; blocks will be skipped on every tick",
				self.slug,
				self.max_backfill_depth,
				expected_blocks
			);
		}

		Ok(())
	}
}

impl ConfigLoader for Network {
	const DEFAULT_DIR: &'static str = "config/networks";

	/// Rejects networks a watcher could not poll
	///
	/// Plain `http://` endpoints are accepted with a warning.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.name.trim().is_empty() {
			return Err(ConfigError::invalid("Network name is required"));
		}

		let slug_is_valid = !self.slug.is_empty()
			&& self
				.slug
				.chars()
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
		if !slug_is_valid {
			return Err(ConfigError::invalid(format!(
				"Slug '{}' must contain only lowercase letters, numbers, and underscores",
				self.slug
			)));
		}

		self.check_endpoints()?;
		self.check_polling()
	}

	fn unique_fields(&self) -> Vec<(&'static str, &str)> {
		vec![("name", self.name.as_str()), ("slug", self.slug.as_str())]
	}
}
