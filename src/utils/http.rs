//! Retrying HTTP client used by the JSON-RPC transport.
//!
//! Transient failures (timeouts, connection resets, 5xx) are retried on the same
//! endpoint with exponential backoff. Whether a response instead moves the
//! transport to another endpoint is decided by the strategy passed to
//! [`RetryConfig::build_client`].

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
	policies::ExponentialBackoff, Jitter, RetryTransientMiddleware, RetryableStrategy,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Randomization of the delay between two attempts
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BackoffJitter {
	/// Exact exponential delays
	None,
	/// Delays drawn uniformly below the exponential bound
	#[default]
	Full,
}

impl From<BackoffJitter> for Jitter {
	fn from(jitter: BackoffJitter) -> Self {
		match jitter {
			BackoffJitter::None => Jitter::None,
			BackoffJitter::Full => Jitter::Full,
		}
	}
}

/// Backoff policy for transient request failures
///
/// Missing fields take their [`Default`] value when deserialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct RetryConfig {
	/// Retries after the first attempt
	pub max_retries: u32,
	/// Growth factor of the delay between attempts
	pub base_for_backoff: u32,
	/// Delay before the first retry
	pub initial_backoff: Duration,
	/// Upper bound of any delay
	pub max_backoff: Duration,
	pub jitter: BackoffJitter,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_retries: 3,
			base_for_backoff: 2,
			initial_backoff: Duration::from_millis(250),
			max_backoff: Duration::from_secs(10),
			jitter: BackoffJitter::Full,
		}
	}
}

impl RetryConfig {
	fn policy(&self) -> ExponentialBackoff {
		ExponentialBackoff::builder()
			.jitter(self.jitter.into())
			.base(self.base_for_backoff)
			.retry_bounds(self.initial_backoff, self.max_backoff)
			.build_with_max_retries(self.max_retries)
	}

	/// Wraps `base` in a middleware retrying what `strategy` marks as transient
	pub fn build_client<S>(&self, base: reqwest::Client, strategy: S) -> ClientWithMiddleware
	where
		S: RetryableStrategy + Send + Sync + 'static,
	{
		ClientBuilder::new(base)
			.with(RetryTransientMiddleware::new_with_policy_and_strategy(
				self.policy(),
				strategy,
			))
			.build()
	}
}
