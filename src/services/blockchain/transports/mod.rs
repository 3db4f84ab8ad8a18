//! JSON-RPC over HTTP with endpoint rotation.
//!
//! A network lists several RPC URLs. [`HttpTransportClient`] sends every request
//! to one active endpoint and lets [`EndpointManager`] move to a fallback when the
//! active one is rate limited or unreachable. Transient failures are first retried
//! on the same endpoint by the middleware built from
//! [`RetryConfig`](crate::utils::RetryConfig).

mod endpoint_manager;
mod error;
mod http;

pub use endpoint_manager::EndpointManager;
pub use error::TransportError;
pub use http::{net_version_check, HttpTransportClient};

use reqwest::StatusCode;
use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde::Serialize;
use serde_json::{json, Value};

/// True for statuses that move requests to a fallback endpoint instead of retrying
pub fn rotates_endpoint(status: StatusCode) -> bool {
	status == StatusCode::TOO_MANY_REQUESTS
}

/// Sends JSON-RPC requests to a node
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	/// URL requests are currently sent to
	async fn active_url(&self) -> String;

	/// Calls `method` and returns the whole response object, `result` included
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize;

	/// JSON-RPC 2.0 envelope of a call
	fn request_body<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value>,
	{
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params.map(Into::into),
		})
	}
}

/// Retries what the default strategy retries, except rate limiting
///
/// A 429 is answered by rotating endpoints, so retrying it on the same endpoint
/// only delays the rotation.
pub struct RetryUnlessRateLimited;

impl RetryableStrategy for RetryUnlessRateLimited {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(response) if rotates_endpoint(response.status()) => Some(Retryable::Fatal),
			Ok(response) => default_on_request_success(response),
			Err(error) => default_on_request_failure(error),
		}
	}
}
