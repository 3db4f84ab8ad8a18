//! Active endpoint selection and rotation.
//!
//! Requests go to the active endpoint. When it is rate limited or unreachable, the
//! first fallback that answers the check request becomes active, the failed URL is
//! queued behind the remaining fallbacks and the request is sent again.

use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::services::blockchain::transports::{rotates_endpoint, TransportError};

#[derive(Debug)]
struct Endpoints {
	active: String,
	/// Most preferred first
	fallbacks: Vec<String>,
}

/// Endpoint state shared by every clone of a transport
#[derive(Clone, Debug)]
pub struct EndpointManager {
	endpoints: Arc<RwLock<Endpoints>>,
	client: ClientWithMiddleware,
	check_request: Arc<Value>,
	/// Held for a whole rotation so concurrent failures rotate once
	rotation: Arc<Mutex<()>>,
}

impl EndpointManager {
	/// # Arguments
	/// * `client` - Retrying client used for requests and connection checks
	/// * `active_url` - Endpoint used first
	/// * `fallback_urls` - Endpoints to rotate to, most preferred first
	/// * `check_request` - JSON-RPC payload a fallback must answer with a 2xx status
	pub fn new(
		client: ClientWithMiddleware,
		active_url: &str,
		fallback_urls: Vec<String>,
		check_request: Value,
	) -> Self {
		Self {
			endpoints: Arc::new(RwLock::new(Endpoints {
				active: active_url.to_string(),
				fallbacks: fallback_urls,
			})),
			client,
			check_request: Arc::new(check_request),
			rotation: Arc::new(Mutex::new(())),
		}
	}

	pub async fn active_url(&self) -> String {
		self.endpoints.read().await.active.clone()
	}

	/// Endpoints tried, in order, when the active one fails
	pub async fn fallback_urls(&self) -> Vec<String> {
		self.endpoints.read().await.fallbacks.clone()
	}

	/// Sends the check request to `url`; any 2xx answer passes
	pub async fn check(&self, url: &str) -> Result<(), anyhow::Error> {
		self.client
			.post(url)
			.json(self.check_request.as_ref())
			.send()
			.await
			.with_context(|| format!("Failed to connect to {}", url))?
			.error_for_status()
			.with_context(|| format!("Failed to connect to {}", url))?;
		Ok(())
	}

	/// Makes the first fallback answering the check request active
	///
	/// Does nothing when another request already rotated away from `failed_url`.
	/// Returns the URL that is active afterwards.
	pub async fn rotate_from(&self, failed_url: &str) -> Result<String, TransportError> {
		let _rotating = self.rotation.lock().await;

		let candidates = {
			let endpoints = self.endpoints.read().await;
			if endpoints.active != failed_url {
				return Ok(endpoints.active.clone());
			}
			endpoints.fallbacks.clone()
		};

		if candidates.is_empty() {
			return Err(TransportError::no_fallback(
				"No fallback URLs available",
				failed_url,
				None,
			));
		}

		let mut last_check = None;
		for candidate in candidates {
			if let Err(e) = self.check(&candidate).await {
				tracing::warn!("Fallback URL '{}' is not usable: {:#}", candidate, e);
				last_check = Some(e);
				continue;
			}

			let mut endpoints = self.endpoints.write().await;
			endpoints.fallbacks.retain(|url| *url != candidate);
			let previous = std::mem::replace(&mut endpoints.active, candidate.clone());
			endpoints.fallbacks.push(previous);

			tracing::info!("Rotated RPC endpoint from '{}' to '{}'", failed_url, candidate);
			return Ok(candidate);
		}

		Err(TransportError::no_fallback(
			"All fallback URLs failed the connection check",
			failed_url,
			last_check,
		))
	}

	/// Sends a JSON-RPC request, rotating endpoints until one answers
	///
	/// HTTP errors other than rate limiting are returned without rotating. A
	/// response carrying an `error` object becomes [`TransportError::JsonRpc`].
	pub async fn send(&self, request: &Value) -> Result<Value, TransportError> {
		let body = serde_json::to_vec(request).map_err(|e| {
			TransportError::invalid_payload("Failed to serialize request JSON", e, None)
		})?;

		loop {
			let url = self.active_url().await;
			let sent = self
				.client
				.post(&url)
				.header(CONTENT_TYPE, "application/json")
				.body(body.clone())
				.send()
				.await;

			let response = match sent {
				Ok(response) => response,
				Err(unreachable) => {
					tracing::warn!("RPC endpoint '{}' unreachable: {}", url, unreachable);
					match self.rotate_from(&url).await {
						Ok(_) => continue,
						Err(rotation) => {
							return Err(TransportError::unreachable(&url, unreachable, Some(rotation)))
						}
					}
				}
			};

			let status = response.status();
			if status.is_success() {
				let value: Value = response.json().await.map_err(|e| {
					TransportError::invalid_payload("Failed to parse JSON response", e, Some(&url))
				})?;
				return rpc_result(value, &url);
			}

			let error_body = response.text().await.unwrap_or_default();
			if !rotates_endpoint(status) {
				return Err(TransportError::http(&url, status, error_body, None));
			}

			tracing::warn!("RPC endpoint '{}' answered {}, rotating", url, status);
			if let Err(rotation) = self.rotate_from(&url).await {
				return Err(TransportError::http(&url, status, error_body, Some(rotation)));
			}
		}
	}
}

/// Turns a response carrying a JSON-RPC `error` object into an error
fn rpc_result(response: Value, url: &str) -> Result<Value, TransportError> {
	let Some(error) = response.get("error").filter(|error| !error.is_null()) else {
		return Ok(response);
	};

	let code = error["code"].as_i64().unwrap_or_default();
	let message = error["message"]
		.as_str()
		.unwrap_or("unknown JSON-RPC error");
	Err(TransportError::json_rpc(url, code, message))
}
