//! JSON-RPC transport over HTTP.

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::{
	models::Network,
	services::blockchain::transports::{
		BlockchainTransport, EndpointManager, RetryUnlessRateLimited, TransportError,
	},
	utils::http::RetryConfig,
};

/// Transport bound to the RPC endpoints of one network
///
/// Clones share the same endpoint state.
#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	endpoint_manager: EndpointManager,
}

/// `net_version`, answered by every EVM node without touching chain state
pub fn net_version_check() -> Value {
	json!({"jsonrpc": "2.0", "id": 1, "method": "net_version", "params": []})
}

/// Usable RPC URLs of `network`, highest weight first
///
/// Weight 0 disables an endpoint. Equal weights keep their configuration order.
fn ranked_urls(network: &Network) -> Vec<String> {
	let mut endpoints: Vec<_> = network
		.rpc_urls
		.iter()
		.filter(|endpoint| endpoint.type_ == "rpc" && endpoint.weight > 0)
		.filter(|endpoint| Url::parse(&endpoint.url).is_ok())
		.collect();
	endpoints.sort_by_key(|endpoint| std::cmp::Reverse(endpoint.weight));

	endpoints.into_iter().map(|endpoint| endpoint.url.clone()).collect()
}

impl HttpTransportClient {
	/// Connects with the default retry policy
	///
	/// `check_request` defaults to [`net_version_check`].
	pub async fn new(network: &Network, check_request: Option<Value>) -> Result<Self, anyhow::Error> {
		Self::new_with_retry(network, check_request, &RetryConfig::default()).await
	}

	/// Connects to the highest ranked endpoint answering the check request
	///
	/// The other endpoints become fallbacks in rank order.
	pub async fn new_with_retry(
		network: &Network,
		check_request: Option<Value>,
		retry_config: &RetryConfig,
	) -> Result<Self, anyhow::Error> {
		let base = reqwest::ClientBuilder::new()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(32)
			.timeout(Duration::from_secs(30))
			.connect_timeout(Duration::from_secs(20))
			.build()
			.context("Failed to create base HTTP client")?;
		let client = retry_config.build_client(base, RetryUnlessRateLimited);
		let check_request = check_request.unwrap_or_else(net_version_check);

		let urls = ranked_urls(network);
		for (rank, url) in urls.iter().enumerate() {
			let fallbacks = urls
				.iter()
				.enumerate()
				.filter(|(other, _)| *other != rank)
				.map(|(_, fallback)| fallback.clone())
				.collect();
			let endpoint_manager =
				EndpointManager::new(client.clone(), url, fallbacks, check_request.clone());

			match endpoint_manager.check(url).await {
				Ok(()) => return Ok(Self { endpoint_manager }),
				Err(e) => tracing::warn!(
					"RPC URL '{}' of network '{}' failed to connect: {:#}",
					url,
					network.slug,
					e
				),
			}
		}

		Err(anyhow::anyhow!("All RPC URLs failed to connect"))
	}

	/// Endpoints tried when the active one fails
	pub async fn fallback_urls(&self) -> Vec<String> {
		self.endpoint_manager.fallback_urls().await
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	async fn active_url(&self) -> String {
		self.endpoint_manager.active_url().await
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let request = self.request_body(method, params);
		self.endpoint_manager.send(&request).await
	}
}
