//! EVM-compatible blockchain client implementation.
//!
//! Answers the two [`ChainClient`] questions with `eth_blockNumber` and
//! `eth_getBlockByNumber` (full transaction objects).

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::instrument;

use crate::{
	models::{Block, Network, Transaction},
	services::blockchain::{
		client::{parse_block_number, ChainClient},
		transports::{net_version_check, BlockchainTransport, HttpTransportClient},
		BlockChainError,
	},
	utils::http::RetryConfig,
};

/// Client implementation for Ethereum Virtual Machine (EVM) compatible blockchains
#[derive(Clone)]
pub struct EvmClient<T: Send + Sync> {
	/// The underlying transport client for RPC communication
	http_client: T,
}

impl<T: Send + Sync> EvmClient<T> {
	/// Creates a new EVM client instance with a specific transport client
	pub fn new_with_transport(http_client: T) -> Self {
		Self { http_client }
	}
}

impl EvmClient<HttpTransportClient> {
	/// Connects to `network`, probing its endpoints with `net_version`
	pub async fn new(network: &Network) -> Result<Self, anyhow::Error> {
		Self::new_with_retry(network, &RetryConfig::default()).await
	}

	/// Same as [`EvmClient::new`] with an explicit retry policy
	pub async fn new_with_retry(
		network: &Network,
		retry_config: &RetryConfig,
	) -> Result<Self, anyhow::Error> {
		let transport =
			HttpTransportClient::new_with_retry(network, Some(net_version_check()), retry_config)
				.await?;
		Ok(Self::new_with_transport(transport))
	}
}

impl<T: Send + Sync + BlockchainTransport> EvmClient<T> {
	/// Returns the currently active RPC URL of the underlying transport
	pub async fn current_url(&self) -> String {
		self.http_client.active_url().await
	}

	/// Fetches a block with its full transaction objects
	#[instrument(skip(self))]
	pub async fn get_block(&self, height: u64) -> Result<Block, anyhow::Error> {
		let params = json!([format!("0x{:x}", height), true]);

		let response = self
			.http_client
			.send_raw_request("eth_getBlockByNumber", Some(params))
			.await
			.with_context(|| format!("Failed to get block: {}", height))?;

		let block_data = response
			.get("result")
			.ok_or_else(|| anyhow::anyhow!("Missing 'result' field"))?;

		if block_data.is_null() {
			return Err(BlockChainError::block_not_found(height, "eth_getBlockByNumber").into());
		}

		serde_json::from_value(block_data.clone())
			.with_context(|| format!("Failed to parse block: {}", height))
	}
}

#[async_trait]
impl<T: Send + Sync + BlockchainTransport> ChainClient for EvmClient<T> {
	/// Retrieves the latest block number
	#[instrument(skip(self))]
	async fn current_height(&self) -> Result<u64, anyhow::Error> {
		let response = self
			.http_client
			.send_raw_request::<Value>("eth_blockNumber", None)
			.await
			.with_context(|| "Failed to get latest block number")?;

		match response.get("result") {
			Some(Value::String(raw)) => Ok(parse_block_number(raw)?),
			Some(Value::Number(number)) => number
				.as_u64()
				.ok_or_else(|| anyhow::anyhow!("Block number is not an unsigned integer: {}", number)),
			_ => Err(anyhow::anyhow!("Missing 'result' field")),
		}
	}

	/// Retrieves the transactions of a block in block order
	#[instrument(skip(self))]
	async fn transactions_in_block(&self, height: u64) -> Result<Vec<Transaction>, anyhow::Error> {
		Ok(self.get_block(height).await?.transactions)
	}
}
