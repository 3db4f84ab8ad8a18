//! Bootstrap module for loading configuration and wiring the watcher services.
//!
//! The binary goes through these helpers in order: pick the network, build a chain
//! client for it, build the coordinator on top of that client, subscribe the
//! requested addresses and finally report what was recorded.

use std::{collections::HashMap, error::Error, path::Path, sync::Arc};

use crate::{
	models::{ConfigError, ConfigLoader, Network},
	services::{
		blockchain::{ChainClient, EvmClient, HttpTransportClient},
		blockwatcher::{BlockWatcherService, TransactionObserver, WatcherConfig},
		storage::{InMemoryTransactionStore, TransactionStore},
		subscription::SubscriptionCoordinator,
	},
	utils::normalize_string,
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Coordinator backed by block watchers and the in-memory store
pub type WatcherCoordinator<C> =
	SubscriptionCoordinator<BlockWatcherService<C>, C, InMemoryTransactionStore>;

/// Loads the network configurations and picks the one to watch.
///
/// # Arguments
/// * `config_path` - Directory holding network JSON files (default `config/networks`)
/// * `slug` - Slug of the network to use; may be omitted when exactly one network is configured
///
/// # Errors
/// Returns an error if loading fails, no network matches `slug`, or several networks are
/// configured and no slug was given
pub async fn load_network(config_path: Option<&Path>, slug: Option<&str>) -> Result<Network> {
	let networks: HashMap<String, Network> = Network::load_all(config_path).await?;

	if let Some(slug) = slug {
		let wanted = normalize_string(slug);
		return networks
			.into_values()
			.find(|network| network.slug == wanted)
			.ok_or_else(|| {
				ConfigError::invalid(format!("Network '{}' is not configured", slug)).into()
			});
	}

	let mut networks: Vec<Network> = networks.into_values().collect();
	match networks.len() {
		1 => Ok(networks.remove(0)),
		0 => Err(ConfigError::invalid("No network configured").into()),
		n => {
			let mut slugs: Vec<String> = networks.into_iter().map(|network| network.slug).collect();
			slugs.sort();
			Err(ConfigError::invalid(format!(
				"{} networks configured ({}), select one with --network",
				n,
				slugs.join(", ")
			))
			.into())
		}
	}
}

/// Creates the JSON-RPC client for `network`, probing its endpoints.
pub async fn initialize_client(network: &Network) -> Result<Arc<EvmClient<HttpTransportClient>>> {
	let client = EvmClient::new(network).await.map_err(|e| {
		Box::<dyn Error>::from(format!(
			"Failed to connect to network '{}': {:#}",
			network.slug, e
		))
	})?;

	Ok(Arc::new(client))
}

/// Builds a coordinator whose watchers poll `client` with the settings of `network`.
pub fn build_coordinator<C>(client: Arc<C>, network: &Network) -> WatcherCoordinator<C>
where
	C: ChainClient + 'static,
{
	let watcher_service = BlockWatcherService::new(client.clone(), WatcherConfig::from(network));

	SubscriptionCoordinator::new(
		watcher_service,
		client,
		Arc::new(InMemoryTransactionStore::new()),
	)
}

/// Subscribes every address and returns the ones that failed.
pub async fn subscribe_addresses<O, C, S>(
	coordinator: &SubscriptionCoordinator<O, C, S>,
	addresses: &[String],
) -> Vec<String>
where
	O: TransactionObserver,
	C: ChainClient,
	S: TransactionStore + 'static,
{
	let mut failed = Vec::new();

	for address in addresses {
		if !coordinator.subscribe(address).await {
			failed.push(address.clone());
		}
	}

	failed
}

/// Logs the transactions recorded for each address and returns the per-address counts.
pub async fn report_transactions<O, C, S>(
	coordinator: &SubscriptionCoordinator<O, C, S>,
	addresses: &[String],
) -> Vec<(String, usize)>
where
	O: TransactionObserver,
	C: ChainClient,
	S: TransactionStore + 'static,
{
	let mut counts = Vec::with_capacity(addresses.len());

	for address in addresses {
		let transactions = coordinator.get_transactions(address).await;
		tracing::info!(
			"Address {}: {} transaction(s) recorded",
			address,
			transactions.len()
		);

		for transaction in transactions.iter() {
			tracing::info!(
				"  - {} in block {} ({} -> {}, value {})",
				transaction.hash(),
				transaction
					.block_number()
					.map(|n| n.to_string())
					.unwrap_or_else(|| "pending".to_string()),
				transaction.sender(),
				transaction.to().unwrap_or("contract creation"),
				transaction.value()
			);
		}

		counts.push((address.clone(), transactions.len()));
	}

	counts
}
