use serde::{Deserialize, Serialize};

/// A chain to watch, as stored in `config/networks/<slug>.json`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Network {
	/// Selects the network with `--network`; lowercase letters, digits and `_`
	pub slug: String,
	pub name: String,
	/// JSON-RPC endpoints, the highest weight is used first
	pub rpc_urls: Vec<RpcUrl>,
	/// Informational only, never checked against the node
	pub chain_id: Option<u64>,
	/// Expected time between two blocks
	pub block_time_ms: u64,
	/// Delay between two ticks of every watcher on this network
	pub poll_interval_ms: u64,
	/// Most blocks one tick scans; the oldest blocks of a longer gap are skipped
	pub max_backfill_depth: u64,
}

/// One JSON-RPC endpoint of a [`Network`]
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RpcUrl {
	/// Only `rpc` endpoints are used
	pub type_: String,
	pub url: String,
	/// 0 to 100, 0 disables the endpoint
	pub weight: u32,
}
