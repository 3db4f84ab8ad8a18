//! [`Network`] values for tests: one HTTPS endpoint, one-second blocks and polls.

use crate::models::{Network, RpcUrl};

fn endpoint(url: &str, type_: &str, weight: u32) -> RpcUrl {
	RpcUrl {
		type_: type_.to_string(),
		url: url.to_string(),
		weight,
	}
}

pub struct NetworkBuilder(Network);

impl Default for NetworkBuilder {
	fn default() -> Self {
		Self(Network {
			slug: "test_network".to_string(),
			name: "Test Network".to_string(),
			rpc_urls: vec![endpoint("https://test.network", "rpc", 100)],
			chain_id: Some(1),
			block_time_ms: 1000,
			poll_interval_ms: 1000,
			max_backfill_depth: 10,
		})
	}
}

impl NetworkBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn name(mut self, name: &str) -> Self {
		self.0.name = name.to_string();
		self
	}

	pub fn slug(mut self, slug: &str) -> Self {
		self.0.slug = slug.to_string();
		self
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.0.chain_id = Some(chain_id);
		self
	}

	/// Replaces every endpoint with `url` at full weight
	pub fn rpc_url(self, url: &str) -> Self {
		self.clear_rpc_urls().add_rpc_url(url, "rpc", 100)
	}

	pub fn add_rpc_url(mut self, url: &str, type_: &str, weight: u32) -> Self {
		self.0.rpc_urls.push(endpoint(url, type_, weight));
		self
	}

	pub fn clear_rpc_urls(mut self) -> Self {
		self.0.rpc_urls.clear();
		self
	}

	pub fn block_time_ms(mut self, block_time_ms: u64) -> Self {
		self.0.block_time_ms = block_time_ms;
		self
	}

	pub fn poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
		self.0.poll_interval_ms = poll_interval_ms;
		self
	}

	pub fn max_backfill_depth(mut self, max_backfill_depth: u64) -> Self {
		self.0.max_backfill_depth = max_backfill_depth;
		self
	}

	pub fn build(self) -> Network {
		self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rpc_url_replaces_default_endpoint() {
		let network = NetworkBuilder::new().rpc_url("http://127.0.0.1:8545").build();

		assert_eq!(
			network.rpc_urls,
			vec![endpoint("http://127.0.0.1:8545", "rpc", 100)]
		);
	}

	#[test]
	fn test_endpoints_keep_insertion_order() {
		let network = NetworkBuilder::new()
			.clear_rpc_urls()
			.add_rpc_url("https://primary.network", "rpc", 80)
			.add_rpc_url("https://fallback.network", "rpc", 20)
			.build();

		let weights: Vec<u32> = network.rpc_urls.iter().map(|rpc| rpc.weight).collect();
		assert_eq!(weights, vec![80, 20]);
	}
}
