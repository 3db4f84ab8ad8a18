//! Prometheus metrics of the watcher process.
//!
//! Pipeline metrics are updated by watchers, the store and the coordinator.
//! Host metrics are sampled when the endpoint in [`server`] is scraped.
//! Per-address metrics are labelled with the normalized address, the same key
//! the transaction store uses.

pub mod server;

use lazy_static::lazy_static;
use prometheus::{
	core::Collector, Encoder, Gauge, GaugeVec, IntCounter, IntCounterVec, IntGauge, Opts,
	Registry, TextEncoder,
};
use sysinfo::{Disks, System};

/// Registers `metric` with [`REGISTRY`] and hands it back
///
/// Names are static, so a failure here is a programming error.
fn registered<M: Collector + Clone + 'static>(metric: prometheus::Result<M>) -> M {
	let metric = metric.unwrap();
	REGISTRY.register(Box::new(metric.clone())).unwrap();
	metric
}

fn per_address(name: &str, help: &str) -> IntCounterVec {
	registered(IntCounterVec::new(Opts::new(name, help), &["address"]))
}

lazy_static! {
	/// Registry served on `/metrics`
	pub static ref REGISTRY: Registry = Registry::new();

	pub static ref CPU_USAGE: Gauge =
		registered(Gauge::new("cpu_usage_percentage", "Host CPU usage in percent"));

	pub static ref MEMORY_USAGE_PERCENT: Gauge =
		registered(Gauge::new("memory_usage_percentage", "Host memory usage in percent"));

	pub static ref MEMORY_USAGE: Gauge =
		registered(Gauge::new("memory_usage_bytes", "Host memory in use"));

	pub static ref TOTAL_MEMORY: Gauge =
		registered(Gauge::new("total_memory_bytes", "Host memory installed"));

	/// Used space summed over every mounted disk
	pub static ref DISK_USAGE: Gauge =
		registered(Gauge::new("disk_usage_bytes", "Used disk space over all mounted disks"));

	pub static ref BLOCKS_SCANNED: IntCounterVec =
		per_address("blocks_scanned_total", "Blocks fetched and searched for the address");

	/// Blocks left out because the gap to the chain head exceeded the backfill depth
	pub static ref BLOCKS_SKIPPED: IntCounterVec = per_address(
		"blocks_skipped_total",
		"Blocks skipped because the gap exceeded the backfill depth"
	);

	pub static ref TRANSACTIONS_MATCHED: IntCounterVec =
		per_address("transactions_matched_total", "Transactions involving the address");

	pub static ref TRANSACTIONS_STORED: IntCounter =
		registered(IntCounter::new("transactions_stored_total", "Transactions appended to the store"));

	/// Failed chain client calls by operation, `current_height` or `transactions_in_block`
	pub static ref RPC_ERRORS: IntCounterVec = registered(IntCounterVec::new(
		Opts::new("rpc_errors_total", "Failed chain client calls"),
		&["operation"]
	));

	/// Subscriptions whose stream is still running
	pub static ref ACTIVE_SUBSCRIPTIONS: IntGauge =
		registered(IntGauge::new("active_subscriptions", "Address subscriptions still streaming"));

	/// Height of the last block each watcher finished
	pub static ref LAST_SEEN_BLOCK: GaugeVec = registered(GaugeVec::new(
		Opts::new("last_seen_block", "Last block height processed for the address"),
		&["address"]
	));
}

/// Text exposition of every registered metric
pub fn gather_metrics() -> Result<Vec<u8>, prometheus::Error> {
	let mut buffer = Vec::new();
	TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
	Ok(buffer)
}

/// Samples CPU, memory and disk usage of the host
pub fn update_system_metrics() {
	let mut system = System::new_all();
	system.refresh_all();
	CPU_USAGE.set(f64::from(system.global_cpu_usage()));

	let (used, total) = (system.used_memory(), system.total_memory());
	MEMORY_USAGE.set(used as f64);
	TOTAL_MEMORY.set(total as f64);
	MEMORY_USAGE_PERCENT.set(match total {
		0 => 0.0,
		total => used as f64 * 100.0 / total as f64,
	});

	let used_disk: u64 = Disks::new_with_refreshed_list()
		.list()
		.iter()
		.map(|disk| disk.total_space().saturating_sub(disk.available_space()))
		.sum();
	DISK_USAGE.set(used_disk as f64);
}
