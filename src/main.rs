//! Address watcher entry point.
//!
//! This binary watches one configured network for transactions touching the
//! addresses given on the command line, and lists what it recorded on shutdown.
//!
//! # Flow
//! 1. Loads the network configuration from the config directory
//! 2. Connects to the network's JSON-RPC endpoints and reports the current height
//! 3. Subscribes every `--address`
//! 4. Optionally serves Prometheus metrics
//! 5. On Ctrl+C closes all subscriptions and logs the recorded transactions

use address_watcher::{
	bootstrap::{
		build_coordinator, initialize_client, load_network, report_transactions,
		subscribe_addresses, Result,
	},
	utils::{logging::setup_logging, metrics::server::create_metrics_server, parse_string_to_bytes_size},
};

use actix_web::dev::Server;
use clap::Parser;
use dotenvy::dotenv_override;
use std::{
	env::{set_var, var},
	path::Path,
};
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
	name = "address-watcher",
	about = "Watches a blockchain for transactions sent from or to a set of addresses.",
	version
)]
struct Cli {
	/// Write logs to file instead of stdout
	#[arg(long)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Path to store log files (default: logs/)
	#[arg(long, value_name = "PATH")]
	log_path: Option<String>,

	/// Maximum log file size before rolling (e.g., "1GB", "500MB", "1024KB")
	#[arg(long, value_name = "SIZE", value_parser = parse_string_to_bytes_size)]
	log_max_size: Option<u64>,

	/// Address to start the metrics server on (default: 127.0.0.1:8081)
	#[arg(long, value_name = "HOST:PORT")]
	metrics_address: Option<String>,

	/// Enable metrics server
	#[arg(long)]
	metrics: bool,

	/// Directory holding the network configuration files (default: config/networks)
	#[arg(long, value_name = "PATH")]
	config_path: Option<String>,

	/// Network to watch, required when more than one network is configured
	#[arg(long, value_name = "NETWORK_SLUG")]
	network: Option<String>,

	/// Address to watch; may be repeated
	#[arg(long = "address", value_name = "ADDRESS")]
	addresses: Vec<String>,

	/// Validate configuration files without starting the service
	#[arg(long)]
	check: bool,
}

impl Cli {
	/// Environment read by the logging and metrics setup, after `.env` is applied
	///
	/// Command line values win over both `.env` and the inherited environment.
	fn export_env(&self) {
		dotenv_override().ok();

		let level = self.log_level.clone().or_else(|| var("RUST_LOG").ok());
		let overrides = [
			("LOG_MODE", self.log_file.then(|| "file".to_string())),
			("LOG_LEVEL", level.clone()),
			("RUST_LOG", self.log_level.clone()),
			("LOG_DATA_DIR", self.log_path.clone()),
			("LOG_MAX_SIZE", self.log_max_size.map(|bytes| bytes.to_string())),
			("METRICS_ENABLED", self.metrics.then(|| "true".to_string())),
		];

		for (key, value) in overrides {
			if let Some(value) = value {
				set_var(key, value);
			}
		}
	}

	fn config_path(&self) -> Option<&Path> {
		self.config_path.as_deref().map(Path::new)
	}

	fn metrics_enabled(&self) -> bool {
		self.metrics || var("METRICS_ENABLED").is_ok_and(|v| v == "true")
	}
}

/// Main entry point for the address watcher.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded, the network cannot be
/// reached, no address could be subscribed, or `--check` finds the configuration
/// invalid.
#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	cli.export_env();

	if let Err(e) = setup_logging() {
		eprintln!("Failed to setup logging: {}", e);
	}

	if cli.check {
		return check_configuration(cli.config_path(), cli.network.as_deref()).await;
	}

	let network = load_network(cli.config_path(), cli.network.as_deref()).await?;
	info!("Using network {} ({})", network.name, network.slug);

	let coordinator = build_coordinator(initialize_client(&network).await?, &network);
	info!("Current block height: {}", coordinator.get_current_height().await);

	if cli.addresses.is_empty() {
		info!("No address to watch. Use --address to subscribe one");
		return Ok(());
	}

	let failed = subscribe_addresses(&coordinator, &cli.addresses).await;
	if failed.len() == cli.addresses.len() {
		coordinator.close().await?;
		return Err(format!("None of the {} addresses could be subscribed", failed.len()).into());
	}
	for address in failed {
		error!("Could not subscribe address {}", address);
	}

	let metrics_server = if cli.metrics_enabled() {
		let bind_address = cli
			.metrics_address
			.clone()
			.unwrap_or_else(|| DEFAULT_METRICS_ADDRESS.to_string());
		create_metrics_server(bind_address)
			.inspect_err(|e| error!("Failed to create metrics server: {}", e))
			.ok()
	} else {
		debug!("Metrics server disabled. Use --metrics or METRICS_ENABLED=true to enable");
		None
	};

	info!(
		"Watching {} address(es). Press Ctrl+C to shutdown",
		coordinator.active_subscriptions().await
	);
	wait_for_stop(metrics_server).await;

	if let Err(e) = coordinator.close().await {
		error!("Error during shutdown: {}", e);
	}

	report_transactions(&coordinator, &cli.addresses).await;
	match coordinator.store().export_json() {
		Ok(json) => debug!("Recorded transactions:\n{}", json),
		Err(e) => error!("{}", e),
	}

	info!("Shutdown complete");
	Ok(())
}

const DEFAULT_METRICS_ADDRESS: &str = "127.0.0.1:8081";

/// Resolves on Ctrl+C, or when the metrics server stops first
async fn wait_for_stop(metrics_server: Option<Server>) {
	let metrics_stopped = async {
		match metrics_server {
			Some(server) => server.await,
			None => std::future::pending().await,
		}
	};

	tokio::select! {
		signal = tokio::signal::ctrl_c() => {
			if let Err(e) = signal {
				error!("Error waiting for Ctrl+C: {}", e);
			}
			info!("Shutdown signal received, stopping subscriptions...");
		}
		served = metrics_stopped => {
			if let Err(e) = served {
				error!("Metrics server error: {}", e);
			}
			info!("Metrics server stopped, stopping subscriptions...");
		}
	}
}

/// Loads the configuration the way a normal start would, without connecting
///
/// Fails when no network to watch can be selected, so `--check` exits non-zero.
async fn check_configuration(config_path: Option<&Path>, network: Option<&str>) -> Result<()> {
	info!("Validating configuration files...");

	let network = load_network(config_path, network)
		.await
		.map_err(|e| format!("Configuration is invalid: {}", e))?;

	info!("✓ Network {} ({}) is valid", network.name, network.slug);
	if network.max_backfill_depth < network.expected_blocks_per_poll() {
		info!(
			"Note: every tick of {} will skip blocks with the configured backfill depth",
			network.slug
		);
	}
	Ok(())
}
