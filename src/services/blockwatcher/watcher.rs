//! Per-address block watcher.
//!
//! A [`BlockWatcher`] polls a [`ChainClient`] for the current height, scans every
//! block produced since its previous tick and emits the transactions sent from or
//! to its address. Upstream failures never stop the loop: the tick is skipped and
//! the next one starts from the same cursor.

use std::{sync::Arc, time::Duration};
use tokio::sync::{mpsc, watch};
use tracing::instrument;

use crate::{
	models::{Network, Transaction},
	services::{
		blockchain::ChainClient,
		blockwatcher::{
			cursor::{BlockCursor, ScanPlan},
			error::BlockWatcherError,
		},
	},
	utils::{
		metrics::{BLOCKS_SCANNED, BLOCKS_SKIPPED, LAST_SEEN_BLOCK, RPC_ERRORS, TRANSACTIONS_MATCHED},
		normalize_string,
	},
};

/// Polling parameters shared by every watcher of a network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
	/// Delay between two ticks
	pub poll_interval: Duration,
	/// Maximum number of blocks scanned in one tick
	pub max_backfill_depth: u64,
}

impl WatcherConfig {
	/// Checks that the configuration can drive a polling loop
	pub fn validate(&self) -> Result<(), BlockWatcherError> {
		if self.poll_interval.is_zero() {
			return Err(BlockWatcherError::invalid_config(
				"Poll interval must be greater than zero",
			));
		}

		if self.max_backfill_depth == 0 {
			return Err(BlockWatcherError::invalid_config(
				"Maximum backfill depth must be greater than zero",
			));
		}

		Ok(())
	}
}

impl From<&Network> for WatcherConfig {
	fn from(network: &Network) -> Self {
		Self {
			poll_interval: network.poll_interval(),
			max_backfill_depth: network.max_backfill_depth,
		}
	}
}

/// Resolves once `shutdown` is true or its sender is gone
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
	let _ = shutdown.wait_for(|stopped| *stopped).await;
}

/// Watches the chain for transactions touching a single address
pub struct BlockWatcher<C> {
	client: Arc<C>,
	address: String,
	/// Metric label, the key the store files matches under
	label: String,
	poll_interval: Duration,
	cursor: BlockCursor,
}

impl<C: ChainClient + 'static> BlockWatcher<C> {
	/// Creates a watcher that has not polled yet
	///
	/// # Arguments
	/// * `client` - Chain client used for every tick
	/// * `address` - Address to match against transaction senders and recipients
	/// * `config` - Polling parameters
	pub fn new(client: Arc<C>, address: impl Into<String>, config: &WatcherConfig) -> Self {
		let address = address.into();
		Self {
			client,
			label: normalize_string(&address),
			address,
			poll_interval: config.poll_interval,
			cursor: BlockCursor::new(config.max_backfill_depth),
		}
	}

	/// Returns the watched address
	pub fn address(&self) -> &str {
		&self.address
	}

	/// Returns the cursor of this watcher
	pub fn cursor(&self) -> &BlockCursor {
		&self.cursor
	}

	/// Runs a single polling tick and returns the matches in block order
	///
	/// The cursor only moves when every planned block was fetched, so a failed
	/// tick leaves no trace and the next tick covers the same blocks again.
	#[instrument(skip(self), fields(address = %self.address))]
	pub async fn tick(&mut self) -> Result<Vec<Transaction>, BlockWatcherError> {
		let height = match self.client.current_height().await {
			Ok(height) => height,
			Err(e) => {
				RPC_ERRORS.with_label_values(&["current_height"]).inc();
				return Err(BlockWatcherError::upstream(&self.address, "current_height", None, e));
			}
		};

		let (blocks, skipped) = match self.cursor.plan(height) {
			ScanPlan::Start => {
				tracing::info!(
					"Watching address {} starting after block {}",
					self.address,
					height
				);
				self.cursor.advance(height);
				LAST_SEEN_BLOCK
					.with_label_values(&[self.label.as_str()])
					.set(height as f64);
				return Ok(Vec::new());
			}
			ScanPlan::Idle => return Ok(Vec::new()),
			ScanPlan::Scan { blocks, skipped } => (blocks, skipped),
		};

		let mut matches = Vec::new();
		for block_number in blocks.clone() {
			let transactions = match self.client.transactions_in_block(block_number).await {
				Ok(transactions) => transactions,
				Err(e) => {
					RPC_ERRORS.with_label_values(&["transactions_in_block"]).inc();
					return Err(BlockWatcherError::upstream(
						&self.address,
						"transactions_in_block",
						Some(block_number),
						e,
					));
				}
			};

			matches.extend(
				transactions
					.into_iter()
					.filter(|transaction| transaction.involves(&self.address)),
			);
		}

		if skipped > 0 {
			tracing::warn!(
				"Skipped {} blocks for address {}: gap exceeds the backfill depth of {}",
				skipped,
				self.address,
				self.cursor.max_backfill_depth()
			);
		}

		tracing::debug!(
			"Scanned blocks {}..={} for address {}: {} matches",
			blocks.start(),
			blocks.end(),
			self.address,
			matches.len()
		);

		self.cursor.advance(height);

		let label = [self.label.as_str()];
		BLOCKS_SCANNED
			.with_label_values(&label)
			.inc_by(blocks.end() - blocks.start() + 1);
		BLOCKS_SKIPPED.with_label_values(&label).inc_by(skipped);
		TRANSACTIONS_MATCHED
			.with_label_values(&label)
			.inc_by(matches.len() as u64);
		LAST_SEEN_BLOCK.with_label_values(&label).set(height as f64);

		Ok(matches)
	}

	/// Runs the polling loop until `shutdown` turns true or its sender is dropped
	///
	/// Matches are sent one by one on `sender`, so a slow consumer holds the loop
	/// back. The channel is closed when the loop returns.
	pub async fn run(mut self, sender: mpsc::Sender<Transaction>, mut shutdown: watch::Receiver<bool>) {
		tracing::info!("Started block watcher for address {}", self.address);

		'watch: loop {
			let outcome = tokio::select! {
				biased;
				_ = wait_for_shutdown(&mut shutdown) => break 'watch,
				outcome = self.tick() => outcome,
			};

			match outcome {
				Ok(matches) => {
					for transaction in matches {
						tokio::select! {
							biased;
							_ = wait_for_shutdown(&mut shutdown) => break 'watch,
							sent = sender.send(transaction) => {
								if sent.is_err() {
									tracing::debug!(
										"Receiver for address {} dropped, stopping watcher",
										self.address
									);
									break 'watch;
								}
							}
						}
					}
				}
				Err(e) => {
					tracing::warn!("Skipping tick for address {}: {}", self.address, e);
				}
			}

			tokio::select! {
				biased;
				_ = wait_for_shutdown(&mut shutdown) => break 'watch,
				_ = tokio::time::sleep(self.poll_interval) => {}
			}
		}

		tracing::info!("Stopped block watcher for address {}", self.address);
	}
}
