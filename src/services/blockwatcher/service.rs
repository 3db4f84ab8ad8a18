//! Block watcher service implementation.
//!
//! Starts one [`BlockWatcher`] task per observed address and hands the caller the
//! stream of matches together with a handle that stops the task.

use std::sync::Arc;
use tokio::{
	runtime::Handle,
	sync::{mpsc, watch},
	task::JoinHandle,
};

use crate::{
	models::Transaction,
	services::{
		blockchain::ChainClient,
		blockwatcher::{
			error::BlockWatcherError,
			watcher::{BlockWatcher, WatcherConfig},
		},
	},
};

/// Stops a running watcher task
///
/// Dropping the handle without calling [`WatcherHandle::stop`] also ends the
/// task, at its next suspension point.
#[derive(Debug)]
pub struct WatcherHandle {
	shutdown: watch::Sender<bool>,
	task: JoinHandle<()>,
}

impl WatcherHandle {
	/// Wraps a spawned watcher task and the shutdown signal it listens to
	pub fn new(shutdown: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
		Self { shutdown, task }
	}

	/// Returns true once the watcher task has exited
	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}

	/// Signals the watcher to stop and waits for its task to exit
	pub async fn stop(self) -> Result<(), BlockWatcherError> {
		self.shutdown.send_replace(true);

		self.task.await.map_err(BlockWatcherError::task_failed)
	}
}

/// A started watcher: its match stream and the handle that stops it
#[derive(Debug)]
pub struct Observation {
	/// Matched transactions in block order, closed when the watcher stops
	pub transactions: mpsc::Receiver<Transaction>,
	/// Handle owning the watcher task
	pub watcher: WatcherHandle,
}

/// Trait for starting address observations
///
/// Implementations fail only when the watcher cannot be wired up. Once an
/// [`Observation`] is returned, upstream failures are absorbed by the watcher.
pub trait TransactionObserver: Send + Sync {
	/// Starts watching `address` and returns its stream of matches
	fn observe(&self, address: &str) -> Result<Observation, BlockWatcherError>;
}

/// Starts block watchers against a shared chain client
pub struct BlockWatcherService<C> {
	client: Arc<C>,
	config: WatcherConfig,
}

impl<C: ChainClient + 'static> BlockWatcherService<C> {
	/// Creates a new block watcher service
	///
	/// # Arguments
	/// * `client` - Chain client shared by every watcher
	/// * `config` - Polling parameters applied to every watcher
	pub fn new(client: Arc<C>, config: WatcherConfig) -> Self {
		Self { client, config }
	}

	/// Returns the polling parameters used for new watchers
	pub fn config(&self) -> &WatcherConfig {
		&self.config
	}
}

impl<C: ChainClient + 'static> TransactionObserver for BlockWatcherService<C> {
	fn observe(&self, address: &str) -> Result<Observation, BlockWatcherError> {
		let runtime =
			Handle::try_current().map_err(|e| BlockWatcherError::no_runtime(address, e))?;

		self.config.validate()?;

		// Capacity 1: a slow consumer blocks the polling loop instead of queueing matches.
		let (sender, transactions) = mpsc::channel(1);
		let (shutdown, shutdown_rx) = watch::channel(false);

		let watcher = BlockWatcher::new(self.client.clone(), address, &self.config);
		let task = runtime.spawn(watcher.run(sender, shutdown_rx));

		tracing::debug!("Spawned block watcher for address {}", address);

		Ok(Observation {
			transactions,
			watcher: WatcherHandle::new(shutdown, task),
		})
	}
}
