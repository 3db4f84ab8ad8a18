//! Subscription coordinator implementation.
//!
//! Each subscription pairs a block watcher with a drain task that moves the
//! watcher's matches into the transaction store. All drain tasks listen to one
//! shared shutdown signal, so [`SubscriptionCoordinator::close`] reaches every
//! subscription at once and then waits for each of them to exit.

use std::sync::Arc;
use tokio::{
	sync::{watch, Mutex},
	task::JoinHandle,
};

use crate::{
	models::Transaction,
	services::{
		blockchain::ChainClient,
		blockwatcher::{wait_for_shutdown, BlockWatcherError, Observation, TransactionObserver},
		storage::TransactionStore,
		subscription::error::SubscriptionError,
	},
	utils::metrics::{ACTIVE_SUBSCRIPTIONS, RPC_ERRORS},
};

/// A started subscription and the drain task serving it
struct Subscription {
	address: String,
	task: JoinHandle<Result<(), BlockWatcherError>>,
}

#[derive(Default)]
struct CoordinatorState {
	closed: bool,
	subscriptions: Vec<Subscription>,
}

/// Manages address subscriptions and the shutdown of their tasks
///
/// # Type Parameters
/// * `O` - Starts the per-address watchers
/// * `C` - Chain client answering height queries
/// * `S` - Store receiving matched transactions
pub struct SubscriptionCoordinator<O, C, S> {
	observer: O,
	client: Arc<C>,
	store: Arc<S>,
	shutdown: watch::Sender<bool>,
	state: Mutex<CoordinatorState>,
}

impl<O, C, S> SubscriptionCoordinator<O, C, S>
where
	O: TransactionObserver,
	C: ChainClient,
	S: TransactionStore + 'static,
{
	/// Creates a coordinator without subscriptions
	///
	/// # Arguments
	/// * `observer` - Starts one watcher per subscribed address
	/// * `client` - Chain client used by [`Self::current_height`]
	/// * `store` - Store the drain tasks append to
	pub fn new(observer: O, client: Arc<C>, store: Arc<S>) -> Self {
		let (shutdown, _) = watch::channel(false);

		Self {
			observer,
			client,
			store,
			shutdown,
			state: Mutex::new(CoordinatorState::default()),
		}
	}

	/// Starts watching `address`
	///
	/// Returns false when the watcher cannot be started or when the coordinator
	/// has been closed. The address itself is not validated.
	pub async fn subscribe(&self, address: &str) -> bool {
		let mut state = self.state.lock().await;

		if state.closed {
			tracing::warn!(
				"Rejected subscription for address {}: coordinator is closed",
				address
			);
			return false;
		}

		let observation = match self.observer.observe(address) {
			Ok(observation) => observation,
			Err(e) => {
				tracing::error!("Failed to subscribe address {}: {}", address, e);
				return false;
			}
		};

		let task = tokio::spawn(drain(
			address.to_string(),
			observation,
			self.store.clone(),
			self.shutdown.subscribe(),
		));

		state.subscriptions.push(Subscription {
			address: address.to_string(),
			task,
		});
		ACTIVE_SUBSCRIPTIONS.inc();

		tracing::info!("Subscribed address {}", address);
		true
	}

	/// Returns the transactions recorded for `address` so far, in detection order
	pub async fn get_transactions(&self, address: &str) -> Vec<Transaction> {
		self.store.get(address).await
	}

	/// Queries the chain for its current height
	///
	/// Returns None (and logs) when the chain client fails.
	pub async fn current_height(&self) -> Option<u64> {
		match self.client.current_height().await {
			Ok(height) => Some(height),
			Err(e) => {
				RPC_ERRORS.with_label_values(&["current_height"]).inc();
				tracing::error!("Failed to get current height: {:#}", e);
				None
			}
		}
	}

	/// Queries the chain for its current height, returning 0 on failure
	///
	/// A failed call cannot be told apart from a chain at height 0; use
	/// [`Self::current_height`] when the difference matters.
	pub async fn get_current_height(&self) -> u64 {
		self.current_height().await.unwrap_or(0)
	}

	/// Returns the store the drain tasks append to
	pub fn store(&self) -> &Arc<S> {
		&self.store
	}

	/// Number of subscriptions whose drain task is still running
	///
	/// A subscription whose stream ended on its own stops counting as soon as its
	/// task exits, matching the `active_subscriptions` gauge. Its task is still
	/// joined by [`Self::close`].
	pub async fn active_subscriptions(&self) -> usize {
		self.state
			.lock()
			.await
			.subscriptions
			.iter()
			.filter(|subscription| !subscription.task.is_finished())
			.count()
	}

	/// Returns true once [`Self::close`] has been called
	pub fn is_closed(&self) -> bool {
		*self.shutdown.borrow()
	}

	/// Stops every subscription and waits for all of their tasks to exit
	///
	/// No store write happens after this returns. Calling it again is a no-op.
	/// Every task is awaited even when some of them fail; the failures are then
	/// reported together.
	pub async fn close(&self) -> Result<(), SubscriptionError> {
		let mut state = self.state.lock().await;
		state.closed = true;
		self.shutdown.send_replace(true);

		let subscriptions = std::mem::take(&mut state.subscriptions);
		if subscriptions.is_empty() {
			return Ok(());
		}

		tracing::info!("Closing {} subscriptions", subscriptions.len());

		let joined = subscriptions.len();
		let mut failures = Vec::new();
		for Subscription { address, task } in subscriptions {
			match task.await {
				Ok(Ok(())) => {}
				Ok(Err(e)) => failures.push((address, e.to_string())),
				Err(e) => failures.push((address, format!("drain task failed: {}", e))),
			}
		}

		if failures.is_empty() {
			tracing::info!("All subscriptions closed");
			return Ok(());
		}

		Err(SubscriptionError::shutdown(failures, joined))
	}
}

/// Moves matches from one watcher into the store until shutdown or end of stream
///
/// The watcher is stopped before the task returns.
async fn drain<S: TransactionStore>(
	address: String,
	observation: Observation,
	store: Arc<S>,
	mut shutdown: watch::Receiver<bool>,
) -> Result<(), BlockWatcherError> {
	let Observation {
		mut transactions,
		watcher,
	} = observation;

	loop {
		tokio::select! {
			biased;
			_ = wait_for_shutdown(&mut shutdown) => {
				tracing::debug!("Shutdown signal received for address {}", address);
				break;
			}
			next = transactions.recv() => match next {
				Some(transaction) => {
					if let Err(e) = store.append(&address, transaction).await {
						tracing::error!(
							"Dropped transaction for address {}: {}",
							address,
							e
						);
					}
				}
				None => {
					tracing::info!("Transaction stream for address {} closed", address);
					break;
				}
			},
		}
	}

	transactions.close();
	let stopped = watcher.stop().await;

	ACTIVE_SUBSCRIPTIONS.dec();
	tracing::debug!("Drain task for address {} exited", address);

	stopped
}
