use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicU64, AtomicUsize, Ordering},
		Arc, Mutex,
	},
	time::Duration,
};

use address_watcher::{
	models::Transaction,
	services::{
		blockchain::ChainClient,
		blockwatcher::{BlockWatcherError, BlockWatcherService, TransactionObserver, WatcherConfig},
		storage::{InMemoryTransactionStore, StorageError, TransactionStore},
		subscription::SubscriptionCoordinator,
	},
};

use crate::integration::mocks::{
	polling_network, scripted_chain, transfer, MockChainClient, MockTransactionObserver,
	MockTransactionStore, ALICE, BOB, CAROL,
};

fn coordinator_for<C: ChainClient + 'static, S: TransactionStore + 'static>(
	chain: C,
	store: Arc<S>,
) -> SubscriptionCoordinator<BlockWatcherService<C>, C, S> {
	let network = polling_network(5, 10);
	let client = Arc::new(chain);
	let service = BlockWatcherService::new(client.clone(), WatcherConfig::from(&network));

	SubscriptionCoordinator::new(service, client, store)
}

async fn wait_for_transactions<O, C, S>(
	coordinator: &SubscriptionCoordinator<O, C, S>,
	address: &str,
	count: usize,
) -> Vec<Transaction>
where
	O: TransactionObserver,
	C: ChainClient,
	S: TransactionStore + 'static,
{
	tokio::time::timeout(Duration::from_secs(5), async {
		loop {
			let transactions = coordinator.get_transactions(address).await;
			if transactions.len() >= count {
				return transactions;
			}
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	})
	.await
	.expect("timed out waiting for recorded transactions")
}

/// Chain advancing one block per height query, every block holding a transfer from ALICE
fn endless_chain() -> MockChainClient {
	let mut chain = MockChainClient::new();
	let height = AtomicU64::new(1);

	chain
		.expect_current_height()
		.returning(move || Ok(height.fetch_add(1, Ordering::SeqCst)));
	chain
		.expect_transactions_in_block()
		.returning(|block| Ok(vec![transfer(block, ALICE, BOB, block)]));

	chain
}

/// Chain whose height only moves when the test stores a new one
///
/// Also returns the number of height queries served so far.
fn controlled_chain(
	start: u64,
	blocks: HashMap<u64, Vec<Transaction>>,
) -> (MockChainClient, Arc<AtomicU64>, Arc<AtomicUsize>) {
	let mut chain = MockChainClient::new();
	let height = Arc::new(AtomicU64::new(start));
	let queries = Arc::new(AtomicUsize::new(0));

	let (current, counter) = (height.clone(), queries.clone());
	chain.expect_current_height().returning(move || {
		counter.fetch_add(1, Ordering::SeqCst);
		Ok(current.load(Ordering::SeqCst))
	});
	chain
		.expect_transactions_in_block()
		.returning(move |block| Ok(blocks.get(&block).cloned().unwrap_or_default()));

	(chain, height, queries)
}

#[tokio::test]
async fn test_subscription_records_matches_in_order() {
	let blocks = HashMap::from([
		(11, vec![transfer(1, ALICE, CAROL, 11)]),
		(12, vec![transfer(2, CAROL, CAROL, 12), transfer(3, CAROL, ALICE, 12)]),
		(14, vec![transfer(4, ALICE, ALICE, 14)]),
	]);
	let (chain, _) = scripted_chain(vec![10, 12, 14], blocks);

	let coordinator = coordinator_for(chain, Arc::new(InMemoryTransactionStore::new()));
	assert!(coordinator.subscribe(ALICE).await);

	let recorded = wait_for_transactions(&coordinator, ALICE, 3).await;
	coordinator.close().await.unwrap();

	let expected = vec![
		transfer(1, ALICE, CAROL, 11),
		transfer(3, CAROL, ALICE, 12),
		transfer(4, ALICE, ALICE, 14),
	];
	assert_eq!(recorded, expected);
	assert_eq!(coordinator.get_transactions(ALICE).await, expected);
	assert!(coordinator.get_transactions(BOB).await.is_empty());
}

#[tokio::test]
async fn test_subscriptions_do_not_share_matches() {
	let blocks = HashMap::from([
		(21, vec![transfer(1, ALICE, CAROL, 21)]),
		(22, vec![transfer(2, BOB, CAROL, 22), transfer(3, CAROL, CAROL, 22)]),
	]);
	let (chain, height, queries) = controlled_chain(20, blocks);

	let coordinator = coordinator_for(chain, Arc::new(InMemoryTransactionStore::new()));
	assert!(coordinator.subscribe(ALICE).await);
	assert!(coordinator.subscribe(BOB).await);
	assert_eq!(coordinator.active_subscriptions().await, 2);

	// Let both watchers record the start height before the chain moves on
	tokio::time::timeout(Duration::from_secs(5), async {
		while queries.load(Ordering::SeqCst) < 4 {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	})
	.await
	.unwrap();
	height.store(22, Ordering::SeqCst);

	let alice = wait_for_transactions(&coordinator, ALICE, 1).await;
	let bob = wait_for_transactions(&coordinator, BOB, 1).await;
	coordinator.close().await.unwrap();

	assert_eq!(alice, vec![transfer(1, ALICE, CAROL, 21)]);
	assert_eq!(bob, vec![transfer(2, BOB, CAROL, 22)]);
	assert!(coordinator.get_transactions(CAROL).await.is_empty());
}

#[tokio::test]
async fn test_close_stops_all_writes() {
	let store = Arc::new(InMemoryTransactionStore::new());
	let coordinator = coordinator_for(endless_chain(), store.clone());

	assert!(coordinator.subscribe(ALICE).await);
	wait_for_transactions(&coordinator, ALICE, 3).await;

	coordinator.close().await.unwrap();
	assert!(coordinator.is_closed());
	assert_eq!(coordinator.active_subscriptions().await, 0);

	let after_close = store.get(ALICE).await.len();
	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(store.get(ALICE).await.len(), after_close);

	// Closing twice is harmless and new subscriptions are refused
	coordinator.close().await.unwrap();
	assert!(!coordinator.subscribe(BOB).await);
	assert_eq!(store.get(ALICE).await.len(), after_close);
}

#[tokio::test]
async fn test_concurrent_close_waits_for_drains() {
	let store = Arc::new(InMemoryTransactionStore::new());
	let coordinator = Arc::new(coordinator_for(endless_chain(), store.clone()));

	assert!(coordinator.subscribe(ALICE).await);
	wait_for_transactions(coordinator.as_ref(), ALICE, 1).await;

	let first = tokio::spawn({
		let coordinator = coordinator.clone();
		async move { coordinator.close().await }
	});
	let second = tokio::spawn({
		let coordinator = coordinator.clone();
		async move { coordinator.close().await }
	});

	first.await.unwrap().unwrap();
	second.await.unwrap().unwrap();

	let recorded = store.get(ALICE).await.len();
	tokio::time::sleep(Duration::from_millis(50)).await;
	assert_eq!(store.get(ALICE).await.len(), recorded);
}

#[tokio::test]
async fn test_no_watcher_polls_after_close() {
	let (chain, height, queries) = controlled_chain(100, HashMap::new());
	let coordinator = coordinator_for(chain, Arc::new(InMemoryTransactionStore::new()));

	for address in [ALICE, BOB, CAROL] {
		assert!(coordinator.subscribe(address).await);
	}

	// Every watcher keeps polling while the chain moves
	tokio::time::timeout(Duration::from_secs(5), async {
		while queries.load(Ordering::SeqCst) < 12 {
			height.fetch_add(1, Ordering::SeqCst);
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	})
	.await
	.unwrap();

	coordinator.close().await.unwrap();
	let at_close = queries.load(Ordering::SeqCst);

	// Ten poll intervals of the test network
	height.fetch_add(5, Ordering::SeqCst);
	tokio::time::sleep(Duration::from_millis(50)).await;

	assert_eq!(queries.load(Ordering::SeqCst), at_close);
	assert_eq!(coordinator.active_subscriptions().await, 0);
}

#[tokio::test]
async fn test_store_failure_does_not_end_subscription() {
	let blocks = HashMap::from([
		(31, vec![transfer(1, ALICE, BOB, 31)]),
		(32, vec![transfer(2, BOB, ALICE, 32)]),
	]);
	let (chain, _) = scripted_chain(vec![30, 32], blocks);

	let stored = Arc::new(Mutex::new(Vec::new()));
	let mut store = MockTransactionStore::new();
	let recorder = stored.clone();
	let calls = AtomicU64::new(0);
	store.expect_append().returning(move |_, transaction| {
		if calls.fetch_add(1, Ordering::SeqCst) == 0 {
			return Err(StorageError::Backend(anyhow::anyhow!("disk on fire")));
		}
		recorder.lock().unwrap().push(transaction);
		Ok(())
	});

	let coordinator = coordinator_for(chain, Arc::new(store));
	assert!(coordinator.subscribe(ALICE).await);

	tokio::time::timeout(Duration::from_secs(5), async {
		while stored.lock().unwrap().is_empty() {
			tokio::time::sleep(Duration::from_millis(5)).await;
		}
	})
	.await
	.unwrap();

	coordinator.close().await.unwrap();
	assert_eq!(*stored.lock().unwrap(), vec![transfer(2, BOB, ALICE, 32)]);
}

#[tokio::test]
async fn test_subscribe_returns_false_when_observer_fails() {
	let mut observer = MockTransactionObserver::new();
	observer
		.expect_observe()
		.times(1)
		.returning(|_| Err(BlockWatcherError::invalid_config("no watcher for you")));

	let coordinator = SubscriptionCoordinator::new(
		observer,
		Arc::new(MockChainClient::new()),
		Arc::new(InMemoryTransactionStore::new()),
	);

	assert!(!coordinator.subscribe(ALICE).await);
	assert_eq!(coordinator.active_subscriptions().await, 0);
	coordinator.close().await.unwrap();
}

#[tokio::test]
async fn test_current_height_through_coordinator() {
	let mut chain = MockChainClient::new();
	let mut seq = mockall::Sequence::new();
	chain
		.expect_current_height()
		.times(1)
		.in_sequence(&mut seq)
		.returning(|| Ok(19_000_000));
	chain
		.expect_current_height()
		.times(1)
		.in_sequence(&mut seq)
		.returning(|| Err(anyhow::anyhow!("connection refused")));

	let coordinator = coordinator_for(chain, Arc::new(InMemoryTransactionStore::new()));

	assert_eq!(coordinator.get_current_height().await, 19_000_000);
	assert_eq!(coordinator.get_current_height().await, 0);
}
