use async_trait::async_trait;
use mockall::mock;
use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use address_watcher::{models::Transaction, services::blockchain::ChainClient};

// Mock implementation of the chain client.
// Used to script chain heights and block contents for the watcher pipeline.
mock! {
	pub ChainClient {}

	#[async_trait]
	impl ChainClient for ChainClient {
		async fn current_height(&self) -> Result<u64, anyhow::Error>;
		async fn transactions_in_block(&self, height: u64) -> Result<Vec<Transaction>, anyhow::Error>;
	}
}

/// Chain that reports `heights` one per poll (repeating the last one) and serves
/// the transactions of `blocks`, empty for any other block.
///
/// Returns the mock and the list of block heights it was asked for.
pub fn scripted_chain(
	heights: Vec<u64>,
	blocks: HashMap<u64, Vec<Transaction>>,
) -> (MockChainClient, Arc<Mutex<Vec<u64>>>) {
	let mut chain = MockChainClient::new();

	let remaining = Mutex::new(heights.into_iter().rev().collect::<Vec<_>>());
	let last = Mutex::new(0u64);
	chain.expect_current_height().returning(move || {
		let mut last = last.lock().unwrap();
		if let Some(height) = remaining.lock().unwrap().pop() {
			*last = height;
		}
		Ok(*last)
	});

	let fetched = Arc::new(Mutex::new(Vec::new()));
	let recorder = fetched.clone();
	chain
		.expect_transactions_in_block()
		.returning(move |height| {
			recorder.lock().unwrap().push(height);
			Ok(blocks.get(&height).cloned().unwrap_or_default())
		});

	(chain, fetched)
}
