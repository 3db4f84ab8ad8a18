use async_trait::async_trait;
use mockall::mock;

use address_watcher::{
	models::Transaction,
	services::{
		blockwatcher::{BlockWatcherError, Observation, TransactionObserver},
		storage::{StorageError, TransactionStore},
	},
};

mock! {
	pub TransactionStore {}

	#[async_trait]
	impl TransactionStore for TransactionStore {
		async fn append(&self, address: &str, transaction: Transaction) -> Result<(), StorageError>;
		async fn get(&self, address: &str) -> Vec<Transaction>;
		async fn addresses(&self) -> Vec<String>;
	}
}

mock! {
	pub TransactionObserver {}

	impl TransactionObserver for TransactionObserver {
		fn observe(&self, address: &str) -> Result<Observation, BlockWatcherError>;
	}
}
