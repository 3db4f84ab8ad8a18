//! In-memory transaction store.

use async_trait::async_trait;
use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
	models::{SerializableTransaction, Transaction},
	services::storage::{StorageError, TransactionStore},
	utils::{metrics::TRANSACTIONS_STORED, normalize_string},
};

type TransactionIndex = HashMap<String, Vec<Transaction>>;

/// Transaction store backed by a single mutex-guarded map
///
/// Addresses are normalised (trimmed, lowercased) before they are used as keys,
/// so checksummed and lowercase spellings of the same address share one entry.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
	entries: Mutex<TransactionIndex>,
}

impl InMemoryTransactionStore {
	/// Creates an empty store
	pub fn new() -> Self {
		Self::default()
	}

	/// Read access never fails: a poisoned lock still holds consistent data
	/// because appends are a single `push`.
	fn read(&self) -> MutexGuard<'_, TransactionIndex> {
		self.entries.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Exports every recorded transaction as a JSON array of
	/// `{address, transaction}` objects, ordered by address then insertion
	pub fn export_json(&self) -> Result<String, StorageError> {
		let entries = self.read();

		let mut addresses: Vec<&String> = entries.keys().collect();
		addresses.sort();

		let records: Vec<SerializableTransaction> = addresses
			.into_iter()
			.flat_map(|address| {
				entries[address]
					.iter()
					.map(move |transaction| SerializableTransaction {
						address: address.clone(),
						transaction: transaction.clone(),
					})
			})
			.collect();

		serde_json::to_string_pretty(&records).map_err(StorageError::export)
	}
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
	async fn append(&self, address: &str, transaction: Transaction) -> Result<(), StorageError> {
		let key = normalize_string(address);

		let mut entries = self
			.entries
			.lock()
			.map_err(|e| StorageError::poisoned(&key, transaction.hash, e))?;

		entries.entry(key).or_default().push(transaction);
		TRANSACTIONS_STORED.inc();

		Ok(())
	}

	async fn get(&self, address: &str) -> Vec<Transaction> {
		self.read()
			.get(&normalize_string(address))
			.cloned()
			.unwrap_or_default()
	}

	async fn addresses(&self) -> Vec<String> {
		let mut addresses: Vec<String> = self.read().keys().cloned().collect();
		addresses.sort();
		addresses
	}
}
