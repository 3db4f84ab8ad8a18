//! Transaction storage.
//!
//! Matched transactions are indexed by the address they were observed for. The
//! only implementation keeps everything in memory for the lifetime of the process.

mod error;
mod memory;

use async_trait::async_trait;

use crate::models::Transaction;

pub use error::StorageError;
pub use memory::InMemoryTransactionStore;

/// Append-only index from address to the transactions observed for it
///
/// Implementations must keep insertion order per address and must never remove
/// or rewrite a transaction once appended.
#[async_trait]
pub trait TransactionStore: Send + Sync {
	/// Appends a transaction to the sequence recorded for `address`
	///
	/// # Arguments
	/// * `address` - Subscribed address the transaction matched
	/// * `transaction` - Transaction to record
	///
	/// # Returns
	/// * `Result<(), StorageError>` - Fails only when the store itself is broken
	async fn append(&self, address: &str, transaction: Transaction) -> Result<(), StorageError>;

	/// Returns a snapshot of the transactions recorded for `address`
	///
	/// Unknown addresses yield an empty sequence.
	async fn get(&self, address: &str) -> Vec<Transaction>;

	/// Lists the addresses that have at least one recorded transaction, sorted
	async fn addresses(&self) -> Vec<String>;
}
