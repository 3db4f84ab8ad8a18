//! Chain client interface.
//!
//! The watcher only ever asks two questions of a chain: how tall is it, and what
//! transactions does a given block hold. [`ChainClient`] captures exactly that,
//! so watchers receive the client they poll at construction instead of reaching
//! for process-wide state.

use async_trait::async_trait;

use crate::{models::Transaction, services::blockchain::BlockChainError};

/// Read-only access to chain height and block contents
///
/// Implementations are expected to be stateless from the caller's point of view:
/// the same height always yields the same transactions.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Retrieves the current chain height
	///
	/// # Returns
	/// * `Result<u64, anyhow::Error>` - The latest block number or an error
	async fn current_height(&self) -> Result<u64, anyhow::Error>;

	/// Retrieves the transactions included in the block at `height`
	///
	/// # Arguments
	/// * `height` - The block number to fetch
	///
	/// # Returns
	/// * `Result<Vec<Transaction>, anyhow::Error>` - Transactions in block order or an error
	async fn transactions_in_block(&self, height: u64) -> Result<Vec<Transaction>, anyhow::Error>;
}

/// Parses a block number as returned by a JSON-RPC node.
///
/// A `0x`/`0X` prefix selects hexadecimal, anything else is read as decimal.
/// Surrounding whitespace is ignored; empty, signed or overflowing input is rejected.
pub fn parse_block_number(raw: &str) -> Result<u64, BlockChainError> {
	let trimmed = raw.trim();

	let (digits, radix) = match trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
	{
		Some(hex) => (hex, 16),
		None => (trimmed, 10),
	};

	if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
		return Err(BlockChainError::bad_height(raw, None));
	}

	u64::from_str_radix(digits, radix).map_err(|e| BlockChainError::bad_height(raw, Some(e)))
}
