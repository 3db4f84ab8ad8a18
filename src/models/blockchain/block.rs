//! Block data structures.

use alloy::primitives::{B256, U64};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Transaction;

/// A block with its full transaction objects, as returned by `eth_getBlockByNumber`
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Block {
	/// Block number. None if pending.
	#[serde(default)]
	pub number: Option<U64>,
	/// Hash of the block. None if pending.
	#[serde(default)]
	pub hash: Option<B256>,
	/// Transactions in block order
	#[serde(default)]
	pub transactions: Vec<Transaction>,
	/// Catch-all for every other header field
	#[serde(flatten)]
	pub extra: HashMap<String, serde_json::Value>,
}

impl Block {
	/// Get the block number
	pub fn number(&self) -> Option<u64> {
		self.number.map(|n| n.to::<u64>())
	}
}
