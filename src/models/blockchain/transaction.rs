//! Transaction data structures.

use std::collections::HashMap;

use alloy::primitives::{Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

/// A transaction reduced to the fields address matching needs.
///
/// Addresses are kept as the strings the node returned so that matching stays
/// agnostic of checksum casing. Every field not named here lands in `extra`.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
	/// Hash
	pub hash: B256,
	/// Sender
	pub from: String,
	/// Recipient (None when contract creation)
	#[serde(default)]
	pub to: Option<String>,
	/// Block number. None when pending.
	#[serde(rename = "blockNumber", default)]
	pub block_number: Option<U64>,
	/// Block hash. None when pending.
	#[serde(rename = "blockHash", default)]
	pub block_hash: Option<B256>,
	/// Transaction Index. None when pending.
	#[serde(rename = "transactionIndex", default)]
	pub transaction_index: Option<U64>,
	/// Transferred value
	#[serde(default)]
	pub value: U256,
	/// Input data
	#[serde(default)]
	pub input: Bytes,
	/// Catch-all for non-standard fields
	#[serde(flatten)]
	pub extra: HashMap<String, serde_json::Value>,
}

impl Transaction {
	/// Get the transaction hash
	pub fn hash(&self) -> &B256 {
		&self.hash
	}

	/// Get the transaction sender address
	pub fn sender(&self) -> &str {
		&self.from
	}

	/// Get the transaction recipient address (None for contract creation)
	pub fn to(&self) -> Option<&str> {
		self.to.as_deref()
	}

	/// Get the number of the block that included this transaction
	pub fn block_number(&self) -> Option<u64> {
		self.block_number.map(|n| n.to::<u64>())
	}

	/// Get the transaction value (amount of native currency transferred)
	pub fn value(&self) -> &U256 {
		&self.value
	}

	/// Returns true if `address` is the sender or the recipient.
	///
	/// Hex addresses are compared ASCII case-insensitively so that checksummed and
	/// lowercase forms match each other.
	pub fn involves(&self, address: &str) -> bool {
		let address = address.trim();
		self.from.eq_ignore_ascii_case(address)
			|| self
				.to
				.as_deref()
				.is_some_and(|to| to.eq_ignore_ascii_case(address))
	}
}

/// A transaction tagged with the subscribed address it was recorded under
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SerializableTransaction {
	/// The subscribed address
	pub address: String,
	/// The matched transaction
	pub transaction: Transaction,
}
