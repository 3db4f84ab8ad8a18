use crate::models::Transaction;
use alloy::primitives::{Bytes, B256, U256, U64};
use serde_json::Value;
use std::collections::HashMap;

/// A builder for creating test transactions with default values.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
	hash: Option<B256>,
	from: Option<String>,
	to: Option<String>,
	block_number: Option<u64>,
	transaction_index: Option<u64>,
	value: Option<U256>,
	input: Option<Bytes>,
	extra: HashMap<String, Value>,
}

impl TransactionBuilder {
	/// Creates a new TransactionBuilder instance.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the hash of the transaction.
	pub fn hash(mut self, hash: B256) -> Self {
		self.hash = Some(hash);
		self
	}

	/// Sets the hash to a value ending in `n`, handy for telling transactions apart.
	pub fn hash_from(mut self, n: u64) -> Self {
		self.hash = Some(B256::from(U256::from(n)));
		self
	}

	/// Sets the sender address of the transaction.
	pub fn from(mut self, from: &str) -> Self {
		self.from = Some(from.to_string());
		self
	}

	/// Sets the recipient address of the transaction.
	pub fn to(mut self, to: &str) -> Self {
		self.to = Some(to.to_string());
		self
	}

	/// Sets the block the transaction was included in.
	pub fn block_number(mut self, block_number: u64) -> Self {
		self.block_number = Some(block_number);
		self
	}

	/// Sets the position of the transaction within its block.
	pub fn transaction_index(mut self, index: u64) -> Self {
		self.transaction_index = Some(index);
		self
	}

	/// Sets the transaction value (amount sent).
	pub fn value(mut self, value: U256) -> Self {
		self.value = Some(value);
		self
	}

	/// Sets the transaction input data.
	pub fn input(mut self, input: Bytes) -> Self {
		self.input = Some(input);
		self
	}

	/// Adds an opaque pass-through field.
	pub fn extra(mut self, key: &str, value: Value) -> Self {
		self.extra.insert(key.to_string(), value);
		self
	}

	/// Builds the Transaction instance.
	pub fn build(self) -> Transaction {
		Transaction {
			hash: self.hash.unwrap_or_default(),
			from: self
				.from
				.unwrap_or_else(|| "0x0000000000000000000000000000000000000000".to_string()),
			to: self.to,
			block_number: self.block_number.map(U64::from),
			block_hash: None,
			transaction_index: self.transaction_index.map(U64::from),
			value: self.value.unwrap_or_default(),
			input: self.input.unwrap_or_default(),
			extra: self.extra,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_transaction() {
		let tx = TransactionBuilder::new().build();

		assert_eq!(tx.hash, B256::default());
		assert_eq!(tx.from, "0x0000000000000000000000000000000000000000");
		assert_eq!(tx.to, None);
		assert_eq!(tx.block_number(), None);
		assert_eq!(tx.value, U256::ZERO);
		assert!(tx.extra.is_empty());
	}

	#[test]
	fn test_full_transaction() {
		let tx = TransactionBuilder::new()
			.hash_from(7)
			.from("0xaaaa")
			.to("0xbbbb")
			.block_number(12)
			.transaction_index(3)
			.value(U256::from(100))
			.extra("gas", Value::String("0x5208".to_string()))
			.build();

		assert_eq!(tx.hash, B256::with_last_byte(7));
		assert_eq!(tx.sender(), "0xaaaa");
		assert_eq!(tx.to(), Some("0xbbbb"));
		assert_eq!(tx.block_number(), Some(12));
		assert_eq!(tx.transaction_index, Some(U64::from(3)));
		assert_eq!(tx.value, U256::from(100));
		assert_eq!(tx.extra.len(), 1);
	}
}
