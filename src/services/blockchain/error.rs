//! Failures of the chain clients that are not transport failures.
//!
//! Transport problems stay [`TransportError`](super::TransportError)s. The two
//! variants here cover answers that arrived but cannot be used.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::{collections::HashMap, num::ParseIntError};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum BlockChainError {
	/// The node reported a height that is not a block number
	#[error("Unusable block number: {0}")]
	BadHeight(ErrorContext),

	/// The node has no block at the requested height
	#[error("Block {number} not found: {context}")]
	BlockNotFound { number: u64, context: ErrorContext },
}

impl BlockChainError {
	/// `raw` could not be read as a height; `overflow` is set when it had only digits
	pub fn bad_height(raw: &str, overflow: Option<ParseIntError>) -> Self {
		let message = match overflow {
			Some(_) => format!("'{}' does not fit in 64 bits", raw),
			None => format!("'{}' is not a decimal or 0x-prefixed hex number", raw),
		};

		Self::BadHeight(ErrorContext::new(message, overflow.map(|e| Box::new(e) as _), None))
	}

	/// `method` returned `null` for block `number`
	pub fn block_not_found(number: u64, method: &str) -> Self {
		Self::BlockNotFound {
			number,
			context: ErrorContext::logged(
				"node returned null",
				None,
				Some(HashMap::from([("method".to_string(), method.to_string())])),
			),
		}
	}
}

impl TraceableError for BlockChainError {
	fn trace_id(&self) -> String {
		match self {
			Self::BadHeight(context) | Self::BlockNotFound { context, .. } => context.trace_id.clone(),
		}
	}
}
