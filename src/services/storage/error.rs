//! Transaction store error types.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use thiserror::Error as ThisError;
use uuid::Uuid;

#[derive(ThisError, Debug)]
pub enum StorageError {
	/// A writer panicked while holding the store lock
	#[error("Cannot record {transaction} for {address}: {context}")]
	Poisoned {
		address: String,
		transaction: String,
		context: ErrorContext,
	},

	/// Recorded transactions could not be exported
	#[error("Failed to export recorded transactions: {0}")]
	Export(ErrorContext),

	/// Failure reported by a store backend other than the in-memory one
	#[error(transparent)]
	Backend(#[from] anyhow::Error),
}

impl StorageError {
	pub fn poisoned(address: &str, transaction: impl ToString, lock_error: impl ToString) -> Self {
		Self::Poisoned {
			address: address.to_string(),
			transaction: transaction.to_string(),
			context: ErrorContext::logged(lock_error.to_string(), None, None),
		}
	}

	pub fn export(cause: serde_json::Error) -> Self {
		Self::Export(ErrorContext::logged(cause.to_string(), Some(Box::new(cause)), None))
	}
}

impl TraceableError for StorageError {
	fn trace_id(&self) -> String {
		match self {
			Self::Poisoned { context, .. } | Self::Export(context) => context.trace_id.clone(),
			Self::Backend(_) => Uuid::new_v4().to_string(),
		}
	}
}
