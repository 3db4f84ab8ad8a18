//! Block watcher error types.
//!
//! Only configuration and runtime problems escape [`TransactionObserver::observe`](super::TransactionObserver::observe).
//! Upstream failures are returned by a single tick and absorbed by the polling loop.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;
use tokio::{runtime::TryCurrentError, task::JoinError};

#[derive(ThisError, Debug)]
pub enum BlockWatcherError {
	/// Polling parameters that cannot drive a loop
	#[error("Unusable watcher configuration: {0}")]
	Config(ErrorContext),

	/// There is no runtime to spawn the watcher of `address` on
	#[error("Cannot start watcher for {address}: {context}")]
	NoRuntime { address: String, context: ErrorContext },

	/// A chain client call made during a tick failed
	#[error("{call} failed for {address}: {context}")]
	Upstream {
		address: String,
		call: &'static str,
		context: ErrorContext,
	},

	/// The watcher task panicked or was cancelled
	#[error("Watcher task did not exit cleanly: {0}")]
	Task(ErrorContext),
}

impl BlockWatcherError {
	pub fn invalid_config(msg: impl Into<String>) -> Self {
		Self::Config(ErrorContext::new(msg, None, None))
	}

	pub fn no_runtime(address: &str, cause: TryCurrentError) -> Self {
		Self::NoRuntime {
			address: address.to_string(),
			context: ErrorContext::logged(cause.to_string(), Some(Box::new(cause)), None),
		}
	}

	/// `call` failed while scanning for `address`; `block` is the height being fetched
	pub fn upstream(address: &str, call: &'static str, block: Option<u64>, cause: anyhow::Error) -> Self {
		let metadata = block.map(|block| HashMap::from([("block".to_string(), block.to_string())]));

		Self::Upstream {
			address: address.to_string(),
			call,
			context: ErrorContext::logged(cause.to_string(), Some(cause.into()), metadata),
		}
	}

	pub fn task_failed(cause: JoinError) -> Self {
		let message = if cause.is_panic() { "panicked" } else { "cancelled" };
		Self::Task(ErrorContext::logged(message, Some(Box::new(cause)), None))
	}

	fn context(&self) -> &ErrorContext {
		match self {
			Self::Config(context) | Self::Task(context) => context,
			Self::NoRuntime { context, .. } | Self::Upstream { context, .. } => context,
		}
	}
}

impl TraceableError for BlockWatcherError {
	fn trace_id(&self) -> String {
		self.context().trace_id.clone()
	}
}
