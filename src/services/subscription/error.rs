//! Subscription coordinator error types.
//!
//! Only [`SubscriptionCoordinator::close`](super::SubscriptionCoordinator::close) returns
//! one. Failures on the streaming path are logged and absorbed.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum SubscriptionError {
	/// Some subscription tasks failed while being joined
	#[error("Subscriptions did not shut down cleanly: {context}")]
	Shutdown {
		/// Addresses whose task failed, in subscription order
		addresses: Vec<String>,
		context: ErrorContext,
	},
}

impl SubscriptionError {
	/// `failures` pairs each failed address with the reason its task gave
	pub fn shutdown(failures: Vec<(String, String)>, joined: usize) -> Self {
		let message = format!("{} of {} tasks failed", failures.len(), joined);
		let addresses = failures.iter().map(|(address, _)| address.clone()).collect();

		Self::Shutdown {
			addresses,
			context: ErrorContext::logged(message, None, Some(failures.into_iter().collect::<HashMap<_, _>>())),
		}
	}

	/// Addresses whose task failed
	pub fn addresses(&self) -> &[String] {
		match self {
			Self::Shutdown { addresses, .. } => addresses,
		}
	}
}

impl TraceableError for SubscriptionError {
	fn trace_id(&self) -> String {
		match self {
			Self::Shutdown { context, .. } => context.trace_id.clone(),
		}
	}
}
