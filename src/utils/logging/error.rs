//! Error context shared by the service error types.
//!
//! Every service error variant wraps an [`ErrorContext`]. Watcher and drain loops
//! absorb most failures after logging them, so the trace id is what ties the log
//! line written at creation time to a later report of the same failure.

use std::{collections::HashMap, error::Error, fmt, iter};
use uuid::Uuid;

type BoxedSource = Box<dyn Error + Send + Sync + 'static>;

/// Message, cause and key/value details of a failure
#[derive(Debug)]
pub struct ErrorContext {
	/// Human readable description
	pub message: String,
	/// Underlying cause, if any
	pub source: Option<BoxedSource>,
	/// Details such as the address or URL involved, sorted by key
	pub metadata: Vec<(String, String)>,
	/// Correlation id, shared with the source when the source already has one
	pub trace_id: String,
}

impl ErrorContext {
	/// Builds a context without logging it
	pub fn new(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let trace_id = source
			.as_deref()
			.and_then(|source| inherited_trace_id(source))
			.unwrap_or_else(|| Uuid::new_v4().to_string());

		let mut metadata: Vec<(String, String)> = metadata.unwrap_or_default().into_iter().collect();
		metadata.sort();

		Self {
			message: message.into(),
			source,
			metadata,
			trace_id,
		}
	}

	/// Builds a context and emits it as an error event
	pub fn logged(
		message: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		let context = Self::new(message, source, metadata);

		match context.source.as_deref() {
			Some(source) => tracing::error!(
				trace_id = %context.trace_id,
				cause = %cause_chain(source),
				"{}",
				context
			),
			None => tracing::error!(trace_id = %context.trace_id, "{}", context),
		}

		context
	}

	/// Returns the value recorded under `key`
	pub fn detail(&self, key: &str) -> Option<&str> {
		self.metadata
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, value)| value.as_str())
	}
}

impl fmt::Display for ErrorContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message)?;

		if !self.metadata.is_empty() {
			let details: Vec<String> = self
				.metadata
				.iter()
				.map(|(key, value)| format!("{}={}", key, value))
				.collect();
			write!(f, " [{}]", details.join(", "))?;
		}

		Ok(())
	}
}

impl Error for ErrorContext {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		self.source.as_deref().map(|source| source as &(dyn Error + 'static))
	}
}

/// Errors exposing the trace id of the context they wrap
pub trait TraceableError: Error + Send + Sync {
	/// Returns the trace id of this error
	fn trace_id(&self) -> String;
}

/// Depth of the cause chain searched for an existing trace id
const TRACE_SEARCH_DEPTH: usize = 4;

fn inherited_trace_id(source: &(dyn Error + 'static)) -> Option<String> {
	iter::successors(Some(source), |&err| err.source())
		.take(TRACE_SEARCH_DEPTH)
		.find_map(own_trace_id)
}

fn own_trace_id(err: &(dyn Error + 'static)) -> Option<String> {
	use crate::{
		models::ConfigError,
		services::{
			blockchain::{BlockChainError, TransportError},
			blockwatcher::BlockWatcherError,
			storage::StorageError,
			subscription::SubscriptionError,
		},
	};

	if let Some(context) = err.downcast_ref::<ErrorContext>() {
		return Some(context.trace_id.clone());
	}

	err.downcast_ref::<TransportError>()
		.map(TraceableError::trace_id)
		.or_else(|| err.downcast_ref::<BlockChainError>().map(TraceableError::trace_id))
		.or_else(|| err.downcast_ref::<BlockWatcherError>().map(TraceableError::trace_id))
		.or_else(|| err.downcast_ref::<StorageError>().map(TraceableError::trace_id))
		.or_else(|| err.downcast_ref::<SubscriptionError>().map(TraceableError::trace_id))
		.or_else(|| err.downcast_ref::<ConfigError>().map(TraceableError::trace_id))
}

fn cause_chain(source: &(dyn Error + 'static)) -> String {
	iter::successors(Some(source), |&err| err.source())
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join(" <- ")
}
