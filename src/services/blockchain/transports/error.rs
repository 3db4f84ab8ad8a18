//! Errors produced while talking JSON-RPC over HTTP.
//!
//! Each variant matches one way a request handled by the endpoint manager can end:
//! the node answered with an HTTP error, the node answered with a JSON-RPC error
//! object, the node could not be reached, the payload could not be encoded or
//! decoded, or no fallback endpoint was left to rotate to.

use crate::utils::logging::error::{ErrorContext, TraceableError};
use reqwest::StatusCode;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
	/// Non-success HTTP status that was not resolved by rotating endpoints
	#[error("{url} answered HTTP {status}: {context}")]
	Http {
		url: String,
		status: StatusCode,
		body: String,
		context: ErrorContext,
	},

	/// Well-formed response carrying a JSON-RPC `error` object
	#[error("JSON-RPC error {code} from {url}: {context}")]
	JsonRpc {
		url: String,
		code: i64,
		context: ErrorContext,
	},

	/// The request never got a response and no fallback took over
	#[error("{url} is unreachable: {context}")]
	Unreachable { url: String, context: ErrorContext },

	/// Request could not be encoded or response could not be decoded
	#[error("Invalid JSON-RPC payload: {0}")]
	InvalidPayload(ErrorContext),

	/// Rotation was needed but no fallback endpoint passed the connection check
	#[error("No usable fallback endpoint: {0}")]
	NoFallback(ErrorContext),
}

impl TransportError {
	/// HTTP error from `url`; `rotation` is the failed attempt to move away from it
	pub fn http(url: &str, status: StatusCode, body: String, rotation: Option<TransportError>) -> Self {
		let message = match rotation {
			Some(_) => "request rejected and no fallback took over",
			None => "request rejected",
		};

		Self::Http {
			url: url.to_string(),
			status,
			context: ErrorContext::logged(message, rotation.map(|e| Box::new(e) as _), None),
			body,
		}
	}

	/// JSON-RPC error object returned by `url`
	pub fn json_rpc(url: &str, code: i64, message: impl Into<String>) -> Self {
		Self::JsonRpc {
			url: url.to_string(),
			code,
			context: ErrorContext::logged(message, None, None),
		}
	}

	/// `url` could not be reached and rotating away from it failed with `rotation`
	pub fn unreachable(
		url: &str,
		cause: impl std::error::Error + Send + Sync + 'static,
		rotation: Option<TransportError>,
	) -> Self {
		let metadata = rotation.map(|e| HashMap::from([("rotation".to_string(), e.to_string())]));

		Self::Unreachable {
			url: url.to_string(),
			context: ErrorContext::logged(cause.to_string(), Some(Box::new(cause)), metadata),
		}
	}

	/// Encoding or decoding failure, `url` is set for responses
	pub fn invalid_payload(
		msg: impl Into<String>,
		cause: impl std::error::Error + Send + Sync + 'static,
		url: Option<&str>,
	) -> Self {
		let metadata = url.map(|url| HashMap::from([("url".to_string(), url.to_string())]));
		Self::InvalidPayload(ErrorContext::logged(msg, Some(Box::new(cause)), metadata))
	}

	/// No fallback of `active_url` could take over; `last_check` is the last failed check
	pub fn no_fallback(
		msg: impl Into<String>,
		active_url: &str,
		last_check: Option<anyhow::Error>,
	) -> Self {
		Self::NoFallback(ErrorContext::logged(
			msg,
			last_check.map(Into::into),
			Some(HashMap::from([(
				"active_url".to_string(),
				active_url.to_string(),
			)])),
		))
	}

	fn context(&self) -> &ErrorContext {
		match self {
			Self::Http { context, .. }
			| Self::JsonRpc { context, .. }
			| Self::Unreachable { context, .. } => context,
			Self::InvalidPayload(context) | Self::NoFallback(context) => context,
		}
	}
}

impl TraceableError for TransportError {
	fn trace_id(&self) -> String {
		self.context().trace_id.clone()
	}
}
