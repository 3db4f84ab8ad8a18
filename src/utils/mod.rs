//! Support code shared by the services and the binary.
//!
//! - `http`: retrying HTTP client behind the JSON-RPC transport
//! - `logging`: subscriber setup and the error context carried by service errors
//! - `metrics`: Prometheus metrics of the watch pipeline and their HTTP endpoint
//! - `parsing`: command line value parsing and lookup key normalization
//! - `tests`: builders and settings for tests

pub mod http;
pub mod logging;
pub mod metrics;
pub mod parsing;

pub use http::{BackoffJitter, RetryConfig};
pub use parsing::{normalize_string, parse_string_to_bytes_size};
