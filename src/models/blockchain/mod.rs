//! Chain data as seen at the chain client boundary.
//!
//! Upstream nodes return deeply nested block and transaction objects. Only the
//! handful of fields the watcher needs are typed here; everything else is kept
//! in an opaque `extra` map and passed through unchanged.

mod block;
mod transaction;

pub use block::Block;
pub use transaction::{SerializableTransaction, Transaction};
