//! Block watcher service implementation.
//!
//! This module watches the chain on behalf of subscribed addresses. It includes:
//! - A cursor planning which blocks each tick has to scan
//! - The per-address polling loop
//! - A service spawning one watcher task per observed address
//! - Error handling specific to block watching operations

mod cursor;
mod error;
mod service;
mod watcher;

pub use cursor::{BlockCursor, ScanPlan};
pub use error::BlockWatcherError;
pub use service::{BlockWatcherService, Observation, TransactionObserver, WatcherHandle};
pub use watcher::{wait_for_shutdown, BlockWatcher, WatcherConfig};
