//! Watches a blockchain for transactions sent from or to a set of addresses.
//!
//! Addresses are subscribed at runtime. Each subscription polls the chain on its
//! own schedule, scans every new block at most once (bounded by a backfill
//! depth) and records matching transactions in a shared store that can be read
//! at any time. Closing the coordinator stops every subscription and waits for
//! all of them before returning.
//!
//! - `bootstrap`: wiring used by the binary
//! - `models`: transactions, blocks and network configuration
//! - `services`: chain client, watchers, store and subscription coordinator
//! - `utils`: logging, metrics, HTTP retries and parsing helpers

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
