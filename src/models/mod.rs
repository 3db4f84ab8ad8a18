//! Data exchanged between the chain client, the watchers and the store, plus
//! the network configuration they are built from.

mod blockchain;
mod config;
mod core;

pub use blockchain::{Block, SerializableTransaction, Transaction};
pub use config::{ConfigError, ConfigLoader};
pub use core::{Network, RpcUrl};
