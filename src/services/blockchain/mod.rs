//! Blockchain client interfaces and implementations.
//!
//! Provides the boundary the watcher polls through. Includes:
//!
//! - The `ChainClient` trait and block number parsing
//! - The EVM JSON-RPC client
//! - Network transport implementations
//! - Error handling for blockchain operations

mod client;
mod clients;
mod error;
mod transports;

pub use client::{parse_block_number, ChainClient};
pub use clients::EvmClient;
pub use error::BlockChainError;
pub use transports::{
	rotates_endpoint, BlockchainTransport, EndpointManager, HttpTransportClient,
	RetryUnlessRateLimited, TransportError,
};
