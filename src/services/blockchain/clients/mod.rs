//! Chain client implementations.
//!
//! - EVM client for Ethereum-compatible chains, speaking JSON-RPC

mod evm {
	pub mod client;
}

pub use evm::client::EvmClient;
