//! Core services implementing the business logic.
//!
//! This module contains the main service implementations:
//! - `blockchain`: Chain client interface and the EVM JSON-RPC implementation
//! - `blockwatcher`: Per-address block polling and transaction matching
//! - `storage`: Storage of matched transactions
//! - `subscription`: Subscription lifecycle and shutdown coordination

pub mod blockchain;
pub mod blockwatcher;
pub mod storage;
pub mod subscription;
