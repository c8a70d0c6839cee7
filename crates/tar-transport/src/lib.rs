//! TAR Transport Layer
//!
//! Network transport for reading and replacing TAR token contracts.
//!
//! This crate provides:
//! - [`abi`]: the token contract interface, generated with `sol!`
//! - [`rpc`]: a blocking Ethereum JSON-RPC client
//! - [`ledger`]: the async [`TokenLedger`] seam and its JSON-RPC implementation
//! - [`memory`]: an in-memory ledger for tests and dry runs
//!
//! # Example
//!
//! ```ignore
//! use tar_transport::{JsonRpcLedger, TokenLedger};
//!
//! let ledger = JsonRpcLedger::new();
//! let chain_id = ledger.chain_id("https://ethereum-sepolia-rpc.publicnode.com").await?;
//! let owner = ledger.owner(url, &contract).await?;
//! ```

pub mod abi;
pub mod ledger;
pub mod memory;
pub mod rpc;

pub use ledger::{JsonRpcLedger, TokenLedger};
pub use memory::{InMemoryLedger, LedgerCall, TokenState};
pub use rpc::JsonRpcClient;
