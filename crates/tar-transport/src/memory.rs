//! In-memory [`TokenLedger`] for tests and dry runs.
//!
//! Networks are keyed by RPC URL, tokens by `(rpc url, contract)`. Calls can be
//! scripted to fail, and every call is logged so tests can check exactly
//! which reads and writes happened.
//!
//! # Example
//!
//! ```
//! use tar_transport::memory::{InMemoryLedger, TokenState};
//! use tar_types::EvmAddress;
//!
//! let ledger = InMemoryLedger::new()
//!     .with_chain("mem://sepolia", 11155111)
//!     .with_token("mem://sepolia", EvmAddress::new([0xaa; 20]), TokenState::new(EvmAddress::ZERO));
//! assert_eq!(ledger.token_count(), 1);
//! ```

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use tar_types::EvmAddress;

use crate::ledger::TokenLedger;

/// Contract state of one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    pub predecessor: String,
    pub successor: String,
    pub owner: EvmAddress,
    pub checksums: Vec<Vec<u8>>,
    pub data_uris: Vec<String>,
}

impl TokenState {
    /// A token with no links, a zero checksum, and an empty data URI at index 0.
    pub fn new(owner: EvmAddress) -> Self {
        Self {
            predecessor: String::new(),
            successor: String::new(),
            owner,
            checksums: vec![vec![0u8; 32]],
            data_uris: vec![String::new()],
        }
    }

    pub fn with_predecessor(mut self, id: &str) -> Self {
        self.predecessor = id.to_string();
        self
    }

    pub fn with_successor(mut self, id: &str) -> Self {
        self.successor = id.to_string();
        self
    }

    pub fn with_checksum(mut self, checksum: Vec<u8>) -> Self {
        self.checksums = vec![checksum];
        self
    }

    pub fn with_data_uri(mut self, uri: &str) -> Self {
        self.data_uris = vec![uri.to_string()];
        self
    }
}

/// One logged ledger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    pub rpc_url: String,
    pub contract: Option<EvmAddress>,
    pub method: &'static str,
}

#[derive(Default)]
struct LedgerState {
    chains: HashMap<String, u64>,
    tokens: HashMap<(String, EvmAddress), TokenState>,
    failing: HashSet<(String, &'static str)>,
    calls: Vec<LedgerCall>,
    tx_counter: u64,
}

/// Synthetic multi-network ledger.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a network answering `eth_chainId` with `chain_id`.
    pub fn with_chain(self, rpc_url: &str, chain_id: u64) -> Self {
        self.state.lock().chains.insert(rpc_url.to_string(), chain_id);
        self
    }

    pub fn with_token(self, rpc_url: &str, contract: EvmAddress, token: TokenState) -> Self {
        self.insert_token(rpc_url, contract, token);
        self
    }

    /// Make every `method` call against `rpc_url` fail.
    ///
    /// Method names are the ones logged in [`LedgerCall::method`]:
    /// `chain_id`, `predecessor`, `successor`, `owner`, `checksum`,
    /// `data_uri`, `replace`.
    pub fn with_failure(self, rpc_url: &str, method: &'static str) -> Self {
        self.state
            .lock()
            .failing
            .insert((rpc_url.to_string(), method));
        self
    }

    pub fn insert_token(&self, rpc_url: &str, contract: EvmAddress, token: TokenState) {
        self.state
            .lock()
            .tokens
            .insert((rpc_url.to_string(), contract), token);
    }

    /// Current state of a token, if present.
    pub fn token(&self, rpc_url: &str, contract: &EvmAddress) -> Option<TokenState> {
        self.state
            .lock()
            .tokens
            .get(&(rpc_url.to_string(), *contract))
            .cloned()
    }

    pub fn token_count(&self) -> usize {
        self.state.lock().tokens.len()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.state.lock().calls.clone()
    }

    /// Number of logged calls with the given method name.
    pub fn call_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    fn record(
        &self,
        rpc_url: &str,
        contract: Option<EvmAddress>,
        method: &'static str,
    ) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(LedgerCall {
            rpc_url: rpc_url.to_string(),
            contract,
            method,
        });
        if state.failing.contains(&(rpc_url.to_string(), method)) {
            return Err(anyhow!("injected {} failure on {}", method, rpc_url));
        }
        Ok(())
    }

    fn read<T>(
        &self,
        rpc_url: &str,
        contract: &EvmAddress,
        method: &'static str,
        f: impl FnOnce(&TokenState) -> Result<T>,
    ) -> Result<T> {
        self.record(rpc_url, Some(*contract), method)?;
        let state = self.state.lock();
        let token = state
            .tokens
            .get(&(rpc_url.to_string(), *contract))
            .ok_or_else(|| anyhow!("execution reverted: no contract at {} on {}", contract, rpc_url))?;
        f(token)
    }
}

fn indexed<T: Clone>(items: &[T], index: u64, what: &str) -> Result<T> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| anyhow!("execution reverted: {} index {} out of range", what, index))
}

#[async_trait]
impl TokenLedger for InMemoryLedger {
    async fn chain_id(&self, rpc_url: &str) -> Result<u64> {
        self.record(rpc_url, None, "chain_id")?;
        self.state
            .lock()
            .chains
            .get(rpc_url)
            .copied()
            .ok_or_else(|| anyhow!("connection refused: {}", rpc_url))
    }

    async fn predecessor(&self, rpc_url: &str, contract: &EvmAddress) -> Result<String> {
        self.read(rpc_url, contract, "predecessor", |t| Ok(t.predecessor.clone()))
    }

    async fn successor(&self, rpc_url: &str, contract: &EvmAddress) -> Result<String> {
        self.read(rpc_url, contract, "successor", |t| Ok(t.successor.clone()))
    }

    async fn owner(&self, rpc_url: &str, contract: &EvmAddress) -> Result<EvmAddress> {
        self.read(rpc_url, contract, "owner", |t| Ok(t.owner))
    }

    async fn checksum(&self, rpc_url: &str, contract: &EvmAddress, index: u64) -> Result<Vec<u8>> {
        self.read(rpc_url, contract, "checksum", |t| {
            indexed(&t.checksums, index, "checksum")
        })
    }

    async fn data_uri(&self, rpc_url: &str, contract: &EvmAddress, index: u64) -> Result<String> {
        self.read(rpc_url, contract, "data_uri", |t| {
            indexed(&t.data_uris, index, "dataUri")
        })
    }

    async fn replace(
        &self,
        rpc_url: &str,
        sender: Option<EvmAddress>,
        contract: &EvmAddress,
        successor: &str,
    ) -> Result<String> {
        self.record(rpc_url, Some(*contract), "replace")?;
        let mut state = self.state.lock();
        let token = state
            .tokens
            .get_mut(&(rpc_url.to_string(), *contract))
            .ok_or_else(|| anyhow!("execution reverted: no contract at {} on {}", contract, rpc_url))?;
        if let Some(sender) = sender {
            if sender != token.owner {
                return Err(anyhow!("execution reverted: caller {} is not the owner", sender));
            }
        }
        token.successor = successor.to_string();
        state.tx_counter += 1;
        Ok(format!("0x{:064x}", state.tx_counter))
    }
}
