//! Token ledger abstraction.
//!
//! [`TokenLedger`] is the seam between resolution logic and the chains that
//! hold token contracts. Resolution code only ever talks to this trait, so the
//! same fetcher and coordinator run against real nodes ([`JsonRpcLedger`]) or
//! synthetic fixtures ([`crate::memory::InMemoryLedger`]).

use std::time::Duration;

use alloy_sol_types::SolCall;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tar_types::EvmAddress;
use tracing::debug;

use crate::abi::{
    self, checksumCall, dataUriCall, ownerCall, predecessorCall, replaceCall, successorCall,
};
use crate::rpc::JsonRpcClient;

/// Read/write access to token contracts on some set of networks.
///
/// Every method names the network by RPC URL and the token by contract
/// address. Pointer fields come back as raw strings; the empty string means
/// "no link".
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Chain id reported by the network behind `rpc_url`.
    async fn chain_id(&self, rpc_url: &str) -> Result<u64>;

    async fn predecessor(&self, rpc_url: &str, contract: &EvmAddress) -> Result<String>;

    async fn successor(&self, rpc_url: &str, contract: &EvmAddress) -> Result<String>;

    async fn owner(&self, rpc_url: &str, contract: &EvmAddress) -> Result<EvmAddress>;

    async fn checksum(&self, rpc_url: &str, contract: &EvmAddress, index: u64) -> Result<Vec<u8>>;

    async fn data_uri(&self, rpc_url: &str, contract: &EvmAddress, index: u64) -> Result<String>;

    /// Submit `replace(successor)` on `contract`, returning the transaction hash.
    ///
    /// Authorization (only the owner may replace) is enforced by the contract.
    async fn replace(
        &self,
        rpc_url: &str,
        sender: Option<EvmAddress>,
        contract: &EvmAddress,
        successor: &str,
    ) -> Result<String>;
}

/// [`TokenLedger`] backed by Ethereum JSON-RPC nodes.
///
/// Each call opens a fresh client for its URL and runs the blocking request
/// on tokio's blocking pool, so concurrent reads really do overlap.
#[derive(Debug, Clone)]
pub struct JsonRpcLedger {
    timeout: Duration,
    connect_timeout: Duration,
}

impl Default for JsonRpcLedger {
    fn default() -> Self {
        let (timeout, connect_timeout) = JsonRpcClient::default_timeouts();
        Self {
            timeout,
            connect_timeout,
        }
    }
}

impl JsonRpcLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout,
        }
    }

    async fn run<T, F>(&self, rpc_url: &str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(JsonRpcClient) -> Result<T> + Send + 'static,
    {
        let client = JsonRpcClient::with_timeouts(rpc_url, self.timeout, self.connect_timeout);
        tokio::task::spawn_blocking(move || f(client))
            .await
            .map_err(|e| anyhow!("JSON-RPC worker panicked or was cancelled: {}", e))?
    }

    async fn eth_call(&self, rpc_url: &str, contract: &EvmAddress, data: Vec<u8>) -> Result<Vec<u8>> {
        let to = *contract;
        debug!(rpc_url, contract = %to, "eth_call");
        self.run(rpc_url, move |client| client.call(&to, &data)).await
    }

    async fn read<C: SolCall + Send>(
        &self,
        rpc_url: &str,
        contract: &EvmAddress,
        call: C,
    ) -> Result<C::Return> {
        let raw = self.eth_call(rpc_url, contract, call.abi_encode()).await?;
        abi::decode_return::<C>(&raw)
    }
}

#[async_trait]
impl TokenLedger for JsonRpcLedger {
    async fn chain_id(&self, rpc_url: &str) -> Result<u64> {
        debug!(rpc_url, "eth_chainId");
        self.run(rpc_url, |client| client.chain_id()).await
    }

    async fn predecessor(&self, rpc_url: &str, contract: &EvmAddress) -> Result<String> {
        Ok(self.read(rpc_url, contract, predecessorCall {}).await?._0)
    }

    async fn successor(&self, rpc_url: &str, contract: &EvmAddress) -> Result<String> {
        Ok(self.read(rpc_url, contract, successorCall {}).await?._0)
    }

    async fn owner(&self, rpc_url: &str, contract: &EvmAddress) -> Result<EvmAddress> {
        Ok(self.read(rpc_url, contract, ownerCall {}).await?._0.into())
    }

    async fn checksum(&self, rpc_url: &str, contract: &EvmAddress, index: u64) -> Result<Vec<u8>> {
        let call = checksumCall {
            index: abi::field_index(index),
        };
        let raw = self.eth_call(rpc_url, contract, call.abi_encode()).await?;
        abi::decode_checksum(&raw)
    }

    async fn data_uri(&self, rpc_url: &str, contract: &EvmAddress, index: u64) -> Result<String> {
        let call = dataUriCall {
            index: abi::field_index(index),
        };
        Ok(self.read(rpc_url, contract, call).await?._0)
    }

    async fn replace(
        &self,
        rpc_url: &str,
        sender: Option<EvmAddress>,
        contract: &EvmAddress,
        successor: &str,
    ) -> Result<String> {
        let to = *contract;
        let data = replaceCall {
            successorId: successor.to_string(),
        }
        .abi_encode();
        debug!(rpc_url, contract = %to, successor, "eth_sendTransaction replace");
        self.run(rpc_url, move |client| {
            let from = match sender {
                Some(from) => from,
                None => client
                    .accounts()?
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("node exposes no accounts; configure a sender"))?,
            };
            client.send_transaction(&from, &to, &data)
        })
        .await
    }
}
