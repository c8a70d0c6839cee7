//! Blocking Ethereum JSON-RPC client.
//!
//! Speaks JSON-RPC 2.0 over HTTP with `ureq`. Only the handful of methods the
//! token contract needs are wrapped:
//! - `eth_chainId`
//! - `eth_call` against the `latest` block
//! - `eth_accounts`
//! - `eth_sendTransaction` (the node holds the key; signing happens there)
//!
//! ## Usage
//!
//! ```ignore
//! let client = JsonRpcClient::new("https://ethereum-sepolia-rpc.publicnode.com");
//! let chain_id = client.chain_id()?;
//! let raw = client.call(&contract, &abi::ownerCall {}.abi_encode())?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use tar_types::{env_var_or, EvmAddress};

/// JSON-RPC client bound to a single endpoint URL.
pub struct JsonRpcClient {
    endpoint: String,
    agent: ureq::Agent,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Default request timeout in seconds (can be overridden by env).
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Timeouts from `TAR_RPC_TIMEOUT_SECS` / `TAR_RPC_CONNECT_TIMEOUT_SECS`.
    pub fn default_timeouts() -> (Duration, Duration) {
        let timeout_secs = env_var_or("TAR_RPC_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS);
        let connect_secs = env_var_or(
            "TAR_RPC_CONNECT_TIMEOUT_SECS",
            Self::DEFAULT_CONNECT_TIMEOUT_SECS,
        );
        (
            Duration::from_secs(timeout_secs),
            Duration::from_secs(connect_secs),
        )
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    pub fn new(endpoint: &str) -> Self {
        let (timeout, connect_timeout) = Self::default_timeouts();
        Self::with_timeouts(endpoint, timeout, connect_timeout)
    }

    pub fn with_timeouts(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
            next_id: AtomicU64::new(1),
        }
    }

    /// Execute one JSON-RPC request and return its `result`.
    fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response: Value = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| anyhow!("{} request to {} failed: {}", method, self.endpoint, e))?
            .into_json()
            .map_err(|e| anyhow!("failed to parse {} response: {}", method, e))?;

        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return Err(anyhow!("{} returned error {}: {}", method, code, msg));
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| anyhow!("no result in {} response", method))
    }

    /// `eth_chainId`
    pub fn chain_id(&self) -> Result<u64> {
        let result = self.request("eth_chainId", json!([]))?;
        parse_quantity(&result).context("eth_chainId")
    }

    /// `eth_call` at `latest`, returning the raw return data.
    pub fn call(&self, to: &EvmAddress, data: &[u8]) -> Result<Vec<u8>> {
        let result = self.request(
            "eth_call",
            json!([
                { "to": to.to_hex_literal(), "data": format!("0x{}", hex::encode(data)) },
                "latest"
            ]),
        )?;
        parse_data(&result).context("eth_call")
    }

    /// `eth_accounts`
    pub fn accounts(&self) -> Result<Vec<EvmAddress>> {
        let result = self.request("eth_accounts", json!([]))?;
        let list = result
            .as_array()
            .ok_or_else(|| anyhow!("eth_accounts result is not an array"))?;
        list.iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| anyhow!("eth_accounts entry is not a string"))?
                    .parse()
            })
            .collect()
    }

    /// `eth_sendTransaction`, returning the transaction hash.
    pub fn send_transaction(&self, from: &EvmAddress, to: &EvmAddress, data: &[u8]) -> Result<String> {
        let result = self.request(
            "eth_sendTransaction",
            json!([{
                "from": from.to_hex_literal(),
                "to": to.to_hex_literal(),
                "data": format!("0x{}", hex::encode(data)),
            }]),
        )?;
        result
            .as_str()
            .map(String::from)
            .ok_or_else(|| anyhow!("eth_sendTransaction result is not a hash string"))
    }
}

/// Parse a hex quantity (`"0xaa36a7"`) as returned by `eth_chainId`.
pub fn parse_quantity(value: &Value) -> Result<u64> {
    let s = value
        .as_str()
        .ok_or_else(|| anyhow!("quantity is not a string: {}", value))?;
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("quantity {:?} lacks 0x prefix", s))?;
    if digits.is_empty() {
        return Err(anyhow!("quantity {:?} has no digits", s));
    }
    u64::from_str_radix(digits, 16).map_err(|e| anyhow!("invalid quantity {:?}: {}", s, e))
}

/// Parse hex data (`"0x..."`) as returned by `eth_call`.
pub fn parse_data(value: &Value) -> Result<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| anyhow!("data is not a string: {}", value))?;
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("data {:?} lacks 0x prefix", s))?;
    hex::decode(digits).map_err(|e| anyhow!("invalid hex data: {}", e))
}
