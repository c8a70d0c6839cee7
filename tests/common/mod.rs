#![allow(dead_code)]
//! Shared fixtures for integration tests.
//!
//! Builds an [`InMemoryLedger`] populated with token contracts on three
//! synthetic networks and a matching [`TokenResolver`].

use std::sync::Arc;

use tar_lineage::{
    EvmAddress, InMemoryLedger, NetworksConfig, TokenIdentifier, TokenResolver, TokenState,
};

pub const SEPOLIA_URL: &str = "mem://sepolia";
pub const AMOY_URL: &str = "mem://amoy";
pub const ETHERLINK_URL: &str = "mem://etherlink";
pub const LOCAL_URL: &str = "mem://localhost";

pub const SEPOLIA: u64 = 11155111;
pub const AMOY: u64 = 80002;
pub const ETHERLINK: u64 = 128123;

/// Owner used for every fixture token.
pub const OWNER: EvmAddress = EvmAddress::new([0x0e; 20]);

pub fn networks_json() -> String {
    serde_json::json!({
        "local_network": "localhost",
        "networks": [
            { "name": "localhost", "chain_id": SEPOLIA, "url": LOCAL_URL },
            { "name": "sepolia", "chain_id": SEPOLIA, "url": SEPOLIA_URL },
            { "name": "amoy", "url": AMOY_URL },
            { "name": "etherlink-testnet", "chain_id": ETHERLINK, "url": ETHERLINK_URL },
        ]
    })
    .to_string()
}

pub fn url_for(chain_id: u64) -> &'static str {
    match chain_id {
        SEPOLIA => SEPOLIA_URL,
        AMOY => AMOY_URL,
        ETHERLINK => ETHERLINK_URL,
        other => panic!("no fixture network for chain {}", other),
    }
}

pub fn token(chain_id: u64, n: u8) -> TokenIdentifier {
    TokenIdentifier::new(chain_id, EvmAddress::new([n; 20]))
}

/// Ledger with the amoy node answering `eth_chainId`.
pub fn ledger() -> InMemoryLedger {
    InMemoryLedger::new().with_chain(AMOY_URL, AMOY)
}

/// Deploy `id` with the given links.
pub fn deploy(
    ledger: &InMemoryLedger,
    id: &TokenIdentifier,
    predecessor: Option<&TokenIdentifier>,
    successor: Option<&TokenIdentifier>,
) {
    let state = TokenState::new(OWNER)
        .with_predecessor(predecessor.map(|p| p.as_str()).unwrap_or(""))
        .with_successor(successor.map(|s| s.as_str()).unwrap_or(""))
        .with_checksum(vec![0x5a; 32])
        .with_data_uri(&format!("ipfs://{}", id.address().to_bare_hex()));
    ledger.insert_token(url_for(id.chain_id()), *id.address(), state);
}

pub fn resolver(ledger: Arc<InMemoryLedger>) -> TokenResolver {
    let config = NetworksConfig::from_json_str(&networks_json()).unwrap();
    TokenResolver::from_config(&config, ledger).unwrap()
}
