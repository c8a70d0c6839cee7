//! The produced interface: resolve, build lineage, replace.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tar_record_fetcher::{
    LineageChain, LineageWalker, RecordFetcher, ReplacementAttempt, ReplacementCoordinator,
    ReplacementRequest, ReplacementResult, TokenRecord,
};
use tar_resolver::{NetworkRegistry, NetworksConfig};
use tar_transport::{JsonRpcLedger, TokenLedger};
use tar_types::{env_string, EvmAddress, LineageError, LineageResult, TokenIdentifier};
use tracing::debug;

use crate::summary::TokenSummary;

/// Parse the `TAR_SENDER` account, if one is set.
fn parse_sender(text: Option<&str>) -> LineageResult<Option<EvmAddress>> {
    text.map(|text| {
        text.parse::<EvmAddress>()
            .map_err(|e| LineageError::InvalidConfig {
                reason: format!("TAR_SENDER: {}", e),
            })
    })
    .transpose()
}

/// Resolution state of one configured endpoint, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkStatus {
    pub name: String,
    pub chain_id: Option<u64>,
    pub rpc_url: Option<String>,
    /// Excluded from chain-id lookups.
    pub local: bool,
    pub error: Option<String>,
}

/// Entry point for callers: one registry, one walker, and the replacement
/// settings (active network and sender).
#[derive(Debug, Clone)]
pub struct TokenResolver {
    fetcher: RecordFetcher,
    walker: LineageWalker,
    active_network: Option<String>,
    sender: Option<EvmAddress>,
}

impl TokenResolver {
    pub fn new(registry: NetworkRegistry) -> Self {
        let fetcher = RecordFetcher::new(Arc::new(registry));
        Self {
            walker: LineageWalker::new(fetcher.clone()),
            fetcher,
            active_network: None,
            sender: None,
        }
    }

    pub fn from_config(
        config: &NetworksConfig,
        ledger: Arc<dyn TokenLedger>,
    ) -> LineageResult<Self> {
        Ok(Self::new(NetworkRegistry::from_config(config, ledger)?))
    }

    /// Resolver over JSON-RPC nodes, configured from `networks_file` or the
    /// environment (`TAR_NETWORKS_FILE`, `TAR_JSON_RPC_URL`, `TAR_NETWORK`,
    /// `TAR_SENDER`).
    pub fn from_env(networks_file: Option<&Path>) -> LineageResult<Self> {
        let config = NetworksConfig::discover(networks_file)?;
        let sender = parse_sender(env_string("TAR_SENDER").as_deref())?;
        debug!(
            networks = config.networks.len(),
            local = %config.local_network,
            "loaded network configuration"
        );
        Ok(Self::from_config(&config, Arc::new(JsonRpcLedger::new()))?
            .with_active_network(env_string("TAR_NETWORK").as_deref())
            .with_sender(sender))
    }

    /// Network whose endpoint submits replacements.
    pub fn with_active_network(mut self, network: Option<&str>) -> Self {
        self.active_network = network.map(String::from);
        self
    }

    pub fn with_sender(mut self, sender: Option<EvmAddress>) -> Self {
        self.sender = sender;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.walker = self.walker.with_max_depth(max_depth);
        self
    }

    /// Fail lineage builds on one-sided links.
    pub fn verify_links(mut self, verify: bool) -> Self {
        self.walker = self.walker.verify_links(verify);
        self
    }

    pub fn registry(&self) -> &NetworkRegistry {
        self.fetcher.registry()
    }

    pub fn active_network(&self) -> Option<&str> {
        self.active_network.as_deref()
    }

    /// Fetch the record named by `text`.
    pub async fn resolve(&self, text: &str) -> LineageResult<TokenRecord> {
        self.fetcher.fetch_str(text).await
    }

    pub async fn build_lineage(&self, text: &str) -> LineageResult<LineageChain> {
        let id = TokenIdentifier::parse(text)?;
        self.walker.build_lineage(&id).await
    }

    pub async fn summarize(&self, text: &str) -> LineageResult<TokenSummary> {
        Ok(TokenSummary::from(&self.build_lineage(text).await?))
    }

    pub async fn replace(&self, request: &ReplacementRequest) -> LineageResult<ReplacementResult> {
        self.attempt_replace(request).await?.result
    }

    /// Run a replacement and keep the visited states.
    ///
    /// Fails up front when no active network is set.
    pub async fn attempt_replace(
        &self,
        request: &ReplacementRequest,
    ) -> LineageResult<ReplacementAttempt> {
        let network = self
            .active_network
            .as_deref()
            .ok_or_else(|| LineageError::InvalidConfig {
                reason: "no active network: pass --network or set TAR_NETWORK".to_string(),
            })?;
        let coordinator =
            ReplacementCoordinator::new(self.fetcher.clone(), network).with_sender(self.sender);
        Ok(coordinator.attempt(request).await)
    }

    /// Resolve every endpoint and report the outcome, in declared order.
    pub async fn network_statuses(&self) -> Vec<NetworkStatus> {
        let registry = self.registry();
        let resolved = registry.warm_up().await;
        registry
            .endpoints()
            .iter()
            .zip(resolved)
            .map(|(endpoint, (_, chain_id))| {
                let (chain_id, error) = match chain_id {
                    Ok(id) => (Some(id), None),
                    Err(e) => (None, Some(e.to_string())),
                };
                NetworkStatus {
                    name: endpoint.name().to_string(),
                    chain_id,
                    rpc_url: endpoint.rpc_url().map(String::from),
                    local: endpoint.name() == registry.local_network(),
                    error,
                }
            })
            .collect()
    }
}
