//! Chain-id resolution over the configured endpoint list.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tar_transport::TokenLedger;
use tar_types::{LineageError, LineageResult, RemoteContext};
use tracing::{debug, warn};

use crate::config::{NetworksConfig, DEFAULT_LOCAL_NETWORK};
use crate::endpoint::{EndpointKind, NetworkEndpoint};

/// Ordered set of network endpoints plus the ledger used to query them.
///
/// Lookups by chain id walk endpoints in declared order and skip the local
/// network. Chain ids learned from remote nodes are cached per endpoint name
/// for the lifetime of the registry.
pub struct NetworkRegistry {
    endpoints: Vec<NetworkEndpoint>,
    local_network: String,
    ledger: Arc<dyn TokenLedger>,
    resolved: RwLock<HashMap<String, u64>>,
}

impl NetworkRegistry {
    pub fn new(endpoints: Vec<NetworkEndpoint>, ledger: Arc<dyn TokenLedger>) -> LineageResult<Self> {
        Self::build(endpoints, DEFAULT_LOCAL_NETWORK, ledger)
    }

    pub fn from_config(config: &NetworksConfig, ledger: Arc<dyn TokenLedger>) -> LineageResult<Self> {
        config.validate()?;
        let endpoints = config.networks.iter().map(NetworkEndpoint::from).collect();
        Self::build(endpoints, &config.local_network, ledger)
    }

    fn build(
        endpoints: Vec<NetworkEndpoint>,
        local_network: &str,
        ledger: Arc<dyn TokenLedger>,
    ) -> LineageResult<Self> {
        let mut seen = HashSet::new();
        for endpoint in &endpoints {
            if endpoint.name().trim().is_empty() {
                return Err(LineageError::InvalidConfig {
                    reason: "network name must not be blank".to_string(),
                });
            }
            if !seen.insert(endpoint.name()) {
                return Err(LineageError::InvalidConfig {
                    reason: format!("network {:?} is declared twice", endpoint.name()),
                });
            }
        }

        let registry = Self {
            endpoints,
            local_network: local_network.to_string(),
            ledger,
            resolved: RwLock::new(HashMap::new()),
        };
        for (chain_id, names) in registry.duplicate_chain_ids() {
            warn!(
                chain_id,
                networks = ?names,
                "several networks declare the same chain id; only the first is used for lookups"
            );
        }
        Ok(registry)
    }

    /// Name of the development network skipped by chain-id lookups.
    pub fn local_network(&self) -> &str {
        &self.local_network
    }

    pub fn endpoints(&self) -> &[NetworkEndpoint] {
        &self.endpoints
    }

    pub fn ledger(&self) -> &Arc<dyn TokenLedger> {
        &self.ledger
    }

    pub fn endpoint(&self, name: &str) -> LineageResult<&NetworkEndpoint> {
        self.endpoints
            .iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| LineageError::UnknownNetwork {
                network: name.to_string(),
            })
    }

    /// Chain id of the named network.
    pub async fn resolve_chain_id(&self, name: &str) -> LineageResult<u64> {
        let endpoint = self.endpoint(name)?;
        self.chain_id_of(endpoint).await
    }

    /// Chain id of an endpoint: static if declared, otherwise asked of its node.
    pub async fn chain_id_of(&self, endpoint: &NetworkEndpoint) -> LineageResult<u64> {
        match endpoint.kind() {
            EndpointKind::StaticChainId { chain_id, .. } => Ok(*chain_id),
            EndpointKind::RemoteQueried { rpc_url } => {
                let cached = self.resolved.read().get(endpoint.name()).copied();
                if let Some(chain_id) = cached {
                    return Ok(chain_id);
                }
                debug!(network = endpoint.name(), rpc_url = %rpc_url, "querying chain id");
                let chain_id = self
                    .ledger
                    .chain_id(rpc_url)
                    .await
                    .remote_context(endpoint.name(), "chain_id", None)?;
                self.resolved
                    .write()
                    .insert(endpoint.name().to_string(), chain_id);
                Ok(chain_id)
            }
            EndpointKind::Unresolvable => Err(LineageError::UnresolvableNetwork {
                network: endpoint.name().to_string(),
            }),
        }
    }

    /// First non-local endpoint, in declared order, serving `chain_id`.
    ///
    /// Resolution failures on an endpoint visited before the match are
    /// returned as-is rather than skipped.
    pub async fn find_endpoint_for_chain(&self, chain_id: u64) -> LineageResult<&NetworkEndpoint> {
        for endpoint in &self.endpoints {
            if endpoint.name() == self.local_network {
                continue;
            }
            if self.chain_id_of(endpoint).await? == chain_id {
                debug!(chain_id, network = endpoint.name(), "resolved network for chain");
                return Ok(endpoint);
            }
        }
        Err(LineageError::NoNetworkForChain { chain_id })
    }

    /// Resolve every endpoint once, filling the chain-id cache.
    ///
    /// Returns each endpoint's outcome in declared order; failures are
    /// reported, not raised.
    pub async fn warm_up(&self) -> Vec<(String, LineageResult<u64>)> {
        let lookups = self
            .endpoints
            .iter()
            .map(|endpoint| async move {
                (endpoint.name().to_string(), self.chain_id_of(endpoint).await)
            });
        let results = futures::future::join_all(lookups).await;
        for (name, chain_id) in &results {
            if let Err(e) = chain_id {
                warn!(network = %name, error = %e, "could not resolve chain id");
            }
        }
        for (chain_id, names) in self.duplicate_chain_ids() {
            warn!(chain_id, networks = ?names, "several networks share a chain id");
        }
        results
    }

    /// Chain ids claimed by more than one non-local endpoint, with the
    /// endpoint names in declared order.
    ///
    /// Only static and already-resolved ids are considered.
    pub fn duplicate_chain_ids(&self) -> Vec<(u64, Vec<String>)> {
        let cache = self.resolved.read();
        let mut by_chain: BTreeMap<u64, Vec<String>> = BTreeMap::new();
        for endpoint in &self.endpoints {
            if endpoint.name() == self.local_network {
                continue;
            }
            let known = endpoint
                .static_chain_id()
                .or_else(|| cache.get(endpoint.name()).copied());
            if let Some(chain_id) = known {
                by_chain
                    .entry(chain_id)
                    .or_default()
                    .push(endpoint.name().to_string());
            }
        }
        by_chain
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .collect()
    }
}

impl std::fmt::Debug for NetworkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkRegistry")
            .field("endpoints", &self.endpoints)
            .field("local_network", &self.local_network)
            .finish_non_exhaustive()
    }
}
