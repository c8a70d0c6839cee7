//! Typed network endpoints.

use serde::Serialize;

use crate::config::NetworkConfig;

/// How an endpoint's chain id is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndpointKind {
    /// Chain id is declared in configuration; no remote call needed.
    StaticChainId {
        chain_id: u64,
        rpc_url: Option<String>,
    },
    /// Chain id must be asked of the node behind `rpc_url`.
    RemoteQueried { rpc_url: String },
    /// Neither a chain id nor a URL was configured.
    Unresolvable,
}

/// A configured network the resolver can consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkEndpoint {
    name: String,
    #[serde(flatten)]
    kind: EndpointKind,
}

impl NetworkEndpoint {
    pub fn new(name: &str, chain_id: Option<u64>, rpc_url: Option<&str>) -> Self {
        let rpc_url = rpc_url.filter(|u| !u.trim().is_empty()).map(String::from);
        let kind = match (chain_id, rpc_url) {
            (Some(chain_id), rpc_url) => EndpointKind::StaticChainId { chain_id, rpc_url },
            (None, Some(rpc_url)) => EndpointKind::RemoteQueried { rpc_url },
            (None, None) => EndpointKind::Unresolvable,
        };
        Self {
            name: name.to_string(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EndpointKind {
        &self.kind
    }

    /// URL to send calls to, if one is configured.
    pub fn rpc_url(&self) -> Option<&str> {
        match &self.kind {
            EndpointKind::StaticChainId { rpc_url, .. } => rpc_url.as_deref(),
            EndpointKind::RemoteQueried { rpc_url } => Some(rpc_url),
            EndpointKind::Unresolvable => None,
        }
    }

    /// Chain id known without any remote call.
    pub fn static_chain_id(&self) -> Option<u64> {
        match &self.kind {
            EndpointKind::StaticChainId { chain_id, .. } => Some(*chain_id),
            _ => None,
        }
    }
}

impl From<&NetworkConfig> for NetworkEndpoint {
    fn from(config: &NetworkConfig) -> Self {
        NetworkEndpoint::new(&config.name, config.chain_id, config.url.as_deref())
    }
}
