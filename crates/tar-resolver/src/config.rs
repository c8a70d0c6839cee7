//! Network endpoint configuration.
//!
//! Endpoints are declared as an ordered JSON list; order matters because
//! chain-id lookups return the first match.
//!
//! ```json
//! {
//!   "local_network": "localhost",
//!   "networks": [
//!     { "name": "sepolia", "chain_id": 11155111, "url": "https://ethereum-sepolia-rpc.publicnode.com" },
//!     { "name": "custom", "url": "https://rpc.example.org" }
//!   ]
//! }
//! ```
//!
//! Sources, in order of precedence:
//! 1. an explicit path (CLI `--networks`)
//! 2. `TAR_NETWORKS_FILE`
//! 3. `~/.tar-lineage/networks.json` if it exists
//! 4. the built-in testnet list
//!
//! `TAR_JSON_RPC_URL`, when set, appends a `custom` endpoint with only a URL.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tar_types::{env_string, LineageError, LineageResult};

/// Name of the development network excluded from cross-chain resolution.
pub const DEFAULT_LOCAL_NETWORK: &str = "localhost";

/// Name given to the endpoint built from `TAR_JSON_RPC_URL`.
pub const CUSTOM_NETWORK: &str = "custom";

/// One configured network as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    #[serde(default, alias = "chainId", skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NetworkConfig {
    pub fn new(name: &str, chain_id: Option<u64>, url: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            chain_id,
            url: url.map(String::from),
        }
    }
}

fn default_local_network() -> String {
    DEFAULT_LOCAL_NETWORK.to_string()
}

/// The full endpoint list plus the name of the local network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworksConfig {
    #[serde(default = "default_local_network")]
    pub local_network: String,
    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NetworksConfig {
    /// Public testnets the token contracts are deployed to.
    pub fn builtin() -> Self {
        Self {
            local_network: default_local_network(),
            networks: vec![
                NetworkConfig::new(
                    "sepolia",
                    Some(11155111),
                    Some("https://ethereum-sepolia-rpc.publicnode.com"),
                ),
                NetworkConfig::new(
                    "amoy",
                    Some(80002),
                    Some("https://polygon-amoy-bor-rpc.publicnode.com"),
                ),
                NetworkConfig::new(
                    "etherlink-testnet",
                    Some(128123),
                    Some("https://node.ghostnet.etherlink.com"),
                ),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> LineageResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| LineageError::InvalidConfig {
            reason: format!("cannot parse networks JSON: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> LineageResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| LineageError::InvalidConfig {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }

    /// Default location of the user's network file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".tar-lineage").join("networks.json"))
    }

    /// Resolve the configuration from an explicit path, the environment, or
    /// the built-in list, then apply `TAR_JSON_RPC_URL`.
    pub fn discover(explicit: Option<&Path>) -> LineageResult<Self> {
        ConfigSources::from_env(explicit).load()
    }

    /// Append (or replace) the URL-only `custom` endpoint.
    pub fn with_custom_url(mut self, url: &str) -> LineageResult<Self> {
        self.networks.retain(|n| n.name != CUSTOM_NETWORK);
        self.networks
            .push(NetworkConfig::new(CUSTOM_NETWORK, None, Some(url)));
        self.validate()?;
        Ok(self)
    }

    /// Reject blank or duplicate names and URLs without a scheme.
    ///
    /// Duplicate chain ids are allowed; lookups resolve them by order.
    pub fn validate(&self) -> LineageResult<()> {
        let invalid = |reason: String| Err(LineageError::InvalidConfig { reason });

        if self.local_network.trim().is_empty() {
            return invalid("local_network must not be blank".to_string());
        }

        let mut seen = HashSet::new();
        for network in &self.networks {
            if network.name.trim().is_empty() {
                return invalid("network name must not be blank".to_string());
            }
            if !seen.insert(network.name.as_str()) {
                return invalid(format!("network {:?} is declared twice", network.name));
            }
            if let Some(url) = &network.url {
                if !url.contains("://") {
                    return invalid(format!(
                        "network {:?} has URL {:?} without a scheme",
                        network.name, url
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Candidate configuration inputs, highest precedence first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    /// Path given on the command line.
    pub explicit: Option<PathBuf>,
    /// `TAR_NETWORKS_FILE`.
    pub env_file: Option<PathBuf>,
    /// `~/.tar-lineage/networks.json`, used only if it exists.
    pub user_file: Option<PathBuf>,
    /// `TAR_JSON_RPC_URL`.
    pub custom_url: Option<String>,
}

impl ConfigSources {
    pub fn from_env(explicit: Option<&Path>) -> Self {
        Self {
            explicit: explicit.map(Path::to_path_buf),
            env_file: env_string("TAR_NETWORKS_FILE").map(PathBuf::from),
            user_file: NetworksConfig::default_path(),
            custom_url: env_string("TAR_JSON_RPC_URL"),
        }
    }

    /// File the configuration is read from, or `None` for the built-in list.
    ///
    /// A named file that does not exist is still returned so loading fails
    /// loudly; only the user file is optional.
    pub fn path(&self) -> Option<&Path> {
        self.explicit
            .as_deref()
            .or(self.env_file.as_deref())
            .or_else(|| self.user_file.as_deref().filter(|p| p.exists()))
    }

    pub fn load(&self) -> LineageResult<NetworksConfig> {
        let config = match self.path() {
            Some(path) => NetworksConfig::load(path)?,
            None => NetworksConfig::builtin(),
        };
        match &self.custom_url {
            Some(url) => config.with_custom_url(url),
            None => Ok(config),
        }
    }
}
