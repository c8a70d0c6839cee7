//! TAR network resolution.
//!
//! Maps network names and chain ids to configured endpoints:
//! - [`config`]: the ordered endpoint list and where it is loaded from
//! - [`endpoint`]: typed endpoints (static chain id, remote-queried, unresolvable)
//! - [`registry`]: chain-id resolution and chain-id to endpoint lookup

pub mod config;
pub mod endpoint;
pub mod registry;

pub use config::{
    ConfigSources, NetworkConfig, NetworksConfig, CUSTOM_NETWORK, DEFAULT_LOCAL_NETWORK,
};
pub use endpoint::{EndpointKind, NetworkEndpoint};
pub use registry::NetworkRegistry;
