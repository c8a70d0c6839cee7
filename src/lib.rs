//! TAR token lineage
//!
//! Resolves network-qualified token identifiers
//! (`urn:tar:eip155.<chain id>:<address>`), walks predecessor/successor
//! lineage across networks, and performs verified replacements.
//!
//! - [`TokenResolver`]: the entry point (`resolve`, `build_lineage`, `replace`)
//! - [`summary`]: JSON and text rendering of a token with its history
//!
//! The building blocks live in the workspace crates and are re-exported here:
//! identifiers and errors from `tar-types`, ledgers from `tar-transport`,
//! endpoint configuration from `tar-resolver`, and fetching, traversal, and
//! replacement from `tar-record-fetcher`.
//!
//! # Example
//!
//! ```ignore
//! use tar_lineage::TokenResolver;
//!
//! let resolver = TokenResolver::from_env(None)?;
//! let chain = resolver
//!     .build_lineage("urn:tar:eip155.11155111:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
//!     .await?;
//! println!("{} tokens in lineage", chain.len());
//! ```

pub mod resolver;
pub mod summary;

pub use resolver::{NetworkStatus, TokenResolver};
pub use summary::{TokenDetails, TokenSummary};

pub use tar_record_fetcher::{
    LineageChain, LineageWalker, RecordFetcher, ReplacementAttempt, ReplacementCoordinator,
    ReplacementRequest, ReplacementResult, TokenRecord,
};
pub use tar_resolver::{EndpointKind, NetworkEndpoint, NetworkRegistry, NetworksConfig};
pub use tar_transport::{InMemoryLedger, JsonRpcLedger, TokenLedger, TokenState};
pub use tar_types::{
    format_identifier, ErrorKind, EvmAddress, LineageError, LineageResult, LinkDirection,
    ReplacementState, TokenIdentifier,
};
