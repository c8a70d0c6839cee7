//! Shared types for the tar-lineage workspace.
//!
//! This crate sits at the bottom of the dependency graph and provides:
//! - [`identifier`]: the `urn:tar:eip155.<chain>:<address>` codec
//! - [`address`]: 20-byte EVM addresses
//! - [`error`]: the [`LineageError`] taxonomy shared by every crate
//! - [`lineage`]: link directions and replacement states
//! - [`env_utils`]: environment variable helpers

pub mod address;
pub mod env_utils;
pub mod error;
pub mod identifier;
pub mod lineage;

pub use address::{EvmAddress, ADDRESS_HEX_LENGTH, ADDRESS_LENGTH};
pub use env_utils::{env_string, env_var, env_var_or};
pub use error::{ErrorKind, LineageError, LineageResult, NonTermination, RemoteContext};
pub use identifier::{
    format_identifier, parse_optional_identifier, TokenIdentifier, IDENTIFIER_PREFIX,
};
pub use lineage::{LinkDirection, ReplacementState};
