//! Subcommands of the `tar-lineage` CLI.

pub mod networks;
pub mod output;
pub mod parse;
pub mod read;
pub mod replace;

use std::path::PathBuf;

use anyhow::Result;
use tar_lineage::TokenResolver;

/// Global options shared by every subcommand.
pub struct CliContext {
    pub networks_file: Option<PathBuf>,
    pub network: Option<String>,
    pub json: bool,
}

impl CliContext {
    /// Resolver over the configured JSON-RPC networks.
    ///
    /// Built on demand so offline commands never touch configuration.
    pub fn resolver(&self) -> Result<TokenResolver> {
        let resolver = TokenResolver::from_env(self.networks_file.as_deref())?;
        Ok(match &self.network {
            Some(network) => resolver.with_active_network(Some(network)),
            None => resolver,
        })
    }
}
