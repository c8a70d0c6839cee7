use anyhow::Result;
use clap::Args;

use super::{output, CliContext};

/// List configured networks and their chain ids.
///
/// Endpoints without a static chain id are queried.
#[derive(Args)]
pub struct NetworksCmd {}

impl NetworksCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let resolver = ctx.resolver()?;
        let statuses = resolver.network_statuses().await;

        if ctx.json {
            println!("{}", serde_json::to_string(&statuses)?);
            return Ok(());
        }

        let rows: Vec<_> = statuses
            .iter()
            .map(|status| {
                let chain = match (&status.chain_id, &status.error) {
                    (Some(id), _) => id.to_string(),
                    (None, Some(err)) => format!("unresolved ({})", err),
                    (None, None) => "unresolved".to_string(),
                };
                let mut line = format!(
                    "{:<12} {}",
                    chain,
                    status.rpc_url.as_deref().unwrap_or("-")
                );
                if status.local {
                    line.push_str("  [local, excluded from lookups]");
                }
                (status.name.as_str(), line)
            })
            .collect();
        output::print_rows(&rows);
        Ok(())
    }
}
