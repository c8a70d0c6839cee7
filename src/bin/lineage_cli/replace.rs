use anyhow::Result;
use clap::Args;
use serde_json::json;
use tar_lineage::{EvmAddress, ReplacementRequest};

use super::{output, CliContext};

/// Point a predecessor token's successor at a new token.
///
/// Must run with `--network` set to the predecessor's network.
#[derive(Args)]
pub struct ReplaceCmd {
    /// Token id of the token being replaced
    pub predecessor: String,

    /// Token id of its successor
    pub successor: String,

    /// Skip the check that the successor points back at the predecessor
    #[arg(long)]
    pub force: bool,

    /// Account to send the transaction from (defaults to TAR_SENDER, then the
    /// node's first account)
    #[arg(long, value_name = "ADDRESS")]
    pub from: Option<EvmAddress>,
}

impl ReplaceCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let request =
            ReplacementRequest::parse(&self.predecessor, &self.successor)?.with_force(self.force);

        let mut resolver = ctx.resolver()?;
        if self.from.is_some() {
            resolver = resolver.with_sender(self.from);
        }

        let attempt = resolver.attempt_replace(&request).await?;
        let state = attempt.final_state();
        let done = attempt.result?;

        if ctx.json {
            println!(
                "{}",
                json!({
                    "state": state,
                    "predecessor": done.predecessor,
                    "successor": done.successor,
                    "transactionHash": done.transaction_reference,
                })
            );
        } else {
            println!("Predecessor token replaced\n");
            output::print_rows(&[
                (
                    "Updated Token (predecessor):",
                    format!(
                        "{} (contract {})",
                        done.predecessor,
                        done.predecessor.address().to_hex_literal()
                    ),
                ),
                ("Transaction Hash:", done.transaction_reference.clone()),
                ("Successor Id:", done.successor.to_string()),
            ]);
        }
        Ok(())
    }
}
