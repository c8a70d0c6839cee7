use anyhow::Result;
use clap::Args;

use super::CliContext;

/// Read a token and its full predecessor/successor history.
#[derive(Args)]
pub struct ReadCmd {
    /// Token id to read
    pub token_id: String,

    /// Fail if any link in the history is one-sided
    #[arg(long)]
    pub verify_links: bool,
}

impl ReadCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let resolver = ctx.resolver()?.verify_links(self.verify_links);
        let summary = resolver.summarize(&self.token_id).await?;

        if ctx.json {
            println!("{}", summary.to_json()?);
        } else {
            print!("{}", summary.render_text());
        }
        Ok(())
    }
}
