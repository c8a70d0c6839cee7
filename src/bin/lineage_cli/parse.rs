use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tar_lineage::TokenIdentifier;

/// Validate a token id and show its parts (no network access).
#[derive(Args)]
pub struct ParseCmd {
    /// Token id, e.g. urn:tar:eip155.11155111:<40 hex chars>
    pub token_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParsedToken {
    id: String,
    canonical: String,
    chain_id: String,
    address: String,
}

impl ParseCmd {
    pub fn execute(&self, json: bool) -> Result<()> {
        let id = TokenIdentifier::parse(&self.token_id)?;
        let parsed = ParsedToken {
            id: id.as_str().to_string(),
            canonical: id.canonical(),
            chain_id: id.chain_id().to_string(),
            address: id.address().to_hex_literal(),
        };

        if json {
            println!("{}", serde_json::to_string(&parsed)?);
        } else {
            println!("Token Id:   {}", parsed.id);
            println!("Canonical:  {}", parsed.canonical);
            println!("Chain Id:   {}", parsed.chain_id);
            println!("Contract:   {}", parsed.address);
        }
        Ok(())
    }
}
