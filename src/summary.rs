//! Printable token summaries.
//!
//! A [`TokenSummary`] is the current token's fields plus its full history.
//! JSON output uses camelCase keys, chain ids as decimal strings, and empty
//! strings for missing links so the document stays flat for shell tooling.

use std::fmt::Write as _;

use serde::Serialize;
use tar_record_fetcher::{LineageChain, TokenRecord};

/// Flat view of one token record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    pub id: String,
    pub chain_id: String,
    pub address: String,
    pub predecessor: String,
    pub successor: String,
    pub owner: String,
    pub data_uri: String,
    pub checksum: String,
}

impl From<&TokenRecord> for TokenDetails {
    fn from(record: &TokenRecord) -> Self {
        let link = |id: Option<&tar_types::TokenIdentifier>| {
            id.map(|id| id.as_str().to_string()).unwrap_or_default()
        };
        Self {
            id: record.id.as_str().to_string(),
            chain_id: record.id.chain_id().to_string(),
            address: record.id.address().to_hex_literal(),
            predecessor: link(record.predecessor_id.as_ref()),
            successor: link(record.successor_id.as_ref()),
            owner: record.owner.to_hex_literal(),
            data_uri: record.data_uri.clone(),
            checksum: record.checksum_hex(),
        }
    }
}

/// The current token with its predecessors (oldest first) and successors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    #[serde(flatten)]
    pub token: TokenDetails,
    pub predecessors: Vec<TokenDetails>,
    pub successors: Vec<TokenDetails>,
}

impl From<&LineageChain> for TokenSummary {
    fn from(chain: &LineageChain) -> Self {
        Self {
            token: chain.current().into(),
            predecessors: chain.predecessors().iter().map(Into::into).collect(),
            successors: chain.successors().iter().map(Into::into).collect(),
        }
    }
}

impl TokenSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Every token in the lineage, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TokenDetails> {
        self.predecessors
            .iter()
            .chain(std::iter::once(&self.token))
            .chain(self.successors.iter())
    }

    /// Human-readable listing; the current token is marked with `>`.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let rows = [
            ("Token Id:", self.token.id.as_str()),
            ("Network:", self.token.chain_id.as_str()),
            ("Owner:", self.token.owner.as_str()),
            ("Data URI:", self.token.data_uri.as_str()),
            ("Checksum:", self.token.checksum.as_str()),
        ];
        for (label, value) in rows {
            let _ = writeln!(out, "{:<11}{}", label, value);
        }

        for (i, entry) in self.history().enumerate() {
            let label = if i == 0 { "History:" } else { "" };
            let marker = if entry.id == self.token.id { '>' } else { ' ' };
            let _ = writeln!(out, "{:<11}[{}{}] {}", label, marker, i + 1, entry.id);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tar_types::{EvmAddress, TokenIdentifier};

    fn record(n: u8, pred: Option<u8>, succ: Option<u8>) -> TokenRecord {
        let id = |n: u8| TokenIdentifier::new(11155111, EvmAddress::new([n; 20]));
        TokenRecord {
            id: id(n),
            predecessor_id: pred.map(id),
            successor_id: succ.map(id),
            owner: EvmAddress::new([0xee; 20]),
            checksum: vec![0x12, 0x34],
            data_uri: format!("ipfs://{}", n),
        }
    }

    fn chain() -> LineageChain {
        LineageChain::new(
            vec![record(1, None, Some(2))],
            record(2, Some(1), Some(3)),
            vec![record(3, Some(2), None)],
        )
    }

    #[test]
    fn test_json_shape() {
        let summary = TokenSummary::from(&chain());
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["chainId"], "11155111");
        assert_eq!(json["address"], format!("0x{}", "02".repeat(20)));
        assert_eq!(json["checksum"], "0x1234");
        assert_eq!(json["dataUri"], "ipfs://2");
        assert_eq!(json["predecessors"].as_array().unwrap().len(), 1);
        assert_eq!(json["predecessors"][0]["predecessor"], "");
        assert_eq!(json["successors"][0]["id"], record(3, None, None).id.as_str());
    }

    #[test]
    fn test_text_marks_current() {
        let text = TokenSummary::from(&chain()).render_text();
        let history: Vec<_> = text.lines().filter(|l| l.contains("] ")).collect();
        assert_eq!(history.len(), 3);
        assert!(history[0].starts_with("History:"));
        assert!(history[0].contains("[ 1]"));
        assert!(history[1].contains("[>2]"));
        assert!(history[2].contains("[ 3]"));
        assert!(text.contains("Data URI:  ipfs://2"));
    }
}
