//! Record, lineage, and replacement types.

use serde::{Serialize, Serializer};
use tar_types::{EvmAddress, LineageResult, LinkDirection, TokenIdentifier};

/// Snapshot of one token as read from its hosting network.
///
/// Each field comes from a separate read, so a record is only as consistent
/// as the ledger was while the reads were in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRecord {
    pub id: TokenIdentifier,
    pub predecessor_id: Option<TokenIdentifier>,
    pub successor_id: Option<TokenIdentifier>,
    pub owner: EvmAddress,
    #[serde(serialize_with = "serialize_hex")]
    pub checksum: Vec<u8>,
    pub data_uri: String,
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
}

impl TokenRecord {
    /// The pointer followed when walking in `direction`.
    pub fn link(&self, direction: LinkDirection) -> Option<&TokenIdentifier> {
        match direction {
            LinkDirection::Backward => self.predecessor_id.as_ref(),
            LinkDirection::Forward => self.successor_id.as_ref(),
        }
    }

    pub fn checksum_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.checksum))
    }

    /// No predecessor and no successor.
    pub fn is_standalone(&self) -> bool {
        self.predecessor_id.is_none() && self.successor_id.is_none()
    }
}

/// Ordered lineage, oldest predecessor first, with one record marked current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageChain {
    records: Vec<TokenRecord>,
    current: usize,
}

impl LineageChain {
    /// Assemble a chain from walk results.
    ///
    /// `backward` is in walk order (nearest predecessor first) and is
    /// reversed; `forward` is kept as is.
    pub fn new(backward: Vec<TokenRecord>, current: TokenRecord, forward: Vec<TokenRecord>) -> Self {
        let current_index = backward.len();
        let mut records = backward;
        records.reverse();
        records.push(current);
        records.extend(forward);
        Self {
            records,
            current: current_index,
        }
    }

    pub fn records(&self) -> &[TokenRecord] {
        &self.records
    }

    pub fn current(&self) -> &TokenRecord {
        &self.records[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: a chain holds at least its current record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records before the current one, oldest first.
    pub fn predecessors(&self) -> &[TokenRecord] {
        &self.records[..self.current]
    }

    /// Records after the current one, nearest first.
    pub fn successors(&self) -> &[TokenRecord] {
        &self.records[self.current + 1..]
    }

    pub fn oldest(&self) -> &TokenRecord {
        &self.records[0]
    }

    pub fn newest(&self) -> &TokenRecord {
        &self.records[self.records.len() - 1]
    }

    /// Index of the first adjacent pair whose pointers disagree, if any.
    ///
    /// Pair `i` is `(records[i], records[i + 1])`; it holds when
    /// `a.successor == b.id` and `b.predecessor == a.id`.
    pub fn first_broken_link(&self) -> Option<usize> {
        self.records.windows(2).position(|pair| {
            pair[0].successor_id.as_ref() != Some(&pair[1].id)
                || pair[1].predecessor_id.as_ref() != Some(&pair[0].id)
        })
    }

    pub fn is_consistent(&self) -> bool {
        self.first_broken_link().is_none()
    }
}

/// One predecessor-to-successor hand-off to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRequest {
    pub predecessor: TokenIdentifier,
    pub successor: TokenIdentifier,
    /// Skip the successor's back-pointer check.
    pub force: bool,
}

impl ReplacementRequest {
    pub fn new(predecessor: TokenIdentifier, successor: TokenIdentifier) -> Self {
        Self {
            predecessor,
            successor,
            force: false,
        }
    }

    pub fn parse(predecessor: &str, successor: &str) -> LineageResult<Self> {
        Ok(Self::new(
            TokenIdentifier::parse(predecessor)?,
            TokenIdentifier::parse(successor)?,
        ))
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// A completed hand-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementResult {
    pub predecessor: TokenIdentifier,
    pub successor: TokenIdentifier,
    pub transaction_reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> TokenIdentifier {
        TokenIdentifier::new(11155111, EvmAddress::new([n; 20]))
    }

    fn record(n: u8, pred: Option<u8>, succ: Option<u8>) -> TokenRecord {
        TokenRecord {
            id: id(n),
            predecessor_id: pred.map(id),
            successor_id: succ.map(id),
            owner: EvmAddress::ZERO,
            checksum: vec![0xab, 0xcd],
            data_uri: format!("ipfs://{}", n),
        }
    }

    #[test]
    fn test_chain_assembly_order() {
        // Walk order for backward is nearest first: B then A.
        let chain = LineageChain::new(
            vec![record(2, Some(1), Some(3)), record(1, None, Some(2))],
            record(3, Some(2), Some(4)),
            vec![record(4, Some(3), None)],
        );
        let ids: Vec<_> = chain.records().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![id(1), id(2), id(3), id(4)]);
        assert_eq!(chain.current().id, id(3));
        assert_eq!(chain.current_index(), 2);
        assert_eq!(chain.predecessors().len(), 2);
        assert_eq!(chain.successors().len(), 1);
        assert_eq!(chain.oldest().id, id(1));
        assert_eq!(chain.newest().id, id(4));
        assert!(chain.is_consistent());
    }

    #[test]
    fn test_single_record_chain() {
        let chain = LineageChain::new(vec![], record(1, None, None), vec![]);
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
        assert!(chain.predecessors().is_empty());
        assert!(chain.successors().is_empty());
        assert!(chain.current().is_standalone());
        assert!(chain.is_consistent());
    }

    #[test]
    fn test_broken_link_detection() {
        // 2 claims 9 as predecessor while 1 claims 2 as successor.
        let chain = LineageChain::new(
            vec![record(1, None, Some(2))],
            record(2, Some(9), None),
            vec![],
        );
        assert_eq!(chain.first_broken_link(), Some(0));
        assert!(!chain.is_consistent());
    }

    #[test]
    fn test_record_json() {
        let json = serde_json::to_value(record(1, None, Some(2))).unwrap();
        assert_eq!(json["checksum"], "0xabcd");
        assert_eq!(json["predecessor_id"], serde_json::Value::Null);
        assert_eq!(json["successor_id"], id(2).as_str());
    }

    #[test]
    fn test_request_parse() {
        let req = ReplacementRequest::parse(id(1).as_str(), id(2).as_str())
            .unwrap()
            .with_force(true);
        assert_eq!(req.predecessor, id(1));
        assert!(req.force);
        assert!(ReplacementRequest::parse("nope", id(2).as_str()).is_err());
    }
}
