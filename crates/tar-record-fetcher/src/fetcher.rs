//! Single-token record fetching.

use std::sync::Arc;

use tar_resolver::{NetworkEndpoint, NetworkRegistry};
use tar_types::{
    parse_optional_identifier, LineageError, LineageResult, LinkDirection, RemoteContext,
    TokenIdentifier,
};
use tracing::debug;

use crate::types::TokenRecord;

/// Index used for `checksum(uint256)` and `dataUri(uint256)` reads.
pub const RECORD_FIELD_INDEX: u64 = 0;

/// Reads token records from whichever configured network hosts them.
#[derive(Debug, Clone)]
pub struct RecordFetcher {
    registry: Arc<NetworkRegistry>,
}

impl RecordFetcher {
    pub fn new(registry: Arc<NetworkRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<NetworkRegistry> {
        &self.registry
    }

    /// Endpoint hosting `chain_id`, together with its RPC URL.
    ///
    /// Fails with `EndpointNotQueryable` when the matching endpoint only
    /// declares a static chain id.
    pub async fn queryable_endpoint(
        &self,
        chain_id: u64,
    ) -> LineageResult<(&NetworkEndpoint, &str)> {
        let endpoint = self.registry.find_endpoint_for_chain(chain_id).await?;
        let rpc_url = endpoint
            .rpc_url()
            .ok_or_else(|| LineageError::EndpointNotQueryable {
                network: endpoint.name().to_string(),
                chain_id,
            })?;
        Ok((endpoint, rpc_url))
    }

    /// Parse `text` and fetch the record it names.
    pub async fn fetch_str(&self, text: &str) -> LineageResult<TokenRecord> {
        let id = TokenIdentifier::parse(text)?;
        self.fetch(&id).await
    }

    /// Fresh snapshot of `id`.
    ///
    /// The five field reads run concurrently; any failure fails the whole
    /// fetch.
    pub async fn fetch(&self, id: &TokenIdentifier) -> LineageResult<TokenRecord> {
        let (endpoint, rpc_url) = self.queryable_endpoint(id.chain_id()).await?;
        let network = endpoint.name();
        let ledger = self.registry.ledger();
        let contract = id.address();
        let target = Some(*contract);

        debug!(token = %id, network, "fetching token record");

        let (predecessor, successor, owner, checksum, data_uri) = tokio::try_join!(
            async {
                ledger
                    .predecessor(rpc_url, contract)
                    .await
                    .remote_context(network, "predecessor", target)
            },
            async {
                ledger
                    .successor(rpc_url, contract)
                    .await
                    .remote_context(network, "successor", target)
            },
            async {
                ledger
                    .owner(rpc_url, contract)
                    .await
                    .remote_context(network, "owner", target)
            },
            async {
                ledger
                    .checksum(rpc_url, contract, RECORD_FIELD_INDEX)
                    .await
                    .remote_context(network, "checksum", target)
            },
            async {
                ledger
                    .data_uri(rpc_url, contract, RECORD_FIELD_INDEX)
                    .await
                    .remote_context(network, "dataUri", target)
            },
        )?;

        Ok(TokenRecord {
            predecessor_id: parse_pointer(id, LinkDirection::Backward, predecessor)?,
            successor_id: parse_pointer(id, LinkDirection::Forward, successor)?,
            id: id.clone(),
            owner,
            checksum,
            data_uri,
        })
    }
}

fn parse_pointer(
    token: &TokenIdentifier,
    pointer: LinkDirection,
    value: String,
) -> LineageResult<Option<TokenIdentifier>> {
    parse_optional_identifier(&value).map_err(|_| LineageError::MalformedPointer {
        token: token.clone(),
        pointer,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tar_resolver::NetworkEndpoint;
    use tar_transport::{InMemoryLedger, TokenState};
    use tar_types::{ErrorKind, EvmAddress};

    const SEPOLIA: &str = "mem://sepolia";
    const AMOY: &str = "mem://amoy";

    fn fetcher(ledger: InMemoryLedger) -> (RecordFetcher, Arc<InMemoryLedger>) {
        let ledger = Arc::new(ledger);
        let registry = NetworkRegistry::new(
            vec![
                NetworkEndpoint::new("sepolia", Some(11155111), Some(SEPOLIA)),
                NetworkEndpoint::new("amoy", None, Some(AMOY)),
                NetworkEndpoint::new("offline", Some(5), None),
            ],
            ledger.clone(),
        )
        .unwrap();
        (RecordFetcher::new(Arc::new(registry)), ledger)
    }

    fn addr(n: u8) -> EvmAddress {
        EvmAddress::new([n; 20])
    }

    #[tokio::test]
    async fn test_fetch_reads_all_fields() {
        let pred = TokenIdentifier::new(80002, addr(2));
        let (fetcher, ledger) = fetcher(
            InMemoryLedger::new().with_chain(AMOY, 80002).with_token(
                SEPOLIA,
                addr(1),
                TokenState::new(addr(7))
                    .with_predecessor(pred.as_str())
                    .with_checksum(vec![1, 2, 3])
                    .with_data_uri("ipfs://bafy"),
            ),
        );

        let record = fetcher
            .fetch_str("urn:tar:eip155.11155111:0101010101010101010101010101010101010101")
            .await
            .unwrap();
        assert_eq!(record.id, TokenIdentifier::new(11155111, addr(1)));
        assert_eq!(record.predecessor_id, Some(pred));
        assert_eq!(record.successor_id, None);
        assert_eq!(record.owner, addr(7));
        assert_eq!(record.checksum, vec![1, 2, 3]);
        assert_eq!(record.data_uri, "ipfs://bafy");

        for method in ["predecessor", "successor", "owner", "checksum", "data_uri"] {
            assert_eq!(ledger.call_count(method), 1, "{}", method);
        }
    }

    #[tokio::test]
    async fn test_fetch_on_remote_queried_endpoint() {
        let (fetcher, _) = fetcher(
            InMemoryLedger::new()
                .with_chain(AMOY, 80002)
                .with_token(AMOY, addr(3), TokenState::new(addr(3))),
        );
        let record = fetcher
            .fetch(&TokenIdentifier::new(80002, addr(3)))
            .await
            .unwrap();
        assert!(record.is_standalone());
    }

    #[tokio::test]
    async fn test_any_failed_read_fails_the_fetch() {
        let (fetcher, _) = fetcher(
            InMemoryLedger::new()
                .with_chain(AMOY, 80002)
                .with_token(SEPOLIA, addr(1), TokenState::new(addr(7)))
                .with_failure(SEPOLIA, "checksum"),
        );
        let err = fetcher
            .fetch(&TokenIdentifier::new(11155111, addr(1)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCallFailure);
        assert!(err.kind().is_retryable());
        match err {
            LineageError::RemoteCallFailure {
                network,
                call,
                target,
                ..
            } => {
                assert_eq!(network, "sepolia");
                assert_eq!(call, "checksum");
                assert_eq!(target, Some(addr(1)));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_static_endpoint_without_url_is_not_queryable() {
        let (fetcher, ledger) = fetcher(InMemoryLedger::new().with_chain(AMOY, 80002));
        let err = fetcher
            .fetch(&TokenIdentifier::new(5, addr(1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LineageError::EndpointNotQueryable { chain_id: 5, .. }
        ));
        assert_eq!(ledger.call_count("owner"), 0);
    }

    #[tokio::test]
    async fn test_unknown_chain_and_malformed_pointer() {
        let (fetcher, _) = fetcher(
            InMemoryLedger::new().with_chain(AMOY, 80002).with_token(
                SEPOLIA,
                addr(1),
                TokenState::new(addr(7)).with_successor("not-an-identifier"),
            ),
        );
        let err = fetcher
            .fetch(&TokenIdentifier::new(999, addr(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, LineageError::NoNetworkForChain { chain_id: 999 }));

        let err = fetcher
            .fetch(&TokenIdentifier::new(11155111, addr(1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LineageError::MalformedPointer {
                pointer: LinkDirection::Forward,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_malformed_input_needs_no_io() {
        let (fetcher, ledger) = fetcher(InMemoryLedger::new());
        let err = fetcher.fetch_str("urn:tar:eip155.1:xyz").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedIdentifier);
        assert!(ledger.calls().is_empty());
    }
}
