//! End-to-end resolution, traversal, and replacement through `TokenResolver`
//! against the in-memory ledger.

mod common;

use std::sync::Arc;

use common::*;
use tar_lineage::{
    ErrorKind, LineageError, ReplacementRequest, ReplacementState, TokenIdentifier,
};

#[tokio::test]
async fn test_standalone_sepolia_token() {
    let ledger = Arc::new(ledger());
    let id = TokenIdentifier::parse(
        "urn:tar:eip155.11155111:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
    )
    .unwrap();
    deploy(&ledger, &id, None, None);
    let resolver = resolver(ledger.clone());

    let endpoint = resolver
        .registry()
        .find_endpoint_for_chain(SEPOLIA)
        .await
        .unwrap();
    assert_eq!(endpoint.name(), "sepolia");

    let record = resolver.resolve(id.as_str()).await.unwrap();
    assert_eq!(record.predecessor_id, None);
    assert_eq!(record.owner, OWNER);

    let chain = resolver.build_lineage(id.as_str()).await.unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.current(), &record);

    // Nothing was read through the local endpoint.
    assert!(ledger.calls().iter().all(|c| c.rpc_url != LOCAL_URL));
}

#[tokio::test]
async fn test_cross_network_lineage_from_the_middle() {
    let ledger = Arc::new(ledger());
    let (a, b, c) = (token(SEPOLIA, 1), token(AMOY, 2), token(ETHERLINK, 3));
    deploy(&ledger, &a, None, Some(&b));
    deploy(&ledger, &b, Some(&a), Some(&c));
    deploy(&ledger, &c, Some(&b), None);
    let resolver = resolver(ledger);

    let chain = resolver.build_lineage(b.as_str()).await.unwrap();
    let ids: Vec<_> = chain.records().iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec![a.clone(), b.clone(), c]);
    assert_eq!(chain.current().id, b);
    assert!(chain.is_consistent());

    let summary = resolver.summarize(b.as_str()).await.unwrap();
    assert_eq!(summary.token.chain_id, AMOY.to_string());
    assert_eq!(summary.predecessors.len(), 1);
    assert_eq!(summary.predecessors[0].id, a.as_str());
    assert_eq!(summary.successors.len(), 1);
    assert!(summary.render_text().contains(&format!("[>2] {}", b)));
}

#[tokio::test]
async fn test_replace_then_read_shows_new_successor() {
    let ledger = Arc::new(ledger());
    let old = token(SEPOLIA, 1);
    let new = token(AMOY, 2);
    deploy(&ledger, &old, None, None);
    deploy(&ledger, &new, Some(&old), None);
    let resolver = resolver(ledger.clone())
        .with_active_network(Some("sepolia"))
        .with_sender(Some(OWNER));

    let before = resolver.build_lineage(old.as_str()).await.unwrap();
    assert_eq!(before.len(), 1);

    let done = resolver
        .replace(&ReplacementRequest::new(old.clone(), new.clone()))
        .await
        .unwrap();
    assert_eq!(done.successor, new);
    assert_eq!(ledger.call_count("replace"), 1);

    let after = resolver.build_lineage(old.as_str()).await.unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after.newest().id, new);
    assert!(after.is_consistent());
}

#[tokio::test]
async fn test_replace_rejects_foreign_successor_without_writing() {
    let ledger = Arc::new(ledger());
    let old = token(SEPOLIA, 1);
    let stranger = token(SEPOLIA, 9);
    let new = token(AMOY, 2);
    deploy(&ledger, &old, None, None);
    deploy(&ledger, &new, Some(&stranger), None);
    let resolver = resolver(ledger.clone()).with_active_network(Some("sepolia"));

    let attempt = resolver
        .attempt_replace(&ReplacementRequest::new(old.clone(), new.clone()))
        .await
        .unwrap();
    assert_eq!(attempt.final_state(), ReplacementState::Rejected);
    assert_eq!(
        attempt.result.unwrap_err().kind(),
        ErrorKind::LinkageIntegrityViolation
    );
    assert_eq!(ledger.call_count("replace"), 0);

    // Forcing skips the check and writes.
    let forced = resolver
        .attempt_replace(&ReplacementRequest::new(old, new).with_force(true))
        .await
        .unwrap();
    assert_eq!(forced.final_state(), ReplacementState::Done);
    assert_eq!(ledger.call_count("replace"), 1);
}

#[tokio::test]
async fn test_replace_requires_active_network() {
    let resolver = resolver(Arc::new(ledger()));
    let err = resolver
        .replace(&ReplacementRequest::new(token(SEPOLIA, 1), token(AMOY, 2)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);

    // Amoy does not host the predecessor.
    let resolver = resolver.with_active_network(Some("amoy"));
    let err = resolver
        .replace(&ReplacementRequest::new(token(SEPOLIA, 1), token(AMOY, 2)))
        .await
        .unwrap_err();
    assert!(matches!(err, LineageError::WrongNetworkSelected { .. }));
}

#[tokio::test]
async fn test_errors_are_distinguishable() {
    let ledger = Arc::new(ledger().with_failure(ETHERLINK_URL, "owner"));
    deploy(&ledger, &token(ETHERLINK, 4), None, None);
    let resolver = resolver(ledger.clone());

    let malformed = resolver.resolve("urn:tar:eip155.1:abc").await.unwrap_err();
    assert_eq!(malformed.kind(), ErrorKind::MalformedIdentifier);

    let unknown = resolver
        .resolve(token(1, 4).as_str())
        .await
        .unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::NoNetworkForChain);
    assert!(unknown.kind().is_configuration());

    let remote = resolver
        .resolve(token(ETHERLINK, 4).as_str())
        .await
        .unwrap_err();
    assert_eq!(remote.kind(), ErrorKind::RemoteCallFailure);
    assert!(remote.kind().is_retryable());
}

#[tokio::test]
async fn test_network_statuses() {
    let ledger = Arc::new(ledger());
    let resolver = resolver(ledger.clone());

    let statuses = resolver.network_statuses().await;
    let names: Vec<_> = statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["localhost", "sepolia", "amoy", "etherlink-testnet"]);
    assert!(statuses[0].local);
    assert_eq!(statuses[2].chain_id, Some(AMOY));
    assert!(statuses.iter().all(|s| s.error.is_none()));

    // The amoy chain id is cached after the listing.
    resolver.registry().find_endpoint_for_chain(AMOY).await.unwrap();
    assert_eq!(ledger.call_count("chain_id"), 1);
}

#[tokio::test]
#[cfg(feature = "network-tests")]
#[ignore = "requires network access to the public Sepolia RPC"]
async fn test_sepolia_missing_contract_is_remote_failure() {
    let resolver = tar_lineage::TokenResolver::from_env(None).unwrap();
    let err = resolver
        .resolve("urn:tar:eip155.11155111:0000000000000000000000000000000000000001")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteCallFailure);
}
