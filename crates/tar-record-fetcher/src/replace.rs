//! Predecessor-to-successor hand-off.
//!
//! One attempt moves through `Validating`, then `IntegrityChecking` unless
//! forced, then `Submitting`, ending in `Done`. Failures before submission
//! end in `Rejected` with nothing written; a failed write ends in `Failed`
//! and the ledger decides whether it took effect.

use tar_types::{
    parse_optional_identifier, EvmAddress, LineageError, LineageResult, LinkDirection,
    RemoteContext, ReplacementState,
};
use tracing::{info, warn};

use crate::fetcher::RecordFetcher;
use crate::types::{ReplacementRequest, ReplacementResult};

/// Outcome of one replacement attempt with the states it went through.
#[derive(Debug)]
pub struct ReplacementAttempt {
    pub states: Vec<ReplacementState>,
    pub result: LineageResult<ReplacementResult>,
}

impl ReplacementAttempt {
    /// Terminal state of the attempt, always the last entry of `states`.
    pub fn final_state(&self) -> ReplacementState {
        terminal_state(&self.result)
    }

    pub fn integrity_checked(&self) -> bool {
        self.states.contains(&ReplacementState::IntegrityChecking)
    }
}

/// Executes replacements from the point of view of one active network.
#[derive(Debug, Clone)]
pub struct ReplacementCoordinator {
    fetcher: RecordFetcher,
    active_network: String,
    sender: Option<EvmAddress>,
}

impl ReplacementCoordinator {
    /// `active_network` names the endpoint writes are sent through; it must
    /// host the predecessor.
    pub fn new(fetcher: RecordFetcher, active_network: &str) -> Self {
        Self {
            fetcher,
            active_network: active_network.to_string(),
            sender: None,
        }
    }

    /// Account the write is sent from. Without one the node's first account
    /// is used.
    pub fn with_sender(mut self, sender: Option<EvmAddress>) -> Self {
        self.sender = sender;
        self
    }

    pub fn active_network(&self) -> &str {
        &self.active_network
    }

    pub async fn replace(&self, request: &ReplacementRequest) -> LineageResult<ReplacementResult> {
        self.attempt(request).await.result
    }

    /// Run the hand-off and report every state entered.
    pub async fn attempt(&self, request: &ReplacementRequest) -> ReplacementAttempt {
        let mut states = Vec::new();
        let result = self.run(request, &mut states).await;
        let state = terminal_state(&result);
        enter(&mut states, state, request);
        let attempt = ReplacementAttempt { states, result };

        match &attempt.result {
            Ok(done) => info!(
                predecessor = %done.predecessor,
                successor = %done.successor,
                tx = %done.transaction_reference,
                %state,
                "replacement finished"
            ),
            Err(e) => warn!(
                predecessor = %request.predecessor,
                successor = %request.successor,
                %state,
                error = %e,
                "replacement stopped"
            ),
        }
        attempt
    }

    async fn run(
        &self,
        request: &ReplacementRequest,
        states: &mut Vec<ReplacementState>,
    ) -> LineageResult<ReplacementResult> {
        let registry = self.fetcher.registry();

        enter(states, ReplacementState::Validating, request);
        let active = registry.endpoint(&self.active_network)?;
        let active_chain_id = registry.chain_id_of(active).await?;
        if active_chain_id != request.predecessor.chain_id() {
            return Err(LineageError::WrongNetworkSelected {
                selected: self.active_network.clone(),
                selected_chain_id: active_chain_id,
                expected_chain_id: request.predecessor.chain_id(),
            });
        }

        if request.force {
            warn!(
                successor = %request.successor,
                "forced replacement: skipping successor back-pointer check"
            );
        } else {
            enter(states, ReplacementState::IntegrityChecking, request);
            self.check_successor(request).await?;
        }

        enter(states, ReplacementState::Submitting, request);
        let rpc_url = active
            .rpc_url()
            .ok_or_else(|| LineageError::EndpointNotQueryable {
                network: active.name().to_string(),
                chain_id: active_chain_id,
            })?;
        let transaction_reference = registry
            .ledger()
            .replace(
                rpc_url,
                self.sender,
                request.predecessor.address(),
                request.successor.as_str(),
            )
            .await
            .map_err(|source| LineageError::SubmissionFailed {
                network: active.name().to_string(),
                predecessor: request.predecessor.clone(),
                successor: request.successor.clone(),
                source,
            })?;

        Ok(ReplacementResult {
            predecessor: request.predecessor.clone(),
            successor: request.successor.clone(),
            transaction_reference,
        })
    }

    /// The successor's own predecessor pointer must name the token being
    /// replaced.
    async fn check_successor(&self, request: &ReplacementRequest) -> LineageResult<()> {
        let successor = &request.successor;
        let (endpoint, rpc_url) = self
            .fetcher
            .queryable_endpoint(successor.chain_id())
            .await?;
        let raw = self
            .fetcher
            .registry()
            .ledger()
            .predecessor(rpc_url, successor.address())
            .await
            .remote_context(endpoint.name(), "predecessor", Some(*successor.address()))?;

        let recorded = parse_optional_identifier(&raw).map_err(|_| {
            LineageError::MalformedPointer {
                token: successor.clone(),
                pointer: LinkDirection::Backward,
                value: raw.clone(),
            }
        })?;

        if recorded.as_ref() != Some(&request.predecessor) {
            return Err(LineageError::LinkageIntegrityViolation {
                token: successor.clone(),
                pointer: LinkDirection::Backward,
                expected: request.predecessor.clone(),
                recorded,
            });
        }
        Ok(())
    }
}

fn terminal_state(result: &LineageResult<ReplacementResult>) -> ReplacementState {
    match result {
        Ok(_) => ReplacementState::Done,
        Err(e) => e.replacement_state(),
    }
}

fn enter(
    states: &mut Vec<ReplacementState>,
    state: ReplacementState,
    request: &ReplacementRequest,
) {
    info!(
        predecessor = %request.predecessor,
        successor = %request.successor,
        %state,
        "replacement state"
    );
    states.push(state);
}
