//! Structured errors for identifier resolution, traversal, and replacement.
//!
//! Every failure carries enough context (identifier, endpoint, call) to act
//! on, and maps to a flat [`ErrorKind`] so callers can decide whether to
//! retry, reconfigure, or give up.

use std::fmt;

use crate::address::EvmAddress;
use crate::identifier::TokenIdentifier;
use crate::lineage::{LinkDirection, ReplacementState};

pub type LineageResult<T> = std::result::Result<T, LineageError>;

/// Why a traversal was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonTermination {
    /// A pointer led back to a token already visited in this walk.
    Cycle,
    /// The walk exceeded the configured maximum number of steps.
    DepthLimit(usize),
}

#[derive(Debug)]
pub enum LineageError {
    /// Input text is not a `urn:tar:eip155.<chain>:<address>` identifier.
    MalformedIdentifier { input: String, reason: &'static str },

    /// A token's on-chain pointer field holds something that is not an identifier.
    MalformedPointer {
        token: TokenIdentifier,
        pointer: LinkDirection,
        value: String,
    },

    /// No endpoint with this name is configured.
    UnknownNetwork { network: String },

    /// The endpoint has neither a static chain id nor an RPC URL.
    UnresolvableNetwork { network: String },

    /// No configured endpoint (besides the local one) serves this chain.
    NoNetworkForChain { chain_id: u64 },

    /// The endpoint serving this chain has no RPC URL to call.
    EndpointNotQueryable { network: String, chain_id: u64 },

    /// The active network is not the one hosting the predecessor.
    WrongNetworkSelected {
        selected: String,
        selected_chain_id: u64,
        expected_chain_id: u64,
    },

    /// A pointer does not agree with the token on the other end of the link.
    LinkageIntegrityViolation {
        token: TokenIdentifier,
        pointer: LinkDirection,
        expected: TokenIdentifier,
        recorded: Option<TokenIdentifier>,
    },

    /// A read (or chain id query) against a ledger failed.
    RemoteCallFailure {
        network: String,
        call: &'static str,
        target: Option<EvmAddress>,
        source: anyhow::Error,
    },

    /// The `replace` write failed; the ledger may or may not have applied it.
    SubmissionFailed {
        network: String,
        predecessor: TokenIdentifier,
        successor: TokenIdentifier,
        source: anyhow::Error,
    },

    /// Traversal hit a cycle or the depth guard.
    NonTerminatingLineage {
        start: TokenIdentifier,
        direction: LinkDirection,
        at: TokenIdentifier,
        reason: NonTermination,
    },

    /// The network configuration itself is unusable.
    InvalidConfig { reason: String },
}

/// Flat classification of [`LineageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedIdentifier,
    UnresolvableNetwork,
    NoNetworkForChain,
    EndpointNotQueryable,
    WrongNetworkSelected,
    LinkageIntegrityViolation,
    RemoteCallFailure,
    NonTerminatingLineage,
    InvalidConfig,
}

impl ErrorKind {
    /// Only remote call failures can succeed on a plain retry.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::RemoteCallFailure)
    }

    /// The fix is a configuration change (endpoints, URLs, names).
    pub fn is_configuration(self) -> bool {
        matches!(
            self,
            ErrorKind::UnresolvableNetwork
                | ErrorKind::NoNetworkForChain
                | ErrorKind::EndpointNotQueryable
                | ErrorKind::InvalidConfig
        )
    }
}

impl LineageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LineageError::MalformedIdentifier { .. } | LineageError::MalformedPointer { .. } => {
                ErrorKind::MalformedIdentifier
            }
            LineageError::UnknownNetwork { .. } | LineageError::UnresolvableNetwork { .. } => {
                ErrorKind::UnresolvableNetwork
            }
            LineageError::NoNetworkForChain { .. } => ErrorKind::NoNetworkForChain,
            LineageError::EndpointNotQueryable { .. } => ErrorKind::EndpointNotQueryable,
            LineageError::WrongNetworkSelected { .. } => ErrorKind::WrongNetworkSelected,
            LineageError::LinkageIntegrityViolation { .. } => ErrorKind::LinkageIntegrityViolation,
            LineageError::RemoteCallFailure { .. } | LineageError::SubmissionFailed { .. } => {
                ErrorKind::RemoteCallFailure
            }
            LineageError::NonTerminatingLineage { .. } => ErrorKind::NonTerminatingLineage,
            LineageError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }

    /// Terminal state of a replacement attempt that ended with this error.
    pub fn replacement_state(&self) -> ReplacementState {
        match self {
            LineageError::SubmissionFailed { .. } => ReplacementState::Failed,
            _ => ReplacementState::Rejected,
        }
    }

    pub(crate) fn remote(
        network: &str,
        call: &'static str,
        target: Option<EvmAddress>,
        source: anyhow::Error,
    ) -> Self {
        LineageError::RemoteCallFailure {
            network: network.to_string(),
            call,
            target,
            source,
        }
    }
}

impl fmt::Display for LineageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineageError::MalformedIdentifier { input, reason } => {
                write!(f, "invalid token id {:?}: {}", input, reason)
            }
            LineageError::MalformedPointer {
                token,
                pointer,
                value,
            } => write!(
                f,
                "token {} has a malformed {} pointer: {:?}",
                token,
                pointer.pointer_name(),
                value
            ),
            LineageError::UnknownNetwork { network } => {
                write!(f, "network {:?} is not configured", network)
            }
            LineageError::UnresolvableNetwork { network } => write!(
                f,
                "cannot find chain id of {}: configure a chain_id or url for it",
                network
            ),
            LineageError::NoNetworkForChain { chain_id } => {
                write!(f, "no configured network with chain id {}", chain_id)
            }
            LineageError::EndpointNotQueryable { network, chain_id } => write!(
                f,
                "network {} (chain id {}) is configured without a URL",
                network, chain_id
            ),
            LineageError::WrongNetworkSelected {
                selected,
                selected_chain_id,
                expected_chain_id,
            } => write!(
                f,
                "selected network {} (chain id {}) is invalid: switch to the predecessor's network (chain id {})",
                selected, selected_chain_id, expected_chain_id
            ),
            LineageError::LinkageIntegrityViolation {
                token,
                pointer,
                expected,
                recorded,
            } => {
                write!(
                    f,
                    "token {} points to another {} (expected {}, found ",
                    token,
                    pointer.pointer_name(),
                    expected
                )?;
                match recorded {
                    Some(id) => write!(f, "{})", id),
                    None => write!(f, "none)"),
                }
            }
            LineageError::RemoteCallFailure {
                network,
                call,
                target,
                source,
            } => {
                write!(f, "{} call failed on {}", call, network)?;
                if let Some(addr) = target {
                    write!(f, " (contract {})", addr)?;
                }
                write!(f, ": {}", source)
            }
            LineageError::SubmissionFailed {
                network,
                predecessor,
                successor,
                source,
            } => write!(
                f,
                "replace of {} with {} failed on {}: {}",
                predecessor, successor, network, source
            ),
            LineageError::NonTerminatingLineage {
                start,
                direction,
                at,
                reason,
            } => match reason {
                NonTermination::Cycle => write!(
                    f,
                    "{} lineage of {} loops back to {}",
                    direction, start, at
                ),
                NonTermination::DepthLimit(limit) => write!(
                    f,
                    "{} lineage of {} exceeds {} steps (stopped at {})",
                    direction, start, limit, at
                ),
            },
            LineageError::InvalidConfig { reason } => {
                write!(f, "invalid network configuration: {}", reason)
            }
        }
    }
}

impl std::error::Error for LineageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LineageError::RemoteCallFailure { source, .. }
            | LineageError::SubmissionFailed { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

/// Attach ledger-call context to transport results.
pub trait RemoteContext<T> {
    fn remote_context(
        self,
        network: &str,
        call: &'static str,
        target: Option<EvmAddress>,
    ) -> LineageResult<T>;
}

impl<T> RemoteContext<T> for anyhow::Result<T> {
    fn remote_context(
        self,
        network: &str,
        call: &'static str,
        target: Option<EvmAddress>,
    ) -> LineageResult<T> {
        self.map_err(|e| LineageError::remote(network, call, target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::error::Error as _;

    fn token(n: u8) -> TokenIdentifier {
        TokenIdentifier::new(1, EvmAddress::new([n; 20]))
    }

    #[test]
    fn test_kinds_and_retryability() {
        let remote: LineageResult<()> = Err(anyhow!("connection reset")).remote_context(
            "sepolia",
            "owner",
            Some(EvmAddress::ZERO),
        );
        let err = remote.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCallFailure);
        assert!(err.kind().is_retryable());
        assert!(err.source().is_some());
        assert!(err.to_string().contains("owner call failed on sepolia"));

        let cfg = LineageError::NoNetworkForChain { chain_id: 5 };
        assert!(cfg.kind().is_configuration());
        assert!(!cfg.kind().is_retryable());
        assert_eq!(cfg.to_string(), "no configured network with chain id 5");
    }

    #[test]
    fn test_replacement_state_mapping() {
        let submit = LineageError::SubmissionFailed {
            network: "amoy".into(),
            predecessor: token(1),
            successor: token(2),
            source: anyhow!("nonce too low"),
        };
        assert_eq!(submit.replacement_state(), ReplacementState::Failed);
        assert_eq!(submit.kind(), ErrorKind::RemoteCallFailure);

        let violation = LineageError::LinkageIntegrityViolation {
            token: token(2),
            pointer: LinkDirection::Backward,
            expected: token(1),
            recorded: None,
        };
        assert_eq!(violation.replacement_state(), ReplacementState::Rejected);
        assert!(violation.to_string().ends_with("found none)"));
    }

    #[test]
    fn test_unknown_network_is_unresolvable() {
        let err = LineageError::UnknownNetwork {
            network: "mainnet".into(),
        };
        assert_eq!(err.kind(), ErrorKind::UnresolvableNetwork);
    }
}
