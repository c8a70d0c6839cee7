//! Lineage traversal across predecessor and successor pointers.
//!
//! Each step depends on the pointer read in the previous step, so a single
//! direction is strictly sequential. The backward and forward walks share
//! nothing and run concurrently in [`LineageWalker::build_lineage`].
//!
//! Walks stop at the first record without a pointer in the walk direction.
//! A pointer back to a record already seen in the same walk, or a walk longer
//! than the configured depth, fails with `NonTerminatingLineage`.

use std::collections::HashSet;

use futures::stream::{self, Stream, TryStreamExt};
use tar_types::{
    env_var_or, LineageError, LineageResult, LinkDirection, NonTermination, TokenIdentifier,
};
use tracing::debug;

use crate::fetcher::RecordFetcher;
use crate::types::{LineageChain, TokenRecord};

/// Default maximum number of records fetched per direction.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Follows lineage pointers from a starting record.
#[derive(Debug, Clone)]
pub struct LineageWalker {
    fetcher: RecordFetcher,
    max_depth: usize,
    verify_links: bool,
}

struct WalkState {
    previous: TokenRecord,
    visited: HashSet<TokenIdentifier>,
    steps: usize,
}

impl LineageWalker {
    /// Walker with the depth limit from `TAR_MAX_LINEAGE_DEPTH` and link
    /// verification off.
    pub fn new(fetcher: RecordFetcher) -> Self {
        Self {
            fetcher,
            max_depth: env_var_or("TAR_MAX_LINEAGE_DEPTH", DEFAULT_MAX_DEPTH),
            verify_links: false,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check that every fetched record points back at the record it was
    /// reached from.
    pub fn verify_links(mut self, verify: bool) -> Self {
        self.verify_links = verify;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn fetcher(&self) -> &RecordFetcher {
        &self.fetcher
    }

    /// Lazily fetch records reachable from `start` in `direction`.
    ///
    /// `start` itself is not yielded. Records come nearest first.
    pub fn walk(
        &self,
        start: &TokenRecord,
        direction: LinkDirection,
    ) -> impl Stream<Item = LineageResult<TokenRecord>> + '_ {
        let origin = start.id.clone();
        let state = WalkState {
            previous: start.clone(),
            visited: HashSet::from([start.id.clone()]),
            steps: 0,
        };

        stream::try_unfold(state, move |mut state| {
            let origin = origin.clone();
            async move {
                let next = match state.previous.link(direction) {
                    Some(next) => next.clone(),
                    None => return Ok(None),
                };

                let stop = |reason| LineageError::NonTerminatingLineage {
                    start: origin.clone(),
                    direction,
                    at: next.clone(),
                    reason,
                };
                if state.visited.contains(&next) {
                    return Err(stop(NonTermination::Cycle));
                }
                if state.steps >= self.max_depth {
                    return Err(stop(NonTermination::DepthLimit(self.max_depth)));
                }

                debug!(
                    token = %next,
                    %direction,
                    step = state.steps + 1,
                    "following lineage pointer"
                );
                let record = self.fetcher.fetch(&next).await?;

                if self.verify_links {
                    let back = direction.reverse();
                    if record.link(back) != Some(&state.previous.id) {
                        return Err(LineageError::LinkageIntegrityViolation {
                            token: record.id.clone(),
                            pointer: back,
                            expected: state.previous.id.clone(),
                            recorded: record.link(back).cloned(),
                        });
                    }
                }

                state.visited.insert(next);
                state.steps += 1;
                state.previous = record.clone();
                Ok::<_, LineageError>(Some((record, state)))
            }
        })
    }

    /// Fetch `start`, then walk its predecessors. A failed first fetch is
    /// the stream's only item.
    pub fn walk_backward(
        &self,
        start: &TokenIdentifier,
    ) -> impl Stream<Item = LineageResult<TokenRecord>> + '_ {
        self.walk_id(start, LinkDirection::Backward)
    }

    /// Fetch `start`, then walk its successors.
    pub fn walk_forward(
        &self,
        start: &TokenIdentifier,
    ) -> impl Stream<Item = LineageResult<TokenRecord>> + '_ {
        self.walk_id(start, LinkDirection::Forward)
    }

    fn walk_id(
        &self,
        start: &TokenIdentifier,
        direction: LinkDirection,
    ) -> impl Stream<Item = LineageResult<TokenRecord>> + '_ {
        let start = start.clone();
        stream::once(async move { self.fetcher.fetch(&start).await })
            .map_ok(move |record| self.walk(&record, direction))
            .try_flatten()
    }

    /// Run a walk to completion.
    pub async fn collect(
        &self,
        start: &TokenRecord,
        direction: LinkDirection,
    ) -> LineageResult<Vec<TokenRecord>> {
        self.walk(start, direction).try_collect().await
    }

    /// Fetch `id` once, then walk both directions concurrently.
    pub async fn build_lineage(&self, id: &TokenIdentifier) -> LineageResult<LineageChain> {
        let current = self.fetcher.fetch(id).await?;
        self.build_lineage_from(current).await
    }

    /// Build the lineage around an already-fetched record.
    pub async fn build_lineage_from(&self, current: TokenRecord) -> LineageResult<LineageChain> {
        let (backward, forward) = tokio::try_join!(
            self.collect(&current, LinkDirection::Backward),
            self.collect(&current, LinkDirection::Forward),
        )?;
        debug!(
            token = %current.id,
            predecessors = backward.len(),
            successors = forward.len(),
            "lineage built"
        );
        Ok(LineageChain::new(backward, current, forward))
    }
}
