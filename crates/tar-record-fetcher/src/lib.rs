//! Token record fetching, lineage traversal, and replacement.
//!
//! This crate provides:
//! - [`RecordFetcher`]: one fresh [`TokenRecord`] per identifier, read from
//!   whichever configured network hosts it
//! - [`LineageWalker`]: predecessor/successor traversal into a [`LineageChain`]
//! - [`ReplacementCoordinator`]: the verified predecessor-to-successor hand-off
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tar_record_fetcher::{LineageWalker, RecordFetcher};
//!
//! let fetcher = RecordFetcher::new(Arc::new(registry));
//! let chain = LineageWalker::new(fetcher).build_lineage(&id).await?;
//! for record in chain.records() {
//!     println!("{}", record.id);
//! }
//! ```

pub mod fetcher;
pub mod replace;
pub mod types;
pub mod walker;

pub use fetcher::{RecordFetcher, RECORD_FIELD_INDEX};
pub use replace::{ReplacementAttempt, ReplacementCoordinator};
pub use types::{LineageChain, ReplacementRequest, ReplacementResult, TokenRecord};
pub use walker::{LineageWalker, DEFAULT_MAX_DEPTH};
