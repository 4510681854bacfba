//! Collaborator traits for the two indexing phases and the journal
//!
//! Implementations talk to the index backend and to the journal store; the
//! job only sees these seams and receives them through its constructor.

use crate::IndexingResult;
use crate::outcome::Outcome;
use async_trait::async_trait;
use contentgraph_common::RunId;
use tokio_util::sync::CancellationToken;

/// Synchronizes content-type definitions into the index
#[async_trait]
pub trait SchemaIndexer: Send + Sync {
    /// Run the schema phase
    ///
    /// Expected failures come back as a Warning or Error [`Outcome`]. Return
    /// [`crate::IndexingError::Cancelled`] after observing `cancellation`;
    /// anything else is treated as an unexpected fault.
    async fn run(&self, cancellation: &CancellationToken) -> IndexingResult<Outcome>;
}

/// Synchronizes content instances into the index
#[async_trait]
pub trait ContentIndexer: Send + Sync {
    /// Run the content phase, returning one outcome per unit in processing order
    ///
    /// Per-unit failures are Error outcomes, not `Err`. Must observe
    /// `cancellation` between units.
    async fn run(&self, cancellation: &CancellationToken) -> IndexingResult<Vec<Outcome>>;
}

/// Persists the outcomes of a run as a journal entry
#[async_trait]
pub trait JournalReporter: Send + Sync {
    /// Submit the run's outcomes; returns how many journal entries were written
    ///
    /// Zero means nothing was worth journaling and no details page exists.
    async fn report_run(&self, run_id: &RunId, outcomes: &[Outcome]) -> IndexingResult<usize>;
}
