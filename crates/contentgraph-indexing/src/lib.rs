//! Content graph synchronization job
//!
//! Orchestrates a scheduled run in two phases (content types, then content),
//! reports content outcomes to a journal and produces a status message for the
//! CMS administrator. Runs can be stopped cooperatively at any await point.

pub mod error;
pub mod job;
pub mod outcome;
pub mod phases;
pub mod report;
pub mod status;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{IndexingError, IndexingResult};
pub use job::{ContentIndexingJob, JobDescriptor, ScheduledJob};
pub use outcome::{Outcome, OutcomeStatus, OutcomeSummary};
pub use phases::{ContentIndexer, JournalReporter, SchemaIndexer};
pub use report::{COMPLETED_MESSAGE, JobRunReport, JobRunState, JournalLink, STOPPED_MESSAGE};
pub use status::{StatusNotifier, TracingStatusNotifier};

// Re-export so hosts and phase implementations share one token type
pub use tokio_util::sync::CancellationToken;
