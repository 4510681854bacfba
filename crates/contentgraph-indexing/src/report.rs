//! Final status of a run and the text shown to the CMS administrator
//!
//! The message is rendered as HTML by the scheduler host's admin view, so
//! every fragment drawn from outcomes is markup-encoded before it lands here.

use crate::IndexingError;
use crate::outcome::{Outcome, OutcomeSummary};
use chrono::{DateTime, Utc};
use contentgraph_common::{RunId, encode_optional_markup};
use serde::{Deserialize, Serialize};

/// Message for a run that completed without anything to journal
pub const COMPLETED_MESSAGE: &str = "Content Graph synchronization job run completely!";

/// Message for a run that observed a stop request
pub const STOPPED_MESSAGE: &str = "Stop of job was called.";

const LINE_BREAK: &str = "<br/>";

/// Link to the journal status page of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLink {
    root_path: String,
    run_id: RunId,
}

impl JournalLink {
    pub fn new(root_path: &str, run_id: RunId) -> Self {
        Self {
            root_path: root_path.trim_matches('/').to_string(),
            run_id,
        }
    }

    /// Root-relative URL of the status page
    pub fn href(&self) -> String {
        let prefix: String = self
            .root_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| format!("/{}", urlencoding::encode(segment)))
            .collect();
        format!(
            "{prefix}/contentgraph/journal/status?jobId={}",
            self.run_id
        )
    }

    /// Anchor element opening the status page in a new tab
    pub fn anchor(&self) -> String {
        format!("<a href='{}' target='_blank'>Details</a>", self.href())
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum JobRunState {
    /// Completed, nothing was journaled
    Completed,
    /// Completed, the message links to the journal entries
    CompletedWithDetails { journal_entries: usize },
    /// A stop request was observed
    Stopped,
    /// The schema phase failed; content was not indexed
    SchemaIndexingFailure,
    /// One or more content units failed
    ContentIndexingFailure,
}

impl JobRunState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::CompletedWithDetails { .. } => "completed_with_details",
            Self::Stopped => "stopped",
            Self::SchemaIndexingFailure => "schema_indexing_failure",
            Self::ContentIndexingFailure => "content_indexing_failure",
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::CompletedWithDetails { .. })
    }

    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::SchemaIndexingFailure | Self::ContentIndexingFailure
        )
    }
}

/// Result of one run of the job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRunReport {
    pub run_id: RunId,
    pub state: JobRunState,
    /// Human-readable status, safe to render as HTML
    pub message: String,
    /// Content phase tally, absent when the content phase did not complete
    pub summary: Option<OutcomeSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobRunReport {
    /// Run finished with nothing journaled
    pub fn completed(run_id: RunId, summary: OutcomeSummary, started_at: DateTime<Utc>) -> Self {
        Self::finish(
            run_id,
            JobRunState::Completed,
            COMPLETED_MESSAGE.to_string(),
            Some(summary),
            started_at,
        )
    }

    /// Run finished and journaled; links the journal and lists warnings
    pub fn completed_with_details(
        link: &JournalLink,
        journal_entries: usize,
        outcomes: &[Outcome],
        started_at: DateTime<Utc>,
    ) -> Self {
        let warnings: Vec<String> = outcomes
            .iter()
            .filter(|outcome| outcome.is_warning())
            .map(|outcome| encode_optional_markup(outcome.message()))
            .collect();
        let message = format!(
            "{COMPLETED_MESSAGE} {}{LINE_BREAK}{}",
            link.anchor(),
            warnings.join(LINE_BREAK)
        );

        Self::finish(
            link.run_id.clone(),
            JobRunState::CompletedWithDetails { journal_entries },
            message,
            Some(OutcomeSummary::from_outcomes(outcomes)),
            started_at,
        )
    }

    pub fn stopped(run_id: RunId, started_at: DateTime<Utc>) -> Self {
        Self::finish(
            run_id,
            JobRunState::Stopped,
            STOPPED_MESSAGE.to_string(),
            None,
            started_at,
        )
    }

    /// Report for a run-level failure; `None` if `error` is not one
    pub fn failed(
        run_id: RunId,
        error: &IndexingError,
        summary: Option<OutcomeSummary>,
        started_at: DateTime<Utc>,
    ) -> Option<Self> {
        let state = match error {
            IndexingError::SchemaIndexingFailure { .. } => JobRunState::SchemaIndexingFailure,
            IndexingError::ContentIndexingFailure { .. } => JobRunState::ContentIndexingFailure,
            _ => return None,
        };
        Some(Self::finish(
            run_id,
            state,
            error.to_string(),
            summary,
            started_at,
        ))
    }

    fn finish(
        run_id: RunId,
        state: JobRunState,
        message: String,
        summary: Option<OutcomeSummary>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            state,
            message,
            summary,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub const fn succeeded(&self) -> bool {
        self.state.is_success()
    }
}

impl std::fmt::Display for JobRunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
