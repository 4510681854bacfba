//! In-memory collaborators for exercising the job without a backend

use crate::outcome::Outcome;
use crate::phases::{ContentIndexer, JournalReporter, SchemaIndexer};
use crate::status::StatusNotifier;
use crate::{IndexingError, IndexingResult};
use async_trait::async_trait;
use contentgraph_common::RunId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// How a mock behaves once it is called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockBehavior {
    /// Return the configured result immediately
    #[default]
    Return,
    /// Wait for the token, then return `Cancelled`
    WaitForCancellation,
    /// `WaitForCancellation` on the first call, `Return` afterwards
    WaitForCancellationOnce,
    /// Never complete and never look at the token
    Hang,
    /// Fail with a backend error
    Fail,
}

impl MockBehavior {
    /// Behavior for the zero-based `call`
    const fn for_call(self, call: usize) -> Self {
        match self {
            Self::WaitForCancellationOnce if call > 0 => Self::Return,
            other => other,
        }
    }
}

async fn behave<T>(
    behavior: MockBehavior,
    cancellation: &CancellationToken,
    value: T,
) -> IndexingResult<T> {
    match behavior {
        MockBehavior::Return => Ok(value),
        MockBehavior::WaitForCancellation | MockBehavior::WaitForCancellationOnce => {
            cancellation.cancelled().await;
            Err(IndexingError::Cancelled)
        }
        MockBehavior::Hang => std::future::pending().await,
        MockBehavior::Fail => Err(anyhow::anyhow!("Mock backend error").into()),
    }
}

/// Mock schema phase returning a fixed outcome
pub struct MockSchemaIndexer {
    pub outcome: Outcome,
    pub behavior: MockBehavior,
    pub started: Arc<Notify>,
    calls: AtomicUsize,
}

impl MockSchemaIndexer {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            behavior: MockBehavior::Return,
            started: Arc::new(Notify::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Outcome::success())
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SchemaIndexer for MockSchemaIndexer {
    async fn run(&self, cancellation: &CancellationToken) -> IndexingResult<Outcome> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        behave(self.behavior.for_call(call), cancellation, self.outcome.clone()).await
    }
}

/// Mock content phase returning a fixed outcome sequence
pub struct MockContentIndexer {
    pub outcomes: Vec<Outcome>,
    pub behavior: MockBehavior,
    pub started: Arc<Notify>,
    calls: AtomicUsize,
}

impl MockContentIndexer {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes,
            behavior: MockBehavior::Return,
            started: Arc::new(Notify::new()),
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentIndexer for MockContentIndexer {
    async fn run(&self, cancellation: &CancellationToken) -> IndexingResult<Vec<Outcome>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        behave(self.behavior.for_call(call), cancellation, self.outcomes.clone()).await
    }
}

/// One call to [`MockJournalReporter::report_run`]
#[derive(Debug, Clone)]
pub struct JournalSubmission {
    pub run_id: RunId,
    pub outcomes: Vec<Outcome>,
}

/// Mock journal recording every submission
///
/// The job never hands the journal a token, so the wait-for-cancellation
/// behaviors observe [`MockJournalReporter::cancellation`], which tests cancel
/// themselves.
pub struct MockJournalReporter {
    pub entries: usize,
    pub behavior: MockBehavior,
    pub started: Arc<Notify>,
    pub cancellation: CancellationToken,
    submissions: Mutex<Vec<JournalSubmission>>,
}

impl MockJournalReporter {
    /// Journal that reports `entries` written entries
    pub fn new(entries: usize) -> Self {
        Self {
            entries,
            behavior: MockBehavior::Return,
            started: Arc::new(Notify::new()),
            cancellation: CancellationToken::new(),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_error() -> Self {
        Self::new(0).with_behavior(MockBehavior::Fail)
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn submissions(&self) -> Vec<JournalSubmission> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl JournalReporter for MockJournalReporter {
    async fn report_run(&self, run_id: &RunId, outcomes: &[Outcome]) -> IndexingResult<usize> {
        let call = {
            let mut submissions = self
                .submissions
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            submissions.push(JournalSubmission {
                run_id: run_id.clone(),
                outcomes: outcomes.to_vec(),
            });
            submissions.len().saturating_sub(1)
        };
        self.started.notify_one();
        behave(self.behavior.for_call(call), &self.cancellation, self.entries).await
    }
}

/// Notifier that keeps every status update
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StatusNotifier for RecordingNotifier {
    fn on_status_changed(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
