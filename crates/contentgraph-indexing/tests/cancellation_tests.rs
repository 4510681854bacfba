//! Integration tests for stopping and disposing the content indexing job

// Relax strict lints for test code
#![allow(clippy::unwrap_used)] // Tests can use unwrap for assertions
#![allow(clippy::expect_used)] // Tests can use expect for setup
#![allow(clippy::panic)] // Tests can panic on failure

#[path = "test_utils.rs"]
mod test_utils;

use contentgraph_indexing::test_utils::{
    MockBehavior, MockContentIndexer, MockJournalReporter, MockSchemaIndexer,
};
use contentgraph_indexing::{IndexingError, JobRunState, Outcome, STOPPED_MESSAGE};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{content_run, harness};

const RUN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_stop_without_active_run_does_not_affect_later_runs() {
    let h = content_run(vec![Outcome::success()], 0);

    let first = h.job.execute().await.unwrap();
    assert_eq!(first.state, JobRunState::Completed);

    assert!(!h.job.stop(), "nothing to stop between runs");
    assert!(!h.job.is_running());

    for run in 2..=4 {
        let report = h.job.execute().await.unwrap();
        assert_eq!(report.state, JobRunState::Completed);
        assert_eq!(h.content.calls(), run);
    }
    assert!(
        !h.notifier
            .messages()
            .contains(&"Stop of job was requested".to_string())
    );
}

#[tokio::test]
async fn test_stop_during_schema_phase() {
    let h = harness(
        MockSchemaIndexer::succeeding().with_behavior(MockBehavior::WaitForCancellation),
        MockContentIndexer::new(vec![Outcome::success()]),
        MockJournalReporter::new(1),
    );

    let run = h.job.start();
    h.schema.started.notified().await;
    assert!(h.job.stop());

    let report = tokio::time::timeout(RUN_TIMEOUT, run)
        .await
        .expect("run unwinds after stop")
        .unwrap()
        .unwrap();

    assert_eq!(report.state, JobRunState::Stopped);
    assert_eq!(h.content.calls(), 0);
}

#[tokio::test]
async fn test_stop_during_content_phase_is_not_a_fault() {
    let h = harness(
        MockSchemaIndexer::succeeding(),
        MockContentIndexer::new(vec![Outcome::success()])
            .with_behavior(MockBehavior::WaitForCancellation),
        MockJournalReporter::new(1),
    );

    let run = h.job.start();
    h.content.started.notified().await;
    assert!(h.job.stop());

    let report = tokio::time::timeout(RUN_TIMEOUT, run)
        .await
        .unwrap()
        .unwrap()
        .expect("stop is reported, not raised");

    assert_eq!(report.message, STOPPED_MESSAGE);
    assert!(
        h.journal.submissions().is_empty(),
        "a stopped run never reaches the journal"
    );
}

#[tokio::test]
async fn test_stop_unwinds_phase_that_ignores_token() {
    let h = harness(
        MockSchemaIndexer::succeeding(),
        MockContentIndexer::new(Vec::new()).with_behavior(MockBehavior::Hang),
        MockJournalReporter::new(0),
    );

    let run = h.job.start();
    h.content.started.notified().await;
    h.job.stop();

    let report = tokio::time::timeout(RUN_TIMEOUT, run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(report.state, JobRunState::Stopped);
}

#[tokio::test]
async fn test_stop_while_waiting_for_journal() {
    let h = harness(
        MockSchemaIndexer::succeeding(),
        MockContentIndexer::new(vec![Outcome::warning("slow item")]),
        MockJournalReporter::new(1).with_behavior(MockBehavior::Hang),
    );

    let run = h.job.start();
    h.journal.started.notified().await;
    h.job.stop();

    let report = tokio::time::timeout(RUN_TIMEOUT, run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    assert_eq!(report.state, JobRunState::Stopped);
    assert!(!report.message.contains("slow item"));
    assert_eq!(h.journal.submissions().len(), 1);
}

#[tokio::test]
async fn test_stop_is_idempotent_and_scoped_to_the_run() {
    let h = harness(
        MockSchemaIndexer::succeeding(),
        MockContentIndexer::new(vec![Outcome::success()])
            .with_behavior(MockBehavior::WaitForCancellationOnce),
        MockJournalReporter::new(0),
    );

    let run = h.job.start();
    h.content.started.notified().await;
    assert!(h.job.is_running());
    assert!(!h.job.is_stop_requested());

    assert!(h.job.stop());
    assert!(!h.job.stop(), "second stop is a no-op");

    let stopped = tokio::time::timeout(RUN_TIMEOUT, run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(stopped.state, JobRunState::Stopped);
    assert!(!h.job.is_running());
    assert!(!h.job.is_stop_requested());

    let stop_notices = h
        .notifier
        .messages()
        .into_iter()
        .filter(|m| m == "Stop of job was requested")
        .count();
    assert_eq!(stop_notices, 1);

    let next = h.job.execute().await.unwrap();
    assert_eq!(next.state, JobRunState::Completed);
    assert_eq!(h.content.calls(), 2);
}

#[tokio::test]
async fn test_journal_reporting_cancellation_stops_run() {
    let h = harness(
        MockSchemaIndexer::succeeding(),
        MockContentIndexer::new(vec![Outcome::success()]),
        MockJournalReporter::new(1).with_behavior(MockBehavior::WaitForCancellation),
    );

    let run = h.job.start();
    h.journal.started.notified().await;
    h.journal.cancellation.cancel();

    let report = tokio::time::timeout(RUN_TIMEOUT, run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(report.state, JobRunState::Stopped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_from_another_thread() {
    let h = harness(
        MockSchemaIndexer::succeeding(),
        MockContentIndexer::new(Vec::new()).with_behavior(MockBehavior::WaitForCancellation),
        MockJournalReporter::new(0),
    );

    let run = h.job.start();
    h.content.started.notified().await;

    let job = Arc::clone(&h.job);
    let stopped = std::thread::spawn(move || job.stop()).join().unwrap();
    assert!(stopped);

    let report = tokio::time::timeout(RUN_TIMEOUT, run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(report.state, JobRunState::Stopped);
}

#[tokio::test]
async fn test_dispose_is_idempotent() {
    let h = content_run(vec![Outcome::success()], 0);

    assert!(h.job.dispose());
    assert!(!h.job.dispose());
    assert!(!h.job.stop(), "nothing to cancel after dispose");

    let err = h.job.execute().await.unwrap_err();
    assert!(matches!(err, IndexingError::Disposed));
}

#[tokio::test]
async fn test_dispose_unwinds_active_run() {
    let h = harness(
        MockSchemaIndexer::succeeding(),
        MockContentIndexer::new(Vec::new()).with_behavior(MockBehavior::Hang),
        MockJournalReporter::new(0),
    );

    let run = h.job.start();
    h.content.started.notified().await;
    assert!(h.job.dispose());

    let report = tokio::time::timeout(RUN_TIMEOUT, run)
        .await
        .expect("dispose cancels the run in flight")
        .unwrap()
        .unwrap();
    assert_eq!(report.state, JobRunState::Stopped);
    assert!(!h.job.is_running());
    assert!(matches!(
        h.job.execute().await,
        Err(IndexingError::Disposed)
    ));
}
