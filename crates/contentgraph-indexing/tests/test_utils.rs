//! Shared helpers for the job integration tests
//!
//! Functions are only compiled into test binaries that actually use them.

use contentgraph_config::JobConfig;
use contentgraph_indexing::test_utils::{
    MockContentIndexer, MockJournalReporter, MockSchemaIndexer, RecordingNotifier,
};
use contentgraph_indexing::{ContentIndexingJob, Outcome};
use std::sync::Arc;

/// Collaborators wired into a job, kept so tests can inspect them afterwards
pub struct Harness {
    pub job: Arc<ContentIndexingJob>,
    pub schema: Arc<MockSchemaIndexer>,
    pub content: Arc<MockContentIndexer>,
    pub journal: Arc<MockJournalReporter>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn init_test_tracing() {
    contentgraph_common::init_tracing("debug", false);
}

pub fn test_job_config() -> JobConfig {
    JobConfig {
        root_path: "EPiServer".to_string(),
        ..JobConfig::default()
    }
}

/// Wire a job from fully configured mocks
pub fn harness(
    schema: MockSchemaIndexer,
    content: MockContentIndexer,
    journal: MockJournalReporter,
) -> Harness {
    init_test_tracing();

    let schema = Arc::new(schema);
    let content = Arc::new(content);
    let journal = Arc::new(journal);
    let notifier = Arc::new(RecordingNotifier::default());

    let job = ContentIndexingJob::new(
        Arc::clone(&schema) as _,
        Arc::clone(&content) as _,
        Arc::clone(&journal) as _,
        &test_job_config(),
    )
    .with_notifier(Arc::clone(&notifier) as _);

    Harness {
        job: Arc::new(job),
        schema,
        content,
        journal,
        notifier,
    }
}

/// Job whose schema phase succeeds and whose content phase returns `outcomes`
#[allow(dead_code)]
pub fn content_run(outcomes: Vec<Outcome>, journal_entries: usize) -> Harness {
    harness(
        MockSchemaIndexer::succeeding(),
        MockContentIndexer::new(outcomes),
        MockJournalReporter::new(journal_entries),
    )
}
