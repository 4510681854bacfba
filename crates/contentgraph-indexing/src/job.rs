//! Scheduled content graph synchronization job
//!
//! The job drives one run through two sequential phases:
//! 1. **Schema phase**: content-type definitions. An Error outcome stops the
//!    run before any content is touched.
//! 2. **Content phase**: content instances, one outcome per unit. Its outcomes
//!    are submitted to the journal on a separate task while the job aggregates
//!    them, and the job joins that task before composing the final message.
//!
//! # Cancellation
//!
//! The job owns a shutdown [`CancellationToken`]. Each run takes a child of it
//! and registers that child as the active run; [`ContentIndexingJob::stop`]
//! cancels the active run only, so a stop never outlives the run it was meant
//! for. [`ContentIndexingJob::dispose`] cancels the shutdown token, which
//! unwinds whatever run is still in flight. Each suspension point races the
//! run token, so a run unwinds even if a phase never polls it.

use crate::outcome::{Outcome, OutcomeSummary};
use crate::phases::{ContentIndexer, JournalReporter, SchemaIndexer};
use crate::report::{JobRunReport, JournalLink};
use crate::status::{StatusNotifier, TracingStatusNotifier};
use crate::{IndexingError, IndexingResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contentgraph_common::RunId;
use contentgraph_config::{ApplicationConfig, IntervalType, JobConfig};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Scheduling metadata the host shows and schedules by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    pub display_name: String,
    pub description: String,
    pub interval_length: u32,
    pub interval_type: IntervalType,
    /// Whether the host may call `stop` on a running job
    pub stoppable: bool,
}

impl From<&JobConfig> for JobDescriptor {
    fn from(config: &JobConfig) -> Self {
        Self {
            display_name: config.display_name.clone(),
            description: config.description.clone(),
            interval_length: config.interval_length,
            interval_type: config.interval_type,
            stoppable: true,
        }
    }
}

/// Contract between a scheduler host and a job it runs
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn descriptor(&self) -> &JobDescriptor;

    /// Run one cycle and return its report
    ///
    /// # Errors
    /// Returns unexpected faults only; run failures and stops are reports
    async fn execute(&self) -> IndexingResult<JobRunReport>;

    /// Request cancellation of the active run; returns whether this call did
    fn stop(&self) -> bool;
}

/// Synchronizes content types, then content, into the content graph
pub struct ContentIndexingJob {
    schema_indexer: Arc<dyn SchemaIndexer>,
    content_indexer: Arc<dyn ContentIndexer>,
    journal: Arc<dyn JournalReporter>,
    notifier: Arc<dyn StatusNotifier>,
    descriptor: JobDescriptor,
    root_path: String,
    lifecycle: Mutex<Lifecycle>,
}

/// Cancellation handles shared by `stop`, `dispose` and the active run
#[derive(Debug)]
struct Lifecycle {
    // None once disposed
    shutdown: Option<CancellationToken>,
    active: Option<(RunId, CancellationToken)>,
}

/// Registration of the active run; cleared when the run ends or is dropped
struct ActiveRun<'a> {
    lifecycle: &'a Mutex<Lifecycle>,
    run_id: RunId,
    token: CancellationToken,
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        let mut lifecycle = self
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if lifecycle
            .active
            .as_ref()
            .is_some_and(|(run_id, _)| *run_id == self.run_id)
        {
            lifecycle.active = None;
        }
    }
}

impl ContentIndexingJob {
    /// Create a job with injected phases and journal
    pub fn new(
        schema_indexer: Arc<dyn SchemaIndexer>,
        content_indexer: Arc<dyn ContentIndexer>,
        journal: Arc<dyn JournalReporter>,
        config: &JobConfig,
    ) -> Self {
        Self {
            schema_indexer,
            content_indexer,
            journal,
            notifier: Arc::new(TracingStatusNotifier),
            descriptor: JobDescriptor::from(config),
            root_path: config.root_path.clone(),
            lifecycle: Mutex::new(Lifecycle {
                shutdown: Some(CancellationToken::new()),
                active: None,
            }),
        }
    }

    /// Create a job configured from `.env` and the process environment
    ///
    /// # Errors
    /// Returns `IndexingError::Configuration` if the environment holds invalid values
    pub fn from_environment(
        schema_indexer: Arc<dyn SchemaIndexer>,
        content_indexer: Arc<dyn ContentIndexer>,
        journal: Arc<dyn JournalReporter>,
    ) -> IndexingResult<Self> {
        let config = ApplicationConfig::load()?;
        Ok(Self::new(
            schema_indexer,
            content_indexer,
            journal,
            &config.job,
        ))
    }

    /// Replace the default tracing notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn StatusNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub const fn descriptor(&self) -> &JobDescriptor {
        &self.descriptor
    }

    /// Spawn a run on the current tokio runtime
    pub fn start(self: &Arc<Self>) -> tokio::task::JoinHandle<IndexingResult<JobRunReport>> {
        let job = Arc::clone(self);
        tokio::spawn(async move { job.execute().await })
    }

    /// Request cancellation of the active run
    ///
    /// Only the first call during a run cancels it. Calls with no run active,
    /// repeated calls and calls after [`dispose`](Self::dispose) return
    /// `false` and leave later runs untouched.
    pub fn stop(&self) -> bool {
        let lifecycle = self.lock_lifecycle();
        let Some((run_id, token)) = lifecycle.active.as_ref() else {
            debug!("Stop requested with no active run");
            return false;
        };
        if token.is_cancelled() {
            return false;
        }
        token.cancel();
        let run_id = run_id.clone();
        drop(lifecycle);

        info!(run_id = %run_id, "Stop requested for content indexing job");
        self.notifier.on_status_changed("Stop of job was requested");
        true
    }

    /// Whether the active run has been asked to stop
    pub fn is_stop_requested(&self) -> bool {
        self.lock_lifecycle()
            .active
            .as_ref()
            .is_some_and(|(_, token)| token.is_cancelled())
    }

    /// Whether a run is registered as active
    pub fn is_running(&self) -> bool {
        self.lock_lifecycle().active.is_some()
    }

    /// Cancel any run in flight and release the shutdown token
    ///
    /// Returns `true` on the call that released it; idempotent afterwards.
    pub fn dispose(&self) -> bool {
        let released = self.lock_lifecycle().shutdown.take();
        let Some(shutdown) = released else {
            return false;
        };
        shutdown.cancel();
        debug!("Content indexing job disposed");
        true
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_run(&self) -> IndexingResult<ActiveRun<'_>> {
        let mut lifecycle = self.lock_lifecycle();
        let token = lifecycle
            .shutdown
            .as_ref()
            .ok_or(IndexingError::Disposed)?
            .child_token();
        let run_id = RunId::new();
        if let Some((previous, _)) = lifecycle
            .active
            .replace((run_id.clone(), token.clone()))
        {
            warn!(previous_run_id = %previous, "Run started while another run is active");
        }
        drop(lifecycle);

        Ok(ActiveRun {
            lifecycle: &self.lifecycle,
            run_id,
            token,
        })
    }

    /// Run one full synchronization cycle
    ///
    /// Schema failures, content failures and stop requests come back as a
    /// report whose message is the status text for the host.
    ///
    /// # Errors
    /// Returns unexpected faults: backend errors raised by a phase or the
    /// journal, a panicked journal task, or `Disposed`
    pub async fn execute(&self) -> IndexingResult<JobRunReport> {
        let active = self.begin_run()?;
        let run_id = active.run_id.clone();
        let started_at = Utc::now();
        let span = info_span!("content_indexing_job", run_id = %run_id);

        let result = async {
            let mut run = RunState::default();
            let outcome = self.run(&run_id, &active.token, started_at, &mut run).await;
            match outcome {
                Ok(report) => Ok(report),
                Err(IndexingError::Cancelled) => {
                    info!("Content indexing job stopped");
                    Ok(JobRunReport::stopped(run_id.clone(), started_at))
                }
                Err(e) => match JobRunReport::failed(run_id.clone(), &e, run.summary, started_at) {
                    Some(report) => {
                        error!(state = report.state.as_str(), error = %e, "Content indexing job failed");
                        Ok(report)
                    }
                    None => {
                        error!(error = %e, "Content indexing job aborted by an unexpected fault");
                        Err(e)
                    }
                },
            }
        }
        .instrument(span)
        .await;

        drop(active);
        record_metrics(&result, started_at);
        result
    }

    /// Host boundary for synchronous schedulers
    ///
    /// Blocks on [`execute`](Self::execute). Outside tokio a current-thread
    /// runtime is built for the run; on a multi-thread runtime the calling
    /// worker blocks in place.
    ///
    /// # Errors
    /// Same as `execute`, plus `IndexingError::BlockingInRuntime` when called
    /// from a current-thread runtime and `IndexingError::Io` if the runtime
    /// cannot be built
    pub fn execute_blocking(&self) -> IndexingResult<JobRunReport> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.execute()))
            }
            Ok(_) => Err(IndexingError::BlockingInRuntime),
            Err(_) => {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()?;
                runtime.block_on(self.execute())
            }
        }
    }

    async fn run(
        &self,
        run_id: &RunId,
        token: &CancellationToken,
        started_at: DateTime<Utc>,
        run: &mut RunState,
    ) -> IndexingResult<JobRunReport> {
        self.notifier
            .on_status_changed("Starting execution of content type indexing");

        let schema_outcome = until_cancelled(token, self.schema_indexer.run(token)).await?;
        if schema_outcome.is_error() {
            return Err(IndexingError::schema_failure(schema_outcome.message()));
        }
        if schema_outcome.is_warning() {
            warn!(
                detail = schema_outcome.message().unwrap_or_default(),
                "Content type indexing finished with a warning"
            );
        }

        self.notifier
            .on_status_changed("Starting execution of content indexing");

        let outcomes = Arc::new(until_cancelled(token, self.content_indexer.run(token)).await?);
        let summary = OutcomeSummary::from_outcomes(&outcomes);
        run.summary = Some(summary);
        info!(
            succeeded = summary.succeeded,
            warnings = summary.warnings,
            errors = summary.errors,
            "Content indexing finished"
        );

        // The journal gets the outcomes before the verdict is decided
        let submission = {
            let journal = Arc::clone(&self.journal);
            let run_id = run_id.clone();
            let outcomes = Arc::clone(&outcomes);
            tokio::spawn(
                async move { journal.report_run(&run_id, &outcomes).await }.in_current_span(),
            )
        };

        let failure = content_failure(&outcomes);
        for outcome in outcomes.iter().filter(|o| o.is_error()) {
            warn!(
                unit = outcome.unit().unwrap_or_default(),
                detail = outcome.message().unwrap_or_default(),
                "Content unit failed to index"
            );
        }

        let journaled = until_cancelled(token, async { submission.await? }).await;

        match (failure, journaled) {
            (_, Err(IndexingError::Cancelled)) => Err(IndexingError::Cancelled),
            (Some(failure), Ok(_)) => Err(failure),
            (Some(failure), Err(e)) => {
                warn!(error = %e, "Journal submission failed for a failed run");
                Err(failure)
            }
            (None, Err(e)) => Err(e),
            (None, Ok(0)) => Ok(JobRunReport::completed(run_id.clone(), summary, started_at)),
            (None, Ok(journal_entries)) => {
                debug!(journal_entries, "Journal entries written");
                let link = JournalLink::new(&self.root_path, run_id.clone());
                Ok(JobRunReport::completed_with_details(
                    &link,
                    journal_entries,
                    &outcomes,
                    started_at,
                ))
            }
        }
    }
}

#[async_trait]
impl ScheduledJob for ContentIndexingJob {
    fn descriptor(&self) -> &JobDescriptor {
        Self::descriptor(self)
    }

    async fn execute(&self) -> IndexingResult<JobRunReport> {
        Self::execute(self).await
    }

    fn stop(&self) -> bool {
        Self::stop(self)
    }
}

impl Drop for ContentIndexingJob {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// What a run learned before it ended, kept for failure reports
#[derive(Debug, Default)]
struct RunState {
    summary: Option<OutcomeSummary>,
}

/// Await `work` unless the token fires first; cancellation is polled first
async fn until_cancelled<T>(
    token: &CancellationToken,
    work: impl Future<Output = IndexingResult<T>>,
) -> IndexingResult<T> {
    tokio::select! {
        biased;
        () = token.cancelled() => Err(IndexingError::Cancelled),
        result = work => result,
    }
}

fn content_failure(outcomes: &[Outcome]) -> Option<IndexingError> {
    let mut errors = outcomes
        .iter()
        .filter(|outcome| outcome.is_error())
        .peekable();
    errors.peek()?;
    Some(IndexingError::content_failure(
        errors.map(Outcome::message),
    ))
}

fn record_metrics(result: &IndexingResult<JobRunReport>, started_at: DateTime<Utc>) {
    let state = match result {
        Ok(report) => report.state.as_str(),
        Err(_) => "fault",
    };
    metrics::counter!("contentgraph_job_runs_total", "state" => state).increment(1);

    let seconds = Utc::now()
        .signed_duration_since(started_at)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default();
    metrics::histogram!("contentgraph_job_run_duration_seconds").record(seconds);
}
