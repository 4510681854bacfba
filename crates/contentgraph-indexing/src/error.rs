//! Structured error types for the indexing crate
//!
//! Two families live here. Run-level failures (`SchemaIndexingFailure`,
//! `ContentIndexingFailure`) and `Cancelled` are expected outcomes of a run and
//! are turned into a [`crate::JobRunReport`] by the job. Everything else is an
//! unexpected fault that propagates to the scheduler host.

use contentgraph_common::{CommonError, encode_markup};
use contentgraph_config::ConfigError;
use thiserror::Error;

/// Indexing error enum
#[derive(Error, Debug)]
pub enum IndexingError {
    // ========== Run-level failures ==========
    /// The schema phase reported an Error outcome; content indexing was skipped.
    /// The message is already markup-encoded.
    #[error("There was an issue while indexing content types: {message}.")]
    SchemaIndexingFailure { message: String },

    /// At least one content unit reported an Error outcome.
    /// Messages are already markup-encoded, in emission order.
    #[error(
        "There was an issue while indexing content: {}. (see log for more information)",
        .messages.join(", ")
    )]
    ContentIndexingFailure { messages: Vec<String> },

    /// Cooperative cancellation was observed
    #[error("Indexing was cancelled")]
    Cancelled,

    // ========== Unexpected faults ==========
    #[error("Content indexing job has been disposed")]
    Disposed,

    #[error("Cannot block on a run inside a current-thread runtime; await execute instead")]
    BlockingInRuntime,

    #[error("Index backend error: {0}")]
    Backend(anyhow::Error),

    #[error("Journal submission task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Other error: {0}")]
    Other(String),
}

impl IndexingError {
    /// Build a schema failure from the raw (unencoded) backend message
    pub fn schema_failure(raw_message: Option<&str>) -> Self {
        Self::SchemaIndexingFailure {
            message: contentgraph_common::encode_optional_markup(raw_message),
        }
    }

    /// Build a content failure from raw (unencoded) backend messages
    pub fn content_failure<'a>(raw_messages: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self::ContentIndexingFailure {
            messages: raw_messages
                .into_iter()
                .map(|m| m.map(encode_markup).unwrap_or_default())
                .collect(),
        }
    }

    /// Whether this error is a run verdict rather than a fault
    pub const fn is_run_failure(&self) -> bool {
        matches!(
            self,
            Self::SchemaIndexingFailure { .. } | Self::ContentIndexingFailure { .. }
        )
    }

    /// Whether this error signals cooperative cancellation
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl CommonError for IndexingError {
    fn io_error(msg: impl Into<String>) -> Self {
        Self::Io {
            message: msg.into(),
        }
    }

    fn config_error(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    fn other_error(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<std::io::Error> for IndexingError {
    fn from(e: std::io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<anyhow::Error> for IndexingError {
    fn from(e: anyhow::Error) -> Self {
        Self::Backend(e)
    }
}

impl From<ConfigError> for IndexingError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

pub type IndexingResult<T> = std::result::Result<T, IndexingError>;
