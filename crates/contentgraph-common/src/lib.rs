//! Common utilities and patterns shared across the content graph crates
//!
//! This crate provides shared functionality to reduce duplication across
//! the configuration and indexing components.

pub mod error;
pub mod init;
pub mod sanitizer;
pub mod tracing;

pub use error::CommonError;
pub use init::initialize_environment;
pub use sanitizer::{encode_markup, encode_optional_markup};
pub use tracing::init_tracing;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one execution of the synchronization job
///
/// Correlates the schema phase, the content phase and the journal entry
/// written for the same run. Uses UUID v4 so ids never collide across hosts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a new run ID using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RunId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }

    #[test]
    fn test_run_id_parses_its_display_form() {
        let id = RunId::new();
        let parsed: RunId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<RunId>().is_err());
    }

    #[test]
    fn test_run_id_serializes_as_plain_uuid() {
        let id = RunId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
