//! Outcome of indexing one unit and aggregation over a run
//!
//! Phases report expected failures as data, never as errors, so the job can
//! aggregate every unit of a run before deciding its verdict.

use serde::{Deserialize, Serialize};

/// Status of one indexing unit
///
/// Ordered by severity: `Error` dominates `Warning` dominates `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Warning,
    Error,
}

impl OutcomeStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of indexing one unit (a content type, a content batch)
///
/// Constructed through [`Outcome::success`], [`Outcome::warning`] and
/// [`Outcome::error`] so Warning and Error always carry a message;
/// deserialization enforces the same rule. The message is raw backend text;
/// encode it before display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOutcome")]
pub struct Outcome {
    status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
}

impl Outcome {
    pub const fn success() -> Self {
        Self {
            status: OutcomeStatus::Success,
            message: None,
            unit: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Warning,
            message: Some(message.into()),
            unit: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            message: Some(message.into()),
            unit: None,
        }
    }

    /// Label the unit this outcome belongs to (used in logs only)
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub const fn status(&self) -> OutcomeStatus {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.status == OutcomeStatus::Error
    }

    pub fn is_warning(&self) -> bool {
        self.status == OutcomeStatus::Warning
    }
}

/// Wire shape of [`Outcome`] before the message rule is checked
#[derive(Deserialize)]
struct RawOutcome {
    status: OutcomeStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    unit: Option<String>,
}

impl TryFrom<RawOutcome> for Outcome {
    type Error = String;

    fn try_from(raw: RawOutcome) -> Result<Self, Self::Error> {
        let missing = raw.message.as_deref().is_none_or(|m| m.trim().is_empty());
        if raw.status != OutcomeStatus::Success && missing {
            return Err(format!("{} outcome requires a message", raw.status));
        }
        Ok(Self {
            status: raw.status,
            message: raw.message,
            unit: raw.unit,
        })
    }
}

/// Counts per status over a sequence of outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub succeeded: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl OutcomeSummary {
    pub fn from_outcomes(outcomes: &[Outcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                let counter = match outcome.status {
                    OutcomeStatus::Success => &mut summary.succeeded,
                    OutcomeStatus::Warning => &mut summary.warnings,
                    OutcomeStatus::Error => &mut summary.errors,
                };
                *counter = counter.saturating_add(1);
                summary
            })
    }

    pub const fn total(&self) -> usize {
        self.succeeded
            .saturating_add(self.warnings)
            .saturating_add(self.errors)
    }

    /// Most severe status seen; `Success` for an empty run
    pub const fn worst(&self) -> OutcomeStatus {
        if self.errors > 0 {
            OutcomeStatus::Error
        } else if self.warnings > 0 {
            OutcomeStatus::Warning
        } else {
            OutcomeStatus::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_severity_ordering() {
        assert!(OutcomeStatus::Error > OutcomeStatus::Warning);
        assert!(OutcomeStatus::Warning > OutcomeStatus::Success);
        assert_eq!(
            [OutcomeStatus::Warning, OutcomeStatus::Error, OutcomeStatus::Success]
                .into_iter()
                .max(),
            Some(OutcomeStatus::Error)
        );
    }

    #[test]
    fn test_constructors_attach_messages() {
        assert_eq!(Outcome::success().message(), None);
        assert_eq!(Outcome::warning("slow item").message(), Some("slow item"));
        let error = Outcome::error("bad item").with_unit("ArticlePage");
        assert!(error.is_error());
        assert_eq!(error.unit(), Some("ArticlePage"));
    }

    #[test]
    fn test_summary_counts_and_worst() {
        let outcomes = vec![
            Outcome::success(),
            Outcome::warning("slow item"),
            Outcome::success(),
            Outcome::error("bad item"),
        ];
        let summary = OutcomeSummary::from_outcomes(&outcomes);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.worst(), OutcomeStatus::Error);
    }

    #[test]
    fn test_empty_summary_is_success() {
        let summary = OutcomeSummary::from_outcomes(&[]);
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.worst(), OutcomeStatus::Success);
    }

    #[test]
    fn test_outcome_serialization_shape() {
        let json = serde_json::to_value(Outcome::warning("slow item")).unwrap();
        assert_eq!(json["status"], "warning");
        assert_eq!(json["message"], "slow item");
        assert!(json.get("unit").is_none());
    }

    #[test]
    fn test_deserialization_requires_message_for_error_and_warning() {
        assert!(serde_json::from_str::<Outcome>(r#"{"status":"error"}"#).is_err());
        assert!(serde_json::from_str::<Outcome>(r#"{"status":"warning","message":" "}"#).is_err());

        let success: Outcome = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert_eq!(success, Outcome::success());

        let error: Outcome =
            serde_json::from_str(r#"{"status":"error","message":"bad item","unit":"News"}"#)
                .unwrap();
        assert_eq!(error, Outcome::error("bad item").with_unit("News"));
    }
}
