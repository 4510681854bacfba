//! Centralized configuration management for the content graph synchronization job
//!
//! Configuration follows a simple hierarchy:
//! 1. Safe defaults (defined as constants)
//! 2. `.env` file and environment variable overrides
//! 3. Runtime validation

pub mod error;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use validation::Validate;

// =============================================================================
// SAFE DEFAULTS - Work for any environment (dev, staging, prod, test)
// =============================================================================

// Job Configuration
const DEFAULT_JOB_ROOT_PATH: &str = "EPiServer"; // Protected module root of the CMS
const DEFAULT_JOB_DISPLAY_NAME: &str = "Content Graph synchronization job";
const DEFAULT_JOB_DESCRIPTION: &str =
    "Synchronizes all content types and content into Content Graph";
const DEFAULT_JOB_INTERVAL_LENGTH: u32 = 1;
const DEFAULT_JOB_INTERVAL_TYPE: IntervalType = IntervalType::Weeks;
const MAX_JOB_INTERVAL_LENGTH: u64 = 10_000;

// Telemetry Configuration
const DEFAULT_TRACING_LEVEL: &str = "info";
const DEFAULT_JSON_LOGS: bool = false;

/// Core configuration for the synchronization job
///
/// All settings have safe defaults and can be overridden via environment variables.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ApplicationConfig {
    /// Scheduled job configuration
    pub job: JobConfig,

    /// Logging configuration
    pub telemetry: TelemetryConfig,
}

/// Unit of the schedule interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalType {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl IntervalType {
    /// Approximate length of one interval unit in seconds (a month counts 30 days)
    pub const fn seconds(self) -> u64 {
        match self {
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Days => 24 * 60 * 60,
            Self::Weeks => 7 * 24 * 60 * 60,
            Self::Months => 30 * 24 * 60 * 60,
        }
    }
}

impl std::fmt::Display for IntervalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for IntervalType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minute" | "minutes" => Ok(Self::Minutes),
            "hour" | "hours" => Ok(Self::Hours),
            "day" | "days" => Ok(Self::Days),
            "week" | "weeks" => Ok(Self::Weeks),
            "month" | "months" => Ok(Self::Months),
            _ => Err(ConfigError::Generic {
                message: format!("Invalid interval type: {s}"),
            }),
        }
    }
}

/// Scheduled job configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JobConfig {
    /// Root path of the protected CMS module, prefixed to the journal link
    /// (e.g. "EPiServer" gives "/EPiServer/contentgraph/journal/status?jobId=...")
    pub root_path: String,

    /// Name shown by the scheduler host
    pub display_name: String,

    /// Description shown by the scheduler host
    pub description: String,

    /// Number of `interval_type` units between scheduled runs
    pub interval_length: u32,

    /// Unit of `interval_length`
    pub interval_type: IntervalType,
}

impl JobConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let root_path = std::env::var("CONTENTGRAPH_JOB_ROOT_PATH")
            .unwrap_or_else(|_| DEFAULT_JOB_ROOT_PATH.to_string());

        let display_name = std::env::var("CONTENTGRAPH_JOB_DISPLAY_NAME")
            .unwrap_or_else(|_| DEFAULT_JOB_DISPLAY_NAME.to_string());

        let description = std::env::var("CONTENTGRAPH_JOB_DESCRIPTION")
            .unwrap_or_else(|_| DEFAULT_JOB_DESCRIPTION.to_string());

        let interval_length = std::env::var("CONTENTGRAPH_JOB_INTERVAL_LENGTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_JOB_INTERVAL_LENGTH);

        let interval_type = std::env::var("CONTENTGRAPH_JOB_INTERVAL_TYPE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_JOB_INTERVAL_TYPE);

        Self {
            root_path,
            display_name,
            description,
            interval_length,
            interval_type,
        }
    }

    /// Time between two scheduled runs
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            u64::from(self.interval_length).saturating_mul(self.interval_type.seconds()),
        )
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            root_path: DEFAULT_JOB_ROOT_PATH.to_string(),
            display_name: DEFAULT_JOB_DISPLAY_NAME.to_string(),
            description: DEFAULT_JOB_DESCRIPTION.to_string(),
            interval_length: DEFAULT_JOB_INTERVAL_LENGTH,
            interval_type: DEFAULT_JOB_INTERVAL_TYPE,
        }
    }
}

impl validation::Validate for JobConfig {
    fn validate(&self) -> ConfigResult<()> {
        validation::validate_path_prefix(&self.root_path, "root_path")?;
        validation::validate_non_empty(&self.display_name, "display_name")?;
        validation::validate_range(
            u64::from(self.interval_length),
            1,
            MAX_JOB_INTERVAL_LENGTH,
            "interval_length",
        )?;
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetryConfig {
    /// Tracing level (trace, debug, info, warn, error)
    pub tracing_level: String,

    /// Emit JSON formatted log lines instead of human readable ones
    pub json_logs: bool,
}

impl TelemetryConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        let tracing_level = std::env::var("CONTENTGRAPH_TELEMETRY_TRACING_LEVEL")
            .unwrap_or_else(|_| DEFAULT_TRACING_LEVEL.to_string());

        let json_logs = std::env::var("CONTENTGRAPH_TELEMETRY_JSON_LOGS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_JSON_LOGS);

        Self {
            tracing_level,
            json_logs,
        }
    }

    /// Install the global tracing subscriber described by this configuration
    ///
    /// Returns `false` if a subscriber was already installed.
    pub fn init_tracing(&self) -> bool {
        contentgraph_common::init_tracing(&self.tracing_level, self.json_logs)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tracing_level: DEFAULT_TRACING_LEVEL.to_string(),
            json_logs: DEFAULT_JSON_LOGS,
        }
    }
}

impl validation::Validate for TelemetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.tracing_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Generic {
                message: format!("Invalid tracing level: {}", self.tracing_level),
            }),
        }
    }
}

impl ApplicationConfig {
    /// Load configuration from environment variables with safe defaults
    pub fn from_env() -> Self {
        Self {
            job: JobConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }

    /// Load `.env`, read the environment and validate the result
    ///
    /// # Errors
    /// Returns validation errors if the environment holds invalid values
    pub fn load() -> ConfigResult<Self> {
        contentgraph_common::initialize_environment();
        let config = Self::from_env();
        config.validate()?;
        tracing::debug!(
            root_path = %config.job.root_path,
            interval_length = config.job.interval_length,
            interval_type = %config.job.interval_type,
            "Loaded job configuration"
        );
        Ok(config)
    }
}

impl validation::Validate for ApplicationConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.job.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}
