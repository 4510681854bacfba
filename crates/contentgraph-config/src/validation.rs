//! Configuration validation framework

use crate::{ConfigError, ConfigResult};
use regex::Regex;

/// Get the module root path regex - returns None if regex compilation fails
///
/// Accepts slash-separated segments of URL-safe characters, optionally
/// wrapped in leading/trailing slashes. The empty string is accepted too.
fn get_root_path_regex() -> Option<&'static Regex> {
    static ROOT_PATH_REGEX: std::sync::OnceLock<Option<Regex>> = std::sync::OnceLock::new();
    ROOT_PATH_REGEX
        .get_or_init(|| Regex::new(r"^/?([A-Za-z0-9._~-]+/)*[A-Za-z0-9._~-]*/?$").ok())
        .as_ref()
}

/// Trait for validating configuration values
pub trait Validate {
    /// Validate this configuration object
    ///
    /// # Errors
    /// Returns validation errors if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Validate a root-relative path prefix used to build links
///
/// # Errors
/// Returns `ConfigError::InvalidPath` if the prefix contains whitespace,
/// query/fragment markers, empty segments or other characters that would
/// break the generated link
pub fn validate_path_prefix(path: &str, field_name: &str) -> ConfigResult<()> {
    let invalid = || ConfigError::InvalidPath {
        field: field_name.to_string(),
        path: path.to_string(),
    };

    get_root_path_regex().map_or_else(
        || {
            // If regex compilation failed, do basic validation
            if path.chars().any(|c| c.is_whitespace() || matches!(c, '?' | '#')) {
                Err(invalid())
            } else {
                Ok(())
            }
        },
        |regex| {
            if regex.is_match(path) {
                Ok(())
            } else {
                Err(invalid())
            }
        },
    )
}

/// Validate a value is within a range
///
/// # Errors
/// Returns `ConfigError::OutOfRange` if value is outside the specified range
pub fn validate_range(value: u64, min: u64, max: u64, field_name: &str) -> ConfigResult<()> {
    if value < min || value > max {
        Err(ConfigError::OutOfRange {
            field: field_name.to_string(),
            value,
            min,
            max,
        })
    } else {
        Ok(())
    }
}

/// Validate a string is not empty
///
/// # Errors
/// Returns `ConfigError::MissingField` if the string is empty or whitespace-only
pub fn validate_non_empty(value: &str, field_name: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField {
            field: field_name.to_string(),
        })
    } else {
        Ok(())
    }
}
