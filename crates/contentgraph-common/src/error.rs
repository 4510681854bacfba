//! Common error handling utilities and patterns
//!
//! Crate-specific error enums implement [`CommonError`] so helpers can build
//! the shared variants without knowing the concrete type.

/// Common error variants that appear across multiple crates
pub trait CommonError: std::error::Error + Send + Sync + 'static {
    /// Create an I/O error variant
    fn io_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    /// Create a configuration error variant
    fn config_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    /// Create a generic "other" error variant
    fn other_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;
}
