//! Global initialization utilities for the application

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the application environment
///
/// Loads environment variables from a `.env` file (current directory or any
/// parent) so configuration loaded afterwards sees them.
///
/// Safe to call multiple times - will only run once
pub fn initialize_environment() {
    INIT.call_once(|| {
        // A missing .env file is the normal case in deployed environments
        dotenvy::dotenv().ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_environment_is_repeatable() {
        initialize_environment();
        initialize_environment();
        assert!(INIT.is_completed());
    }
}
