//! Jasmin code generator for the VC teaching language.
//!
//! A checked syntax tree ([`ast`]) goes in; the assembly of one class
//! ([`jvm::ClassCode`]) comes out. See [`api`] for the entry points.

pub mod api;
pub mod ast;
pub mod compiler;
pub mod jvm;
pub mod stdlib;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_nested_loops() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
