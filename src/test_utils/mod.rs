//! Test utilities for itdgen
//!
//! This module provides helpers shared by unit tests, integration tests and doc
//! examples:
//! - [`init_test_logging`] - one-time tracing setup that respects `RUST_LOG`
//! - [`fixtures`] - a counting provider, sample Java types and sample project files
//!
//! # Example
//!
//! ```rust,no_run
//! use itdgen::metadata::MetadataService;
//! use itdgen::test_utils::fixtures::{CountingProvider, mid};
//! use std::sync::Arc;
//!
//! let provider = CountingProvider::new("A", &[]);
//! let count = provider.counter();
//! let mut service = MetadataService::new();
//! service.register_provider(Arc::new(provider)).unwrap();
//! service.get(&mid("A", "com.example.Customer")).unwrap();
//! assert_eq!(count.get(), 1);
//! ```

pub mod fixtures;

pub use fixtures::{CountingProvider, ProjectFixture, mid};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used; otherwise
/// `RUST_LOG` is honoured if present and logging stays off if not.
///
/// ```bash
/// RUST_LOG=itdgen=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
