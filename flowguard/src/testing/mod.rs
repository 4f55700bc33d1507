//! Test tooling: execution fixtures, mock guards and behaviours, an
//! in-memory engine double, and process-state assertions.
//!
//! Everything here is exported for downstream test suites; the library
//! itself has no runtime dependency on it.

mod assertions;
mod definition;
mod engine;
mod fixtures;
mod mocks;

#[cfg(test)]
mod scenario_tests;

pub use assertions::{assert_has_passed, assert_process_ended, assert_waiting_at};
pub use definition::{NodeKind, ProcessDefinition, ProcessDefinitionBuilder};
pub use engine::{InMemoryEngine, InstanceStatus};
pub use fixtures::{TestExecution, TestTask};
pub use mocks::{RecordingGuard, ServiceBehavior, ServiceError};

use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Installs a tracing subscriber for test output, once per process.
///
/// Filtering follows `RUST_LOG`; repeated calls are no-ops.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
