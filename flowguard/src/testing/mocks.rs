//! Mock guards and service behaviours for testing.

use crate::engine::Execution;
use crate::errors::FlowguardError;
use crate::guards::Guard;
use parking_lot::Mutex;

/// A guard that records how often each check ran.
#[derive(Debug, Default)]
pub struct RecordingGuard {
    preconditions: Mutex<usize>,
    postconditions: Mutex<usize>,
}

impl RecordingGuard {
    /// Creates a new recording guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of precondition checks run.
    #[must_use]
    pub fn precondition_calls(&self) -> usize {
        *self.preconditions.lock()
    }

    /// Returns the number of postcondition checks run.
    #[must_use]
    pub fn postcondition_calls(&self) -> usize {
        *self.postconditions.lock()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        *self.preconditions.lock() = 0;
        *self.postconditions.lock() = 0;
    }
}

impl Guard for RecordingGuard {
    fn check_preconditions(&self, _execution: &dyn Execution) -> Result<(), FlowguardError> {
        *self.preconditions.lock() += 1;
        Ok(())
    }

    fn check_postconditions(&self, _execution: &dyn Execution) -> Result<(), FlowguardError> {
        *self.postconditions.lock() += 1;
        Ok(())
    }
}

/// A business error raised by a service behaviour.
///
/// Carries an error code the process definition can route to a handler node;
/// an unrouted code fails the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// The error code.
    pub code: String,
    /// Optional human-readable detail.
    pub message: String,
}

impl ServiceError {
    /// Creates a service error with the given code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: String::new(),
        }
    }

    /// Attaches a detail message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// The behaviour bound to a service task, registered on the engine double
/// under a name.
///
/// This is the seam for mocking external collaborators: scenario code
/// registers a scripted behaviour, and `reset_mocks` clears the registry
/// between scenarios.
pub trait ServiceBehavior: Send + Sync {
    /// Runs the behaviour against the service task's execution.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] to signal a business error by code.
    fn execute(&self, execution: &dyn Execution) -> Result<(), ServiceError>;
}

impl<F> ServiceBehavior for F
where
    F: Fn(&dyn Execution) -> Result<(), ServiceError> + Send + Sync,
{
    fn execute(&self, execution: &dyn Execution) -> Result<(), ServiceError> {
        self(execution)
    }
}
