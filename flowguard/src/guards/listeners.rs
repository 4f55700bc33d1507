//! Listener adapters binding guards to the engine's callback shapes.
//!
//! The adapters hold no logic of their own: `notify` extracts the event name
//! and execution from the callback and hands off to
//! [`dispatch`](super::dispatch).

use super::{dispatch, Guard};
use crate::engine::{Execution, ExecutionListener, TaskContext, TaskListener};
use crate::errors::FlowguardError;

/// Binds a [`Guard`] to activity start/end events.
///
/// Register the adapter as an execution listener for the activity's start
/// and end events.
#[derive(Debug)]
pub struct ActivityGuard<G> {
    guard: G,
}

impl<G: Guard> ActivityGuard<G> {
    /// Wraps a guard for activity lifecycle events.
    #[must_use]
    pub fn new(guard: G) -> Self {
        Self { guard }
    }

    /// Returns the wrapped guard.
    #[must_use]
    pub fn guard(&self) -> &G {
        &self.guard
    }
}

impl<G: Guard> ExecutionListener for ActivityGuard<G> {
    fn notify(&self, execution: &dyn Execution) -> Result<(), FlowguardError> {
        dispatch(&self.guard, execution.event_name(), execution)
    }
}

/// Binds a [`Guard`] to user-task create/complete events.
///
/// Register the adapter as a task listener for the task's create and
/// complete events.
#[derive(Debug)]
pub struct TaskGuard<G> {
    guard: G,
}

impl<G: Guard> TaskGuard<G> {
    /// Wraps a guard for user-task lifecycle events.
    #[must_use]
    pub fn new(guard: G) -> Self {
        Self { guard }
    }

    /// Returns the wrapped guard.
    #[must_use]
    pub fn guard(&self) -> &G {
        &self.guard
    }
}

impl<G: Guard> TaskListener for TaskGuard<G> {
    fn notify(&self, task: &dyn TaskContext) -> Result<(), FlowguardError> {
        dispatch(&self.guard, task.event_name(), task.execution())
    }
}
