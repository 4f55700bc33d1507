//! Standalone execution fixtures for guard tests.

use crate::engine::{Execution, TaskContext, VariableMap};
use parking_lot::RwLock;

/// A free-standing execution context with a two-tier variable store.
///
/// The local scope shadows the inherited scope, as an engine resolves
/// variables through ancestor executions. Built in builder style:
///
/// ```
/// use flowguard::testing::TestExecution;
/// use serde_json::json;
///
/// let execution = TestExecution::new("loadContract")
///     .with_event("end")
///     .with_inherited("contractId", json!("C-1"));
/// ```
#[derive(Debug, Default)]
pub struct TestExecution {
    activity_id: String,
    event_name: String,
    local: RwLock<VariableMap>,
    inherited: RwLock<VariableMap>,
}

impl TestExecution {
    /// Creates an execution positioned at the given activity.
    #[must_use]
    pub fn new(activity_id: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            ..Self::default()
        }
    }

    /// Sets the lifecycle event name.
    #[must_use]
    pub fn with_event(mut self, event_name: impl Into<String>) -> Self {
        self.event_name = event_name.into();
        self
    }

    /// Sets a variable in the local scope.
    #[must_use]
    pub fn with_local(self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.local.write().insert(name.into(), value);
        self
    }

    /// Sets a variable in the inherited scope.
    #[must_use]
    pub fn with_inherited(self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.inherited.write().insert(name.into(), value);
        self
    }

    /// Sets a variable in the inherited scope (the common case for values
    /// visible through the fallback lookup).
    #[must_use]
    pub fn with_variable(self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.with_inherited(name, value)
    }

    /// Returns the lifecycle event name.
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Sets a variable in the inherited scope after construction.
    pub fn set_variable(&self, name: impl Into<String>, value: serde_json::Value) {
        self.inherited.write().insert(name.into(), value);
    }

    /// Sets a variable in the local scope after construction.
    pub fn set_variable_local(&self, name: impl Into<String>, value: serde_json::Value) {
        self.local.write().insert(name.into(), value);
    }
}

impl Execution for TestExecution {
    fn current_activity_id(&self) -> &str {
        &self.activity_id
    }

    fn event_name(&self) -> &str {
        &self.event_name
    }

    fn variable(&self, name: &str) -> Option<serde_json::Value> {
        self.local
            .read()
            .get(name)
            .cloned()
            .or_else(|| self.inherited.read().get(name).cloned())
    }

    fn variable_local(&self, name: &str) -> Option<serde_json::Value> {
        self.local.read().get(name).cloned()
    }

    fn set_variable(&self, name: &str, value: serde_json::Value) {
        self.inherited.write().insert(name.to_string(), value);
    }

    fn set_variable_local(&self, name: &str, value: serde_json::Value) {
        self.local.write().insert(name.to_string(), value);
    }
}

/// A free-standing user-task handle wrapping a [`TestExecution`].
#[derive(Debug, Default)]
pub struct TestTask {
    execution: TestExecution,
}

impl TestTask {
    /// Creates a task handle over the given execution.
    #[must_use]
    pub fn new(execution: TestExecution) -> Self {
        Self { execution }
    }
}

impl TaskContext for TestTask {
    fn event_name(&self) -> &str {
        self.execution.event_name()
    }

    fn execution(&self) -> &dyn Execution {
        &self.execution
    }
}
