//! Execution and task handles with two-tier variable scoping.

use crate::errors::FlowguardError;
use std::collections::HashMap;

/// A map of named process variables.
///
/// An *absent* map and an *empty* map are distinct at the engine boundary:
/// engines may treat "start with no variables" differently from "start with
/// zero variables", so callers pass `Option<VariableMap>` throughout.
pub type VariableMap = HashMap<String, serde_json::Value>;

/// The runtime handle for one in-flight activity or task.
///
/// Variables live in two tiers: the local scope holds values set directly on
/// this execution, while [`Execution::variable`] falls back through ancestor
/// scopes when the local lookup misses. The engine owns the handle's
/// lifetime; flowguard only reads and occasionally writes through it.
pub trait Execution {
    /// Returns the identifier of the activity currently executing.
    fn current_activity_id(&self) -> &str;

    /// Returns the name of the lifecycle event that fired this callback.
    fn event_name(&self) -> &str;

    /// Looks up a variable, falling back through ancestor scopes.
    fn variable(&self, name: &str) -> Option<serde_json::Value>;

    /// Looks up a variable in the local scope only.
    fn variable_local(&self, name: &str) -> Option<serde_json::Value>;

    /// Sets a variable in the outermost (process instance) scope.
    fn set_variable(&self, name: &str, value: serde_json::Value);

    /// Sets a variable in the local scope of this execution.
    fn set_variable_local(&self, name: &str, value: serde_json::Value);
}

/// The callback handle for a user-task lifecycle event.
pub trait TaskContext {
    /// Returns the name of the lifecycle event that fired this callback.
    fn event_name(&self) -> &str;

    /// Returns the execution the task belongs to.
    fn execution(&self) -> &dyn Execution;
}

/// Lifecycle callback for regular activities.
///
/// The engine invokes `notify` synchronously inside its own transition
/// handling; an error aborts that transition.
pub trait ExecutionListener: Send + Sync {
    /// Handles a lifecycle event on an activity execution.
    fn notify(&self, execution: &dyn Execution) -> Result<(), FlowguardError>;
}

/// Lifecycle callback for user tasks.
pub trait TaskListener: Send + Sync {
    /// Handles a lifecycle event on a user task.
    fn notify(&self, task: &dyn TaskContext) -> Result<(), FlowguardError>;
}
