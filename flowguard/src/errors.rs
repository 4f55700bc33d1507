//! Error types for the flowguard framework.
//!
//! Every failure is synchronous and surfaced to the immediate caller; the
//! framework performs no internal recovery or retry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for flowguard operations.
#[derive(Debug, Error)]
pub enum FlowguardError {
    /// A check was called with malformed input.
    #[error("{0}")]
    InvalidArgument(#[from] InvalidArgumentError),

    /// A precondition or postcondition check failed.
    #[error("{0}")]
    ContractViolation(#[from] ContractViolationError),

    /// Deploying process resources failed.
    #[error("{0}")]
    Deployment(#[from] DeploymentError),

    /// A referenced entity has no deployment or no live counterpart.
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// The engine failed internally while serving a call.
    #[error("Engine error: {0}")]
    Engine(String),
}

/// Error raised when a check call receives malformed input.
///
/// Always a programming error in the calling guard, never retried.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct InvalidArgumentError {
    /// The error message.
    pub message: String,
}

impl InvalidArgumentError {
    /// Creates a new invalid argument error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error raised when a guard condition is violated.
///
/// Carries the offending activity and the condition text so the failure is
/// traceable from test output without a debugger.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Condition of activity '{activity_id}' is violated: {condition}")]
pub struct ContractViolationError {
    /// The activity whose condition failed.
    pub activity_id: String,
    /// Description of the violated condition.
    pub condition: String,
}

impl ContractViolationError {
    /// Creates a new contract violation error.
    #[must_use]
    pub fn new(activity_id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            condition: condition.into(),
        }
    }
}

/// Error raised when deploying process resources fails.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Deployment failed for '{resource}': {message}")]
pub struct DeploymentError {
    /// The resource that could not be deployed.
    pub resource: String,
    /// The reason reported by the engine.
    pub message: String,
}

impl DeploymentError {
    /// Creates a new deployment error.
    #[must_use]
    pub fn new(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

/// Error raised when a referenced entity cannot be resolved.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{kind} not found: '{key}'")]
pub struct NotFoundError {
    /// What kind of entity was looked up (e.g. "process definition").
    pub kind: String,
    /// The key used for the lookup.
    pub key: String,
}

impl NotFoundError {
    /// Creates a new not-found error.
    #[must_use]
    pub fn new(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Creates a not-found error for a process definition key.
    #[must_use]
    pub fn process_definition(key: impl Into<String>) -> Self {
        Self::new("process definition", key)
    }

    /// Creates a not-found error for an open user task.
    #[must_use]
    pub fn open_task(instance: impl Into<String>) -> Self {
        Self::new("open user task", instance)
    }
}
