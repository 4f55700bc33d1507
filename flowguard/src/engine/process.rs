//! The process engine trait and its handle types.

use super::VariableMap;
use crate::errors::{DeploymentError, FlowguardError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one committed deployment of process resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentId(Uuid);

impl DeploymentId {
    /// Creates a fresh deployment id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeploymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies one process instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessInstanceId(Uuid);

impl ProcessInstanceId {
    /// Creates a fresh process instance id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProcessInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProcessInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle for a started process instance.
///
/// A snapshot taken at start time; liveness must be queried from the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInstance {
    /// The instance id.
    pub id: ProcessInstanceId,
    /// The key of the definition this instance was started from.
    pub definition_key: String,
}

impl ProcessInstance {
    /// Creates a new process instance handle.
    #[must_use]
    pub fn new(id: ProcessInstanceId, definition_key: impl Into<String>) -> Self {
        Self {
            id,
            definition_key: definition_key.into(),
        }
    }
}

/// A workflow engine as consumed by the test harness.
///
/// All calls run to completion on the caller's thread before returning.
pub trait ProcessEngine: Send + Sync {
    /// Commits one deployment containing the named resources.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError`] if any resource is unreadable or the
    /// engine rejects the deployment; no partial deployment is committed.
    fn deploy(&self, resources: &[&str]) -> Result<DeploymentId, DeploymentError>;

    /// Deletes a deployment. With `cascade`, dependent runtime data is
    /// deleted too, even if a process instance is still active.
    fn delete_deployment(&self, id: &DeploymentId, cascade: bool) -> Result<(), FlowguardError>;

    /// Starts a process instance by definition key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::NotFoundError`] if no definition with that
    /// key is deployed.
    fn start_by_key(
        &self,
        key: &str,
        variables: Option<VariableMap>,
    ) -> Result<ProcessInstance, FlowguardError>;

    /// Returns true if the instance is still active in the engine.
    fn is_instance_running(&self, id: &ProcessInstanceId) -> bool;

    /// Completes the single open user task of the instance.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::NotFoundError`] if the instance has no open
    /// user task.
    fn complete_task(
        &self,
        instance: &ProcessInstanceId,
        variables: Option<VariableMap>,
    ) -> Result<(), FlowguardError>;

    /// Pins the engine's virtual clock to the given time.
    fn set_clock(&self, now: DateTime<Utc>);

    /// Resets the virtual clock to wall-clock time.
    fn reset_clock(&self);

    /// Clears any engine-level test mocks registered for the session.
    fn reset_mocks(&self);
}
