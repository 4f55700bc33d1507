//! The per-scenario engine session.

use crate::engine::{DeploymentId, ProcessEngine, ProcessInstance, VariableMap};
use crate::errors::{FlowguardError, InvalidArgumentError, NotFoundError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Tracks deployments, the current process instance, and the virtual clock
/// for one test scenario.
///
/// Construct one session per scenario and pass it to the step code; there is
/// no ambient global state. Dropping the session undeploys whatever is still
/// deployed, so cleanup runs on every exit path including test failure.
pub struct EngineSession {
    engine: Arc<dyn ProcessEngine>,
    deployment_ids: HashSet<DeploymentId>,
    instance: Option<ProcessInstance>,
    start_time: Option<DateTime<Utc>>,
}

impl EngineSession {
    /// Creates a session bound to the given engine.
    #[must_use]
    pub fn new(engine: Arc<dyn ProcessEngine>) -> Self {
        tracing::debug!("Engine session created.");
        Self {
            engine,
            deployment_ids: HashSet::new(),
            instance: None,
            start_time: None,
        }
    }

    /// Deploys the named process resources as one deployment.
    ///
    /// The session start time is stamped on the first successful call.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::DeploymentError`] if any resource is
    /// unreadable or the engine rejects the deployment; no deployment id is
    /// recorded on failure.
    pub fn deploy(&mut self, resources: &[&str]) -> Result<DeploymentId, FlowguardError> {
        let id = self.engine.deploy(resources)?;
        tracing::debug!(deployment = %id, ?resources, "Deployed process resources.");
        self.deployment_ids.insert(id.clone());
        if self.start_time.is_none() {
            self.start_time = Some(Utc::now());
        }
        Ok(id)
    }

    /// Starts a process instance by definition key with an optional initial
    /// variable map, and tracks it as the current instance.
    ///
    /// An absent map means "no initial variables", which engines may treat
    /// differently from an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if no definition with that key is deployed.
    pub fn start_by_key(
        &mut self,
        key: &str,
        variables: Option<VariableMap>,
    ) -> Result<ProcessInstance, FlowguardError> {
        if key.is_empty() {
            return Err(
                InvalidArgumentError::new("Process definition key must not be empty").into(),
            );
        }
        let instance = self.engine.start_by_key(key, variables)?;
        tracing::debug!(instance = %instance.id, key, "Started process instance.");
        self.instance = Some(instance.clone());
        Ok(instance)
    }

    /// Returns the last-started instance handle, if any.
    ///
    /// The handle is a snapshot: it stays set after the instance ends and is
    /// deliberately not cleared by [`undeploy`](Self::undeploy).
    #[must_use]
    pub fn current_instance(&self) -> Option<&ProcessInstance> {
        self.instance.as_ref()
    }

    /// Returns true if the current instance is still active in the engine.
    ///
    /// This is a live engine query, not a cached-handle check: an instance
    /// that ran to completion reports false here even though
    /// [`current_instance`](Self::current_instance) still returns its handle.
    #[must_use]
    pub fn has_running_instance(&self) -> bool {
        self.instance
            .as_ref()
            .is_some_and(|instance| self.engine.is_instance_running(&instance.id))
    }

    /// Completes the open user task of the current instance.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if no instance was started or the instance
    /// has no open user task.
    pub fn complete_task(&self, variables: Option<VariableMap>) -> Result<(), FlowguardError> {
        let instance = self
            .instance
            .as_ref()
            .ok_or_else(|| NotFoundError::new("process instance", "none started"))?;
        self.engine.complete_task(&instance.id, variables)
    }

    /// Pins the engine's virtual clock to the given time.
    pub fn set_clock(&self, now: DateTime<Utc>) {
        self.engine.set_clock(now);
    }

    /// Resets the engine's virtual clock to wall-clock time.
    pub fn reset_clock(&self) {
        self.engine.reset_clock();
    }

    /// Deletes every recorded deployment with cascading force-delete and
    /// resets engine-level test mocks.
    ///
    /// Every deletion is attempted even when one fails; the deployment-id
    /// set is cleared unconditionally, so calling this with nothing deployed
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first deletion failure after all deletions were
    /// attempted.
    pub fn undeploy(&mut self) -> Result<(), FlowguardError> {
        let mut first_failure = None;
        for id in self.deployment_ids.drain() {
            if let Err(error) = self.engine.delete_deployment(&id, true) {
                tracing::warn!(deployment = %id, %error, "Undeploy failed, continuing.");
                first_failure.get_or_insert(error);
            } else {
                tracing::debug!(deployment = %id, "Undeployed.");
            }
        }
        self.engine.reset_mocks();
        first_failure.map_or(Ok(()), Err)
    }

    /// Returns the session start time, stamped on first deployment.
    #[must_use]
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Returns the engine this session is bound to.
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn ProcessEngine> {
        &self.engine
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        if !self.deployment_ids.is_empty() {
            if let Err(error) = self.undeploy() {
                tracing::warn!(%error, "Undeploy on drop failed.");
            }
        }
    }
}
