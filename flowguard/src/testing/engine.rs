//! A minimal in-memory engine double.
//!
//! Just enough engine to drive the harness and guards end-to-end: a
//! resource registry, deployments, a synchronous token walk with wait
//! states, exclusive gateways, error-code routing, lifecycle listeners, a
//! behaviour registry, and a virtual clock. It is a test double for the
//! boundary in [`crate::engine`], not a process engine.

use super::definition::{Node, NodeKind, ProcessDefinition};
use super::mocks::ServiceBehavior;
use crate::engine::{
    DeploymentId, Execution, ProcessEngine, ProcessInstance, ProcessInstanceId, TaskContext,
    VariableMap,
};
use crate::errors::{DeploymentError, FlowguardError, NotFoundError};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// The lifecycle state of an instance inside the double.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStatus {
    /// Running or waiting at a user task.
    Active,
    /// Reached an end event.
    Completed,
    /// Aborted by a listener or behaviour failure.
    Failed,
    /// Force-deleted by a cascading undeploy.
    Terminated,
}

struct InstanceState {
    definition: Arc<ProcessDefinition>,
    variables: Arc<RwLock<VariableMap>>,
    status: InstanceStatus,
    waiting_at: Option<String>,
    task_locals: Option<Arc<RwLock<VariableMap>>>,
    history: Vec<String>,
}

/// The execution handle the double passes to listeners and behaviours.
struct EngineExecution {
    activity_id: String,
    event_name: String,
    globals: Arc<RwLock<VariableMap>>,
    locals: Arc<RwLock<VariableMap>>,
}

impl Execution for EngineExecution {
    fn current_activity_id(&self) -> &str {
        &self.activity_id
    }

    fn event_name(&self) -> &str {
        &self.event_name
    }

    fn variable(&self, name: &str) -> Option<serde_json::Value> {
        self.locals
            .read()
            .get(name)
            .cloned()
            .or_else(|| self.globals.read().get(name).cloned())
    }

    fn variable_local(&self, name: &str) -> Option<serde_json::Value> {
        self.locals.read().get(name).cloned()
    }

    fn set_variable(&self, name: &str, value: serde_json::Value) {
        self.globals.write().insert(name.to_string(), value);
    }

    fn set_variable_local(&self, name: &str, value: serde_json::Value) {
        self.locals.write().insert(name.to_string(), value);
    }
}

struct EngineTask {
    execution: EngineExecution,
}

impl TaskContext for EngineTask {
    fn event_name(&self) -> &str {
        &self.execution.event_name
    }

    fn execution(&self) -> &dyn Execution {
        &self.execution
    }
}

/// An in-memory [`ProcessEngine`] for tests.
///
/// Definitions are registered under resource names with
/// [`register_resource`](Self::register_resource) before scenarios deploy
/// them; service behaviours are registered by name and cleared by
/// `reset_mocks`.
#[derive(Default)]
pub struct InMemoryEngine {
    resources: RwLock<HashMap<String, Arc<ProcessDefinition>>>,
    definitions: RwLock<HashMap<String, Arc<ProcessDefinition>>>,
    deployments: RwLock<HashMap<DeploymentId, Vec<String>>>,
    instances: RwLock<HashMap<ProcessInstanceId, InstanceState>>,
    behaviors: RwLock<HashMap<String, Arc<dyn ServiceBehavior>>>,
    clock_override: RwLock<Option<DateTime<Utc>>>,
}

impl InMemoryEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition under a resource name, making it deployable.
    pub fn register_resource(&self, resource: impl Into<String>, definition: ProcessDefinition) {
        self.resources
            .write()
            .insert(resource.into(), Arc::new(definition));
    }

    /// Registers a service behaviour under the name service tasks bind to.
    pub fn register_behavior(
        &self,
        name: impl Into<String>,
        behavior: impl ServiceBehavior + 'static,
    ) {
        self.behaviors
            .write()
            .insert(name.into(), Arc::new(behavior));
    }

    /// Returns the engine's current time, honoring a pinned clock.
    #[must_use]
    pub fn current_time(&self) -> DateTime<Utc> {
        self.clock_override.read().unwrap_or_else(Utc::now)
    }

    /// Returns the ids of the activities an instance has entered, in order.
    #[must_use]
    pub fn history(&self, instance: &ProcessInstanceId) -> Vec<String> {
        self.instances
            .read()
            .get(instance)
            .map(|state| state.history.clone())
            .unwrap_or_default()
    }

    /// Returns the user task an instance is waiting at, if any.
    #[must_use]
    pub fn open_task(&self, instance: &ProcessInstanceId) -> Option<String> {
        self.instances
            .read()
            .get(instance)
            .and_then(|state| state.waiting_at.clone())
    }

    /// Returns the lifecycle status of an instance.
    #[must_use]
    pub fn instance_status(&self, instance: &ProcessInstanceId) -> Option<InstanceStatus> {
        self.instances
            .read()
            .get(instance)
            .map(|state| state.status)
    }

    /// Returns an instance-scope variable.
    #[must_use]
    pub fn instance_variable(
        &self,
        instance: &ProcessInstanceId,
        name: &str,
    ) -> Option<serde_json::Value> {
        self.instances
            .read()
            .get(instance)
            .and_then(|state| state.variables.read().get(name).cloned())
    }

    fn walk(&self, state: &mut InstanceState, start: String) -> Result<(), FlowguardError> {
        let definition = state.definition.clone();
        let mut current = Some(start);

        while let Some(id) = current.take() {
            let node = definition
                .node(&id)
                .ok_or_else(|| FlowguardError::Engine(format!("unknown node '{id}'")))?;
            state.history.push(id.clone());
            let locals = Arc::new(RwLock::new(VariableMap::new()));

            Self::fire_execution_listeners(node, "start", &state.variables, &locals)?;

            match &node.kind {
                NodeKind::StartEvent | NodeKind::Gateway => {
                    Self::fire_execution_listeners(node, "end", &state.variables, &locals)?;
                    current = Some(Self::select_flow(node, &state.variables)?);
                }
                NodeKind::EndEvent => {
                    Self::fire_execution_listeners(node, "end", &state.variables, &locals)?;
                    state.status = InstanceStatus::Completed;
                    state.waiting_at = None;
                    tracing::debug!(node = %id, "Instance completed.");
                }
                NodeKind::ServiceTask { behavior } => {
                    let resolved = self.behaviors.read().get(behavior).cloned().ok_or_else(|| {
                        FlowguardError::Engine(format!("no behaviour registered for '{behavior}'"))
                    })?;
                    let execution = EngineExecution {
                        activity_id: id.clone(),
                        event_name: "execute".to_string(),
                        globals: state.variables.clone(),
                        locals: locals.clone(),
                    };
                    match resolved.execute(&execution) {
                        Ok(()) => {
                            Self::fire_execution_listeners(node, "end", &state.variables, &locals)?;
                            current = Some(Self::select_flow(node, &state.variables)?);
                        }
                        Err(error) => {
                            let Some(handler) = node.error_handlers.get(&error.code) else {
                                return Err(FlowguardError::Engine(format!(
                                    "unhandled error code '{}' at '{id}'",
                                    error.code
                                )));
                            };
                            tracing::debug!(
                                node = %id,
                                code = %error.code,
                                handler = %handler,
                                "Routing service error to handler."
                            );
                            current = Some(handler.clone());
                        }
                    }
                }
                NodeKind::UserTask => {
                    let task = EngineTask {
                        execution: EngineExecution {
                            activity_id: id.clone(),
                            event_name: "create".to_string(),
                            globals: state.variables.clone(),
                            locals: locals.clone(),
                        },
                    };
                    Self::fire_task_listeners(node, &task)?;
                    state.waiting_at = Some(id.clone());
                    state.task_locals = Some(locals);
                    tracing::debug!(node = %id, "Instance waiting at user task.");
                }
            }
        }

        Ok(())
    }

    fn fire_execution_listeners(
        node: &Node,
        event: &str,
        globals: &Arc<RwLock<VariableMap>>,
        locals: &Arc<RwLock<VariableMap>>,
    ) -> Result<(), FlowguardError> {
        for listener in &node.execution_listeners {
            let execution = EngineExecution {
                activity_id: node.id.clone(),
                event_name: event.to_string(),
                globals: globals.clone(),
                locals: locals.clone(),
            };
            listener.notify(&execution)?;
        }
        Ok(())
    }

    fn fire_task_listeners(node: &Node, task: &EngineTask) -> Result<(), FlowguardError> {
        for listener in &node.task_listeners {
            listener.notify(task)?;
        }
        Ok(())
    }

    fn select_flow(
        node: &Node,
        globals: &Arc<RwLock<VariableMap>>,
    ) -> Result<String, FlowguardError> {
        let variables = globals.read();
        for flow in &node.flows {
            if let Some((name, expected)) = &flow.condition {
                if variables.get(name) == Some(expected) {
                    return Ok(flow.target.clone());
                }
            }
        }
        node.flows
            .iter()
            .find(|flow| flow.condition.is_none())
            .map(|flow| flow.target.clone())
            .ok_or_else(|| {
                FlowguardError::Engine(format!("no outgoing flow matched at '{}'", node.id))
            })
    }

    fn complete_waiting_task(
        &self,
        instance: &ProcessInstanceId,
        state: &mut InstanceState,
        variables: Option<VariableMap>,
    ) -> Result<(), FlowguardError> {
        let Some(node_id) = state.waiting_at.clone() else {
            return Err(NotFoundError::open_task(instance.to_string()).into());
        };
        let definition = state.definition.clone();
        let node = definition
            .node(&node_id)
            .ok_or_else(|| FlowguardError::Engine(format!("unknown node '{node_id}'")))?;

        if let Some(variables) = variables {
            state.variables.write().extend(variables);
        }

        // The local scope created at task entry survives the wait.
        let locals = state
            .task_locals
            .take()
            .unwrap_or_else(|| Arc::new(RwLock::new(VariableMap::new())));

        let task = EngineTask {
            execution: EngineExecution {
                activity_id: node_id.clone(),
                event_name: "complete".to_string(),
                globals: state.variables.clone(),
                locals: locals.clone(),
            },
        };
        Self::fire_task_listeners(node, &task)?;
        Self::fire_execution_listeners(node, "end", &state.variables, &locals)?;

        state.waiting_at = None;
        let next = Self::select_flow(node, &state.variables)?;
        self.walk(state, next)
    }
}

impl ProcessEngine for InMemoryEngine {
    fn deploy(&self, resources: &[&str]) -> Result<DeploymentId, DeploymentError> {
        let registry = self.resources.read();
        let mut deployed = Vec::with_capacity(resources.len());
        for resource in resources {
            let definition = registry
                .get(*resource)
                .cloned()
                .ok_or_else(|| DeploymentError::new(*resource, "resource not registered"))?;
            deployed.push(definition);
        }
        drop(registry);

        let id = DeploymentId::new();
        let keys: Vec<String> = deployed
            .iter()
            .map(|definition| definition.key().to_string())
            .collect();
        let mut definitions = self.definitions.write();
        for definition in deployed {
            definitions.insert(definition.key().to_string(), definition);
        }
        self.deployments.write().insert(id.clone(), keys);
        tracing::debug!(deployment = %id, ?resources, "Deployment committed.");
        Ok(id)
    }

    fn delete_deployment(&self, id: &DeploymentId, cascade: bool) -> Result<(), FlowguardError> {
        let keys = self
            .deployments
            .write()
            .remove(id)
            .ok_or_else(|| NotFoundError::new("deployment", id.to_string()))?;

        let mut definitions = self.definitions.write();
        for key in &keys {
            definitions.remove(key);
        }
        drop(definitions);

        if cascade {
            let mut instances = self.instances.write();
            for state in instances.values_mut() {
                if state.status == InstanceStatus::Active
                    && keys.iter().any(|key| key == state.definition.key())
                {
                    state.status = InstanceStatus::Terminated;
                    state.waiting_at = None;
                    tracing::debug!(key = %state.definition.key(), "Instance terminated by cascade.");
                }
            }
        }
        Ok(())
    }

    fn start_by_key(
        &self,
        key: &str,
        variables: Option<VariableMap>,
    ) -> Result<ProcessInstance, FlowguardError> {
        let definition = self
            .definitions
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| NotFoundError::process_definition(key))?;
        let start = definition
            .start_node()
            .ok_or_else(|| FlowguardError::Engine(format!("definition '{key}' has no start event")))?
            .to_string();

        let id = ProcessInstanceId::new();
        let mut state = InstanceState {
            definition,
            variables: Arc::new(RwLock::new(variables.unwrap_or_default())),
            status: InstanceStatus::Active,
            waiting_at: None,
            task_locals: None,
            history: Vec::new(),
        };

        let result = self.walk(&mut state, start);
        if result.is_err() {
            state.status = InstanceStatus::Failed;
        }
        self.instances.write().insert(id.clone(), state);
        result.map(|()| ProcessInstance::new(id, key))
    }

    fn is_instance_running(&self, id: &ProcessInstanceId) -> bool {
        self.instances
            .read()
            .get(id)
            .is_some_and(|state| state.status == InstanceStatus::Active)
    }

    fn complete_task(
        &self,
        instance: &ProcessInstanceId,
        variables: Option<VariableMap>,
    ) -> Result<(), FlowguardError> {
        let mut state = self
            .instances
            .write()
            .remove(instance)
            .ok_or_else(|| NotFoundError::new("process instance", instance.to_string()))?;

        let result = if state.status == InstanceStatus::Active {
            self.complete_waiting_task(instance, &mut state, variables)
        } else {
            Err(NotFoundError::open_task(instance.to_string()).into())
        };
        if result.is_err() && state.status == InstanceStatus::Active {
            state.status = InstanceStatus::Failed;
        }
        self.instances.write().insert(instance.clone(), state);
        result
    }

    fn set_clock(&self, now: DateTime<Utc>) {
        *self.clock_override.write() = Some(now);
    }

    fn reset_clock(&self) {
        *self.clock_override.write() = None;
    }

    fn reset_mocks(&self) {
        self.behaviors.write().clear();
    }
}
