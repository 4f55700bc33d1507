//! In-memory process definitions for the engine double.
//!
//! Definitions are built programmatically: nodes chain in declaration order,
//! while gateways and end events break the chain and are wired explicitly
//! with [`ProcessDefinitionBuilder::flow`] and
//! [`ProcessDefinitionBuilder::flow_when`].

use crate::engine::{ExecutionListener, TaskListener};
use std::collections::HashMap;
use std::sync::Arc;

/// The kind of a process node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Where a new instance begins.
    StartEvent,
    /// Ends the instance when reached.
    EndEvent,
    /// An automated step bound to a named service behaviour.
    ServiceTask {
        /// The behaviour name resolved against the engine's registry.
        behavior: String,
    },
    /// A wait state completed through the task API.
    UserTask,
    /// An exclusive split; the first matching conditional flow wins, with
    /// the first unconditional flow as default.
    Gateway,
}

#[derive(Clone)]
pub(crate) struct Flow {
    pub(crate) target: String,
    pub(crate) condition: Option<(String, serde_json::Value)>,
}

pub(crate) struct Node {
    pub(crate) id: String,
    pub(crate) kind: NodeKind,
    pub(crate) flows: Vec<Flow>,
    pub(crate) execution_listeners: Vec<Arc<dyn ExecutionListener>>,
    pub(crate) task_listeners: Vec<Arc<dyn TaskListener>>,
    pub(crate) error_handlers: HashMap<String, String>,
}

/// One process definition, registered under a resource name and deployed by
/// key.
pub struct ProcessDefinition {
    key: String,
    start: Option<String>,
    nodes: HashMap<String, Node>,
}

impl ProcessDefinition {
    /// Starts building a definition with the given key.
    #[must_use]
    pub fn builder(key: impl Into<String>) -> ProcessDefinitionBuilder {
        ProcessDefinitionBuilder {
            key: key.into(),
            nodes: Vec::new(),
        }
    }

    /// Returns the definition key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn start_node(&self) -> Option<&str> {
        self.start.as_deref()
    }
}

impl std::fmt::Debug for ProcessDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessDefinition")
            .field("key", &self.key)
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`ProcessDefinition`].
///
/// Builder calls referencing an unknown node panic immediately; definitions
/// are test fixtures and a typo should fail loudly.
pub struct ProcessDefinitionBuilder {
    key: String,
    nodes: Vec<Node>,
}

impl ProcessDefinitionBuilder {
    /// Appends a start event.
    #[must_use]
    pub fn start_event(self, id: impl Into<String>) -> Self {
        self.append(id.into(), NodeKind::StartEvent)
    }

    /// Appends an end event.
    #[must_use]
    pub fn end_event(self, id: impl Into<String>) -> Self {
        self.append(id.into(), NodeKind::EndEvent)
    }

    /// Appends a service task bound to a named behaviour.
    #[must_use]
    pub fn service_task(self, id: impl Into<String>, behavior: impl Into<String>) -> Self {
        self.append(
            id.into(),
            NodeKind::ServiceTask {
                behavior: behavior.into(),
            },
        )
    }

    /// Appends a user task.
    #[must_use]
    pub fn user_task(self, id: impl Into<String>) -> Self {
        self.append(id.into(), NodeKind::UserTask)
    }

    /// Appends an exclusive gateway. Outgoing flows must be wired
    /// explicitly.
    #[must_use]
    pub fn exclusive_gateway(self, id: impl Into<String>) -> Self {
        self.append(id.into(), NodeKind::Gateway)
    }

    /// Adds an unconditional flow between two nodes.
    #[must_use]
    pub fn flow(mut self, from: &str, to: impl Into<String>) -> Self {
        self.node_mut(from).flows.push(Flow {
            target: to.into(),
            condition: None,
        });
        self
    }

    /// Adds a flow taken when the named variable equals the given value.
    #[must_use]
    pub fn flow_when(
        mut self,
        from: &str,
        to: impl Into<String>,
        variable: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.node_mut(from).flows.push(Flow {
            target: to.into(),
            condition: Some((variable.into(), value)),
        });
        self
    }

    /// Routes a service-task error code to a handler node.
    #[must_use]
    pub fn catch_error(
        mut self,
        node: &str,
        code: impl Into<String>,
        handler: impl Into<String>,
    ) -> Self {
        self.node_mut(node)
            .error_handlers
            .insert(code.into(), handler.into());
        self
    }

    /// Attaches an execution listener to a node, fired on its start and end
    /// events.
    #[must_use]
    pub fn execution_listener(mut self, node: &str, listener: Arc<dyn ExecutionListener>) -> Self {
        self.node_mut(node).execution_listeners.push(listener);
        self
    }

    /// Attaches a task listener to a user task, fired on its create and
    /// complete events.
    #[must_use]
    pub fn task_listener(mut self, node: &str, listener: Arc<dyn TaskListener>) -> Self {
        self.node_mut(node).task_listeners.push(listener);
        self
    }

    /// Finishes the definition.
    #[must_use]
    pub fn build(self) -> ProcessDefinition {
        let start = self
            .nodes
            .iter()
            .find(|node| node.kind == NodeKind::StartEvent)
            .map(|node| node.id.clone());
        ProcessDefinition {
            key: self.key,
            start,
            nodes: self
                .nodes
                .into_iter()
                .map(|node| (node.id.clone(), node))
                .collect(),
        }
    }

    fn append(mut self, id: String, kind: NodeKind) -> Self {
        // Chain from the previous node unless it terminates or splits the
        // flow.
        if let Some(previous) = self.nodes.last_mut() {
            if !matches!(previous.kind, NodeKind::EndEvent | NodeKind::Gateway) {
                previous.flows.push(Flow {
                    target: id.clone(),
                    condition: None,
                });
            }
        }
        self.nodes.push(Node {
            id,
            kind,
            flows: Vec::new(),
            execution_listeners: Vec::new(),
            task_listeners: Vec::new(),
            error_handlers: HashMap::new(),
        });
        self
    }

    fn node_mut(&mut self, id: &str) -> &mut Node {
        let key = &self.key;
        self.nodes
            .iter_mut()
            .find(|node| node.id == id)
            .unwrap_or_else(|| panic!("unknown node '{id}' in definition '{key}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_linear_chain() {
        let definition = ProcessDefinition::builder("linear")
            .start_event("start")
            .user_task("work")
            .end_event("done")
            .build();

        assert_eq!(definition.key(), "linear");
        assert_eq!(definition.start_node(), Some("start"));

        let start = definition.node("start").unwrap();
        assert_eq!(start.flows.len(), 1);
        assert_eq!(start.flows[0].target, "work");

        let done = definition.node("done").unwrap();
        assert!(done.flows.is_empty());
    }

    #[test]
    fn test_gateway_breaks_the_chain() {
        let definition = ProcessDefinition::builder("branching")
            .start_event("start")
            .exclusive_gateway("split")
            .user_task("left")
            .end_event("leftDone")
            .user_task("right")
            .end_event("rightDone")
            .flow_when("split", "left", "side", json!("left"))
            .flow("split", "right")
            .build();

        // No implicit flow out of the gateway or into the detached segment.
        let split = definition.node("split").unwrap();
        assert_eq!(split.flows.len(), 2);
        assert_eq!(split.flows[0].condition, Some(("side".into(), json!("left"))));
        assert_eq!(split.flows[1].condition, None);

        let left_done = definition.node("leftDone").unwrap();
        assert!(left_done.flows.is_empty());
    }

    #[test]
    #[should_panic(expected = "unknown node")]
    fn test_flow_from_unknown_node_panics() {
        let _ = ProcessDefinition::builder("broken")
            .start_event("start")
            .flow("missing", "start");
    }
}
