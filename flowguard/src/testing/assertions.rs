//! Process-state assertions against the in-memory engine.

use super::engine::{InMemoryEngine, InstanceStatus};
use crate::engine::ProcessInstance;

/// Asserts that the instance ran to an end event.
pub fn assert_process_ended(engine: &InMemoryEngine, instance: &ProcessInstance) {
    let status = engine.instance_status(&instance.id);
    assert_eq!(
        status,
        Some(InstanceStatus::Completed),
        "Expected instance '{}' to have ended, got status: {:?}",
        instance.id,
        status
    );
}

/// Asserts that the instance entered the given activity at some point.
pub fn assert_has_passed(engine: &InMemoryEngine, instance: &ProcessInstance, activity_id: &str) {
    let history = engine.history(&instance.id);
    assert!(
        history.iter().any(|entered| entered == activity_id),
        "Expected instance '{}' to have passed '{}'. History: {:?}",
        instance.id,
        activity_id,
        history
    );
}

/// Asserts that the instance is waiting at the given user task.
pub fn assert_waiting_at(engine: &InMemoryEngine, instance: &ProcessInstance, activity_id: &str) {
    let open = engine.open_task(&instance.id);
    assert_eq!(
        open.as_deref(),
        Some(activity_id),
        "Expected instance '{}' to be waiting at '{}', got {:?}",
        instance.id,
        activity_id,
        open
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProcessEngine;
    use crate::testing::ProcessDefinition;

    fn waiting_instance() -> (InMemoryEngine, ProcessInstance) {
        let engine = InMemoryEngine::new();
        engine.register_resource(
            "manual.bpmn",
            ProcessDefinition::builder("manual")
                .start_event("start")
                .user_task("review")
                .end_event("done")
                .build(),
        );
        engine.deploy(&["manual.bpmn"]).unwrap();
        let instance = engine.start_by_key("manual", None).unwrap();
        (engine, instance)
    }

    #[test]
    fn test_assert_waiting_at() {
        let (engine, instance) = waiting_instance();
        assert_has_passed(&engine, &instance, "start");
        assert_waiting_at(&engine, &instance, "review");
    }

    #[test]
    #[should_panic(expected = "to have ended")]
    fn test_assert_process_ended_fails_while_waiting() {
        let (engine, instance) = waiting_instance();
        assert_process_ended(&engine, &instance);
    }

    #[test]
    fn test_assert_process_ended() {
        let (engine, instance) = waiting_instance();
        engine.complete_task(&instance.id, None).unwrap();
        assert_process_ended(&engine, &instance);
        assert_has_passed(&engine, &instance, "done");
    }

    #[test]
    #[should_panic(expected = "to have passed")]
    fn test_assert_has_passed_fails() {
        let (engine, instance) = waiting_instance();
        assert_has_passed(&engine, &instance, "done");
    }
}
