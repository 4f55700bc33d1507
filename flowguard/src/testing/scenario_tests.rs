//! End-to-end scenario tests: a contract-processing flow with an
//! automatic/manual split, driven through the session and guarded at the
//! load step.

#[cfg(test)]
mod tests {
    use crate::engine::Execution;
    use crate::errors::FlowguardError;
    use crate::guards::{check_is_set, ActivityGuard, Guard, SKIP_GUARDS_VARIABLE};
    use crate::harness::{with_variables, EngineSession};
    use crate::testing::{
        assert_has_passed, assert_process_ended, assert_waiting_at, init_test_logging,
        InMemoryEngine, ProcessDefinition, ServiceError,
    };
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    const CONTRACT_RESOURCE: &str = "contract-processing.bpmn";
    const CONTRACT_PROCESS: &str = "contract-processing";

    const LOAD_CONTRACT: &str = "loadContract";
    const PROCESS_AUTOMATICALLY: &str = "processContractAutomatically";
    const PROCESS_MANUALLY: &str = "processContractManually";
    const CANCEL_PROCESSING: &str = "cancelProcessing";
    const CONTRACT_PROCESSED: &str = "contractProcessed";
    const PROCESSING_CANCELLED: &str = "processingCancelled";

    const CONTRACT_ID: &str = "contractId";
    const IS_AUTOMATIC: &str = "isAutomatic";
    const ERRORS_PRESENT: &str = "processingErrorsPresent";

    const LOAD_CONTRACT_DATA: &str = "loadContractData";
    const PROCESS_CONTRACT: &str = "processContract";
    const CANCEL_CONTRACT: &str = "cancelContract";
    const ERROR_AUTOMATIC_FAILED: &str = "errorProcessAutomaticallyFailed";

    /// Postconditions of the load step: the collaborator must have decided
    /// how to process and which contract it loaded.
    struct AutomaticProcessingGuard;

    impl Guard for AutomaticProcessingGuard {
        fn check_postconditions(&self, execution: &dyn Execution) -> Result<(), FlowguardError> {
            check_is_set(execution, IS_AUTOMATIC)?;
            check_is_set(execution, CONTRACT_ID)?;
            Ok(())
        }
    }

    fn contract_process() -> ProcessDefinition {
        ProcessDefinition::builder(CONTRACT_PROCESS)
            .start_event("contractReceived")
            .service_task(LOAD_CONTRACT, LOAD_CONTRACT_DATA)
            .exclusive_gateway("automaticSplit")
            .service_task(PROCESS_AUTOMATICALLY, PROCESS_CONTRACT)
            .end_event(CONTRACT_PROCESSED)
            .user_task(PROCESS_MANUALLY)
            .exclusive_gateway("errorSplit")
            .service_task(CANCEL_PROCESSING, CANCEL_CONTRACT)
            .end_event(PROCESSING_CANCELLED)
            .flow_when("automaticSplit", PROCESS_AUTOMATICALLY, IS_AUTOMATIC, json!(true))
            .flow("automaticSplit", PROCESS_MANUALLY)
            .flow_when("errorSplit", CANCEL_PROCESSING, ERRORS_PRESENT, json!(true))
            .flow("errorSplit", CONTRACT_PROCESSED)
            .catch_error(PROCESS_AUTOMATICALLY, ERROR_AUTOMATIC_FAILED, CANCEL_PROCESSING)
            .execution_listener(LOAD_CONTRACT, Arc::new(ActivityGuard::new(AutomaticProcessingGuard)))
            .build()
    }

    fn mock_load_contract(engine: &InMemoryEngine, automatic: bool) {
        engine.register_behavior(
            LOAD_CONTRACT_DATA,
            move |execution: &dyn Execution| -> Result<(), ServiceError> {
                execution.set_variable(CONTRACT_ID, json!(Uuid::new_v4().to_string()));
                execution.set_variable(IS_AUTOMATIC, json!(automatic));
                Ok(())
            },
        );
    }

    fn mock_process_contract(engine: &InMemoryEngine, with_errors: bool) {
        engine.register_behavior(
            PROCESS_CONTRACT,
            move |_: &dyn Execution| -> Result<(), ServiceError> {
                if with_errors {
                    Err(ServiceError::new(ERROR_AUTOMATIC_FAILED))
                } else {
                    Ok(())
                }
            },
        );
    }

    fn mock_cancel_contract(engine: &InMemoryEngine) {
        engine.register_behavior(
            CANCEL_CONTRACT,
            |_: &dyn Execution| -> Result<(), ServiceError> { Ok(()) },
        );
    }

    fn deployed_session() -> (Arc<InMemoryEngine>, EngineSession) {
        init_test_logging();
        let engine = Arc::new(InMemoryEngine::new());
        engine.register_resource(CONTRACT_RESOURCE, contract_process());
        let mut session = EngineSession::new(engine.clone());
        session.deploy(&[CONTRACT_RESOURCE]).unwrap();
        (engine, session)
    }

    #[test]
    fn test_automatic_contract_is_processed_and_ends() {
        let (engine, mut session) = deployed_session();
        mock_load_contract(&engine, true);
        mock_process_contract(&engine, false);
        mock_cancel_contract(&engine);

        let instance = session.start_by_key(CONTRACT_PROCESS, None).unwrap();

        assert_has_passed(&engine, &instance, LOAD_CONTRACT);
        assert_has_passed(&engine, &instance, PROCESS_AUTOMATICALLY);
        assert_process_ended(&engine, &instance);
        assert!(!session.has_running_instance());
    }

    #[test]
    fn test_failing_automatic_processing_is_cancelled() {
        let (engine, mut session) = deployed_session();
        mock_load_contract(&engine, true);
        mock_process_contract(&engine, true);
        mock_cancel_contract(&engine);

        let instance = session.start_by_key(CONTRACT_PROCESS, None).unwrap();

        assert_has_passed(&engine, &instance, CANCEL_PROCESSING);
        assert_has_passed(&engine, &instance, PROCESSING_CANCELLED);
        assert_process_ended(&engine, &instance);
    }

    #[test]
    fn test_manual_contract_waits_for_the_task() {
        let (engine, mut session) = deployed_session();
        mock_load_contract(&engine, false);

        let instance = session.start_by_key(CONTRACT_PROCESS, None).unwrap();

        assert_waiting_at(&engine, &instance, PROCESS_MANUALLY);
        assert!(session.has_running_instance());

        session
            .complete_task(Some(with_variables([(ERRORS_PRESENT, json!(false))])))
            .unwrap();

        assert_has_passed(&engine, &instance, CONTRACT_PROCESSED);
        assert_process_ended(&engine, &instance);
        assert!(!session.has_running_instance());
    }

    #[test]
    fn test_manual_processing_with_errors_is_cancelled() {
        let (engine, mut session) = deployed_session();
        mock_load_contract(&engine, false);
        mock_cancel_contract(&engine);

        let instance = session.start_by_key(CONTRACT_PROCESS, None).unwrap();
        assert_waiting_at(&engine, &instance, PROCESS_MANUALLY);

        session
            .complete_task(Some(with_variables([(ERRORS_PRESENT, json!(true))])))
            .unwrap();

        assert_has_passed(&engine, &instance, CANCEL_PROCESSING);
        assert_process_ended(&engine, &instance);
    }

    #[test]
    fn test_guard_violation_aborts_the_start() {
        let (engine, mut session) = deployed_session();
        // Collaborator forgets the contract id, violating the load step's
        // postconditions.
        engine.register_behavior(
            LOAD_CONTRACT_DATA,
            |execution: &dyn Execution| -> Result<(), ServiceError> {
                execution.set_variable(IS_AUTOMATIC, json!(true));
                Ok(())
            },
        );
        mock_process_contract(&engine, false);

        let err = session.start_by_key(CONTRACT_PROCESS, None).unwrap_err();

        assert!(matches!(err, FlowguardError::ContractViolation(_)));
        let message = err.to_string();
        assert!(message.contains(LOAD_CONTRACT));
        assert!(message.contains(CONTRACT_ID));
        assert!(session.current_instance().is_none());
    }

    #[test]
    fn test_suppressed_guard_lets_the_broken_collaborator_through() {
        let (engine, mut session) = deployed_session();
        engine.register_behavior(
            LOAD_CONTRACT_DATA,
            |execution: &dyn Execution| -> Result<(), ServiceError> {
                execution.set_variable(IS_AUTOMATIC, json!(true));
                Ok(())
            },
        );
        mock_process_contract(&engine, false);

        let instance = session
            .start_by_key(
                CONTRACT_PROCESS,
                Some(with_variables([(SKIP_GUARDS_VARIABLE, json!(true))])),
            )
            .unwrap();

        assert_has_passed(&engine, &instance, PROCESS_AUTOMATICALLY);
        assert_process_ended(&engine, &instance);
    }

    #[test]
    fn test_undeploy_resets_registered_mocks() {
        let (engine, mut session) = deployed_session();
        mock_load_contract(&engine, true);
        mock_process_contract(&engine, false);

        session.undeploy().unwrap();
        session.deploy(&[CONTRACT_RESOURCE]).unwrap();

        // The behaviour registry was cleared, so the load step cannot
        // resolve its collaborator any more.
        let err = session.start_by_key(CONTRACT_PROCESS, None).unwrap_err();
        assert!(matches!(err, FlowguardError::Engine(_)));
    }
}
