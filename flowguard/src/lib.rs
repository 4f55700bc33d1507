//! # Flowguard
//!
//! Behaviour-driven testing support for workflow engines.
//!
//! Flowguard provides the two pieces a BDD suite for a process engine needs:
//!
//! - **Guards**: pluggable precondition/postcondition checks attached to
//!   activity and user-task lifecycle events, with variable-scope predicates
//!   and a reserved suppression variable
//! - **Harness**: a per-scenario session tracking deployments, the current
//!   process instance, and the engine's virtual clock, with guaranteed
//!   teardown between scenarios
//!
//! The engine itself is an external collaborator, described by the traits in
//! [`engine`]; an in-memory double for tests ships in [`testing`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowguard::prelude::*;
//!
//! let mut session = EngineSession::new(engine);
//! session.deploy(&["contract-processing.bpmn"])?;
//! session.start_by_key("contract-processing", None)?;
//! assert!(session.has_running_instance());
//! session.undeploy()?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod engine;
pub mod errors;
pub mod guards;
pub mod harness;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::engine::{
        DeploymentId, Execution, ExecutionListener, ProcessEngine, ProcessInstance,
        ProcessInstanceId, TaskContext, TaskListener, VariableMap,
    };
    pub use crate::errors::{
        ContractViolationError, DeploymentError, FlowguardError, InvalidArgumentError,
        NotFoundError,
    };
    pub use crate::guards::{
        check_is_set, check_is_set_global, check_is_set_local, dispatch, skip_guards,
        ActivityGuard, Guard, GuardPhase, LifecycleEvent, ScopePolicy, TaskGuard,
        SKIP_GUARDS_VARIABLE,
    };
    pub use crate::harness::{parse_statement, with_variables, EngineSession};
}
