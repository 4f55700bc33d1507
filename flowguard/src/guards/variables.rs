//! Variable presence checks for guard conditions.
//!
//! Pure predicates over the execution's two-tier variable store; no side
//! effects.

use crate::engine::Execution;
use crate::errors::{ContractViolationError, FlowguardError, InvalidArgumentError};

/// The variable scope a presence check inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopePolicy {
    /// Present iff the local-scope lookup returns a value.
    Local,
    /// Present iff the inherited lookup (falling back through ancestor
    /// scopes) returns a value.
    Global,
    /// Present iff either lookup returns a value. The common case.
    Either,
}

impl ScopePolicy {
    /// Checks that a variable is set under this policy.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgumentError`] for an empty variable name and
    /// [`ContractViolationError`] naming the current activity and the
    /// variable when the check fails.
    pub fn check(self, execution: &dyn Execution, name: &str) -> Result<(), FlowguardError> {
        // Validated before touching the execution.
        if name.is_empty() {
            return Err(InvalidArgumentError::new("Variable name must not be empty").into());
        }

        let (present, description) = match self {
            Self::Local => (execution.variable_local(name).is_some(), "local variable"),
            Self::Global => (execution.variable(name).is_some(), "global variable"),
            Self::Either => (
                execution.variable_local(name).is_some() || execution.variable(name).is_some(),
                "variable",
            ),
        };

        if present {
            Ok(())
        } else {
            Err(ContractViolationError::new(
                execution.current_activity_id(),
                format!("{description} '{name}' is not set"),
            )
            .into())
        }
    }
}

/// Checks that a variable is set at any visible scope.
///
/// # Errors
///
/// See [`ScopePolicy::check`].
pub fn check_is_set(execution: &dyn Execution, name: &str) -> Result<(), FlowguardError> {
    ScopePolicy::Either.check(execution, name)
}

/// Checks that a variable is set in the local scope.
///
/// # Errors
///
/// See [`ScopePolicy::check`].
pub fn check_is_set_local(execution: &dyn Execution, name: &str) -> Result<(), FlowguardError> {
    ScopePolicy::Local.check(execution, name)
}

/// Checks that a variable is set in the inherited scope.
///
/// # Errors
///
/// See [`ScopePolicy::check`].
pub fn check_is_set_global(execution: &dyn Execution, name: &str) -> Result<(), FlowguardError> {
    ScopePolicy::Global.check(execution, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestExecution;
    use serde_json::json;

    #[test]
    fn test_check_is_set_sees_inherited_scope() {
        let execution = TestExecution::new("loadContract").with_inherited("contractId", json!("x"));

        check_is_set(&execution, "contractId").unwrap();

        let err = check_is_set(&execution, "isAutomatic").unwrap_err();
        assert!(matches!(err, FlowguardError::ContractViolation(_)));
    }

    #[test]
    fn test_check_is_set_sees_local_scope() {
        let execution = TestExecution::new("loadContract").with_local("contractId", json!("x"));
        check_is_set(&execution, "contractId").unwrap();
    }

    #[test]
    fn test_scope_restriction() {
        let execution = TestExecution::new("loadContract").with_inherited("contractId", json!("x"));

        // Inherited-only values must fail the local check and pass the
        // global one.
        assert!(check_is_set_local(&execution, "contractId").is_err());
        check_is_set_global(&execution, "contractId").unwrap();

        let local_only = TestExecution::new("loadContract").with_local("draft", json!(true));
        check_is_set_local(&local_only, "draft").unwrap();
    }

    #[test]
    fn test_empty_name_is_invalid_argument() {
        let execution = TestExecution::new("loadContract");
        let err = check_is_set(&execution, "").unwrap_err();
        assert!(matches!(err, FlowguardError::InvalidArgument(_)));
    }

    #[test]
    fn test_violation_names_activity_and_variable() {
        let execution = TestExecution::new("loadContract");
        let err = check_is_set(&execution, "contractId").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("loadContract"));
        assert!(message.contains("contractId"));
    }
}
