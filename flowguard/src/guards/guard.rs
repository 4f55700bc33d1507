//! The guard capability.

use crate::engine::Execution;
use crate::errors::FlowguardError;

/// A pluggable precondition/postcondition checker for one activity or task.
///
/// Both checks default to no-ops: concrete guards override only the checks
/// relevant to their activity and are opt-in per condition. A failed check
/// must return [`crate::errors::ContractViolationError`] (or
/// [`crate::errors::InvalidArgumentError`] for malformed check calls); the
/// engine treats the failure as a fatal abort of the current transition.
pub trait Guard: Send + Sync {
    /// Checks preconditions at activity start / task creation.
    fn check_preconditions(&self, execution: &dyn Execution) -> Result<(), FlowguardError> {
        let _ = execution;
        Ok(())
    }

    /// Checks postconditions at activity end / task completion.
    fn check_postconditions(&self, execution: &dyn Execution) -> Result<(), FlowguardError> {
        let _ = execution;
        Ok(())
    }
}
