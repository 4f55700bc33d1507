//! Event classification and guard dispatch.
//!
//! Both guard variants route through [`dispatch`]; the event-name mapping
//! lives here and nowhere else.

use super::Guard;
use crate::engine::Execution;
use crate::errors::FlowguardError;

/// Reserved variable name suppressing all guard checks for an execution
/// subtree.
///
/// This is the only wire-level contract of the guard framework. The name
/// lives in the same namespace as business variables, so processes must not
/// use it for their own data.
pub const SKIP_GUARDS_VARIABLE: &str = "runtimeSkipGuards";

/// A lifecycle event name, classified by exact case-insensitive lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// An activity started.
    Start,
    /// A user task was created.
    Create,
    /// An activity ended.
    End,
    /// A user task was completed.
    Complete,
    /// Any other event the guard framework does not care about.
    Other,
}

impl LifecycleEvent {
    /// Classifies a raw event name.
    #[must_use]
    pub fn from_event_name(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "create" => Self::Create,
            "end" => Self::End,
            "complete" => Self::Complete,
            _ => Self::Other,
        }
    }

    /// Returns the check phase this event maps to.
    #[must_use]
    pub const fn phase(self) -> GuardPhase {
        match self {
            Self::Start | Self::Create => GuardPhase::Precondition,
            Self::End | Self::Complete => GuardPhase::Postcondition,
            Self::Other => GuardPhase::Ignored,
        }
    }
}

/// The check phase a lifecycle event maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    /// Run the precondition check.
    Precondition,
    /// Run the postcondition check.
    Postcondition,
    /// Run no check; lifecycle listeners may fire for events the guard
    /// framework does not care about, and that is not an error.
    Ignored,
}

/// Returns true if guard checking is suppressed on this execution.
///
/// Evaluated fresh on every call; an absent or non-boolean value counts as
/// false.
#[must_use]
pub fn skip_guards(execution: &dyn Execution) -> bool {
    execution
        .variable(SKIP_GUARDS_VARIABLE)
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
}

/// Classifies `event_name` and invokes the matching check on `guard`.
///
/// Suppression is checked first; unrecognized events are a deliberate no-op.
///
/// # Errors
///
/// Any failure raised by the invoked check propagates unchanged. The engine
/// must interpret it as "abort the current transition".
pub fn dispatch(
    guard: &dyn Guard,
    event_name: &str,
    execution: &dyn Execution,
) -> Result<(), FlowguardError> {
    if skip_guards(execution) {
        return Ok(());
    }

    match LifecycleEvent::from_event_name(event_name).phase() {
        GuardPhase::Precondition => guard.check_preconditions(execution),
        GuardPhase::Postcondition => guard.check_postconditions(execution),
        GuardPhase::Ignored => Ok(()),
    }
}
