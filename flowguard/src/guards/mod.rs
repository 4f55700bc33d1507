//! Pre- and postcondition guards for workflow activities.
//!
//! A [`Guard`] carries the checks; [`ActivityGuard`] and [`TaskGuard`] adapt
//! it to the engine's two listener shapes; [`dispatch`] maps lifecycle event
//! names to the matching check and honors the suppression variable.

mod dispatch;
mod guard;
mod listeners;
mod variables;

pub use dispatch::{dispatch, skip_guards, GuardPhase, LifecycleEvent, SKIP_GUARDS_VARIABLE};
pub use guard::Guard;
pub use listeners::{ActivityGuard, TaskGuard};
pub use variables::{check_is_set, check_is_set_global, check_is_set_local, ScopePolicy};
