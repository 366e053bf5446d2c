//! Error types for the framework runtime.
//!
//! All failures are raised synchronously to the immediate caller; there is no
//! background recovery or retry. The host frame loop decides whether to log
//! and continue or abort the frame.

use thiserror::Error;

/// Errors raised by [`Fsm`](crate::fsm::machine::Fsm) and
/// [`FsmManager`](crate::fsm::manager::FsmManager) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    /// The owner handle given to `Fsm::create` no longer points to a live
    /// value.
    #[error("FSM owner is invalid (already dropped)")]
    InvalidOwner,

    /// A machine needs at least one state.
    #[error("FSM '{0}' needs a non-empty state set")]
    EmptyStates(String),

    /// Two supplied states resolved to the same key.
    #[error("FSM '{fsm}' state '{state}' is already registered")]
    DuplicateState {
        /// Machine name.
        fsm: String,
        /// Display name of the offending state key.
        state: &'static str,
    },

    /// The requested state key is not in the machine's state map.
    #[error("FSM '{fsm}' has no state '{state}'")]
    StateNotFound {
        /// Machine name.
        fsm: String,
        /// Display name of the missing state key.
        state: &'static str,
    },

    /// `start` was called while a state is already current.
    #[error("FSM '{0}' is running, can not start again")]
    AlreadyRunning(String),

    /// `change_state` was called before `start`.
    #[error("FSM '{0}' is not running, current state is invalid")]
    NotRunning(String),

    /// The machine has been cleared and can no longer be operated.
    #[error("FSM '{0}' is destroyed")]
    Destroyed(String),

    /// Auxiliary data keys must be non-empty.
    #[error("FSM data name is invalid (empty)")]
    EmptyDataName,

    /// A machine with the same (owner type, name) key is already registered
    /// in the manager.
    #[error("FSM '{0}' already exists in the manager")]
    DuplicateFsm(String),
}
