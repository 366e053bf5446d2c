//! Finite-state-machine runtime.
//!
//! This module groups the FSM runtime exposed to host code:
//!
//! - [`state`] – the [`FsmState`](state::FsmState) capability (five lifecycle
//!   callbacks) and the [`StateKey`](state::StateKey) contract for state maps
//! - [`machine`] – the [`Fsm`](machine::Fsm) container: current state, state
//!   time, auxiliary data, transitions
//! - [`variable`] – typed [`Variable`](variable::Variable) values stored in a
//!   machine's data map
//! - [`manager`] – the [`FsmManager`](manager::FsmManager) module that owns
//!   and ticks all machines

pub mod machine;
pub mod manager;
pub mod state;
pub mod variable;
