//! State capability and state-key contract.
//!
//! Each behavior of a machine implements [`FsmState`] and reports its key, an
//! enum discriminant defined by the host per FSM family. Keys replace the
//! stringified type names of reflection-based designs: the map key is a plain
//! `Copy` value and the compiler checks exhaustiveness wherever the host
//! matches on it.

use std::fmt;
use std::hash::Hash;

use crate::fsm::machine::Fsm;

/// Key identifying one state within a machine's state map.
///
/// Implemented by a host-defined enum, one per FSM family:
///
/// ```ignore
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum PlayerStateKey { Idle, Moving }
///
/// impl StateKey for PlayerStateKey {
///     fn name(&self) -> &'static str {
///         match self {
///             PlayerStateKey::Idle => "Idle",
///             PlayerStateKey::Moving => "Moving",
///         }
///     }
/// }
/// ```
pub trait StateKey: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Display name of the key, used in logs and error messages.
    fn name(&self) -> &'static str;
}

/// One behavior variant of a machine.
///
/// Lifecycle callbacks are invoked by the owning [`Fsm`]; all default to
/// no-ops so a state only implements what it needs. `O` is the owner type the
/// machine is bound to, `K` the key family.
///
/// A state requests a transition by calling
/// [`Fsm::change_state`] on the machine it is handed. From inside a callback
/// the request is deferred and applied once the callback returns, so the
/// machine is never observed half-transitioned. Requesting a transition from
/// `on_leave` when `is_shutdown` is true is pointless (the machine is being
/// torn down) and must be avoided.
#[allow(unused_variables)]
pub trait FsmState<O: 'static, K: StateKey> {
    /// Key under which this state registers in the machine's state map.
    fn key(&self) -> K;

    /// Called exactly once when the machine is created.
    fn on_init(&mut self, fsm: &mut Fsm<O, K>) {}

    /// Called every time this state becomes current.
    fn on_enter(&mut self, fsm: &mut Fsm<O, K>) {}

    /// Called once per tick while this state is current.
    fn on_update(&mut self, fsm: &mut Fsm<O, K>, elapsed: f32, real_elapsed: f32) {}

    /// Called when this state stops being current.
    ///
    /// `is_shutdown` is false for a normal transition and true when the
    /// machine is being cleared.
    fn on_leave(&mut self, fsm: &mut Fsm<O, K>, is_shutdown: bool) {}

    /// Called exactly once when the machine is cleared, whether or not this
    /// state was ever current.
    fn on_destroy(&mut self, fsm: &mut Fsm<O, K>) {}
}
