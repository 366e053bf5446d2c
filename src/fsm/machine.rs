//! The finite state machine container.
//!
//! A [`Fsm`] binds one owner value to a set of mutually exclusive states,
//! tracks which state is current and for how long, and carries a keyed map of
//! auxiliary [`Variable`] data. Machines are usually created and ticked
//! through the [`FsmManager`](crate::fsm::manager::FsmManager) module, but are
//! fully usable standalone.
//!
//! # Transition semantics
//!
//! `change_state` applied from host code runs leave → enter immediately.
//! Called from inside a lifecycle callback, the request is recorded and
//! applied as soon as the callback returns, still within the same `update` or
//! `start` call. `clear` requested from inside a callback is deferred the
//! same way and wins over any pending transition. Either way no caller ever
//! observes a half-transitioned machine, and `current_state_time` restarts
//! from zero on every transition.

use std::any::type_name;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::debug;
use rustc_hash::FxHashMap;

use crate::error::FsmError;
use crate::fsm::state::{FsmState, StateKey};
use crate::fsm::variable::Variable;

/// Type-erased view of a machine, used by the manager to hold machines with
/// different owner and key types in one collection.
pub trait FsmHandle {
    /// Instance name the machine was created with (may be empty).
    fn name(&self) -> &str;

    /// Type name of the owner, for diagnostics.
    fn owner_type_name(&self) -> &'static str;

    /// Owner type name concatenated with the instance name.
    fn full_name(&self) -> String;

    /// Number of registered states.
    fn state_count(&self) -> usize;

    /// Whether a state is current.
    fn is_running(&self) -> bool;

    /// Whether the machine has been cleared.
    fn is_destroyed(&self) -> bool;

    /// Display name of the current state, if any.
    fn current_state_name(&self) -> Option<&'static str>;

    /// Seconds accumulated in the current state.
    fn current_state_time(&self) -> f32;

    /// Per-tick poll; forwards to the current state.
    fn update(&mut self, elapsed: f32, real_elapsed: f32);

    /// Tear the machine down (leave current state, destroy all states).
    fn shutdown(&mut self);
}

/// A named state machine bound to one owner of type `O`, with states keyed by
/// `K`.
///
/// The machine holds a non-owning handle to its owner; the owner's lifetime
/// is the caller's responsibility. All state instances and auxiliary data
/// values are owned exclusively by the machine.
pub struct Fsm<O: 'static, K: StateKey> {
    name: String,
    owner: Weak<RefCell<O>>,
    states: FxHashMap<K, Box<dyn FsmState<O, K>>>,
    datas: Option<FxHashMap<String, Box<dyn Variable>>>,
    current: Option<K>,
    current_state_time: f32,
    /// Transition requested from inside a callback, applied when it returns.
    pending: Option<K>,
    /// Teardown requested from inside a callback, applied when it returns.
    pending_clear: bool,
    /// Key of the state currently checked out for a callback, if any.
    in_flight: Option<K>,
    destroyed: bool,
}

impl<O: 'static, K: StateKey> std::fmt::Debug for Fsm<O, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fsm")
            .field("name", &self.name)
            .field("states", &self.states.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .field("current_state_time", &self.current_state_time)
            .field("pending", &self.pending)
            .field("pending_clear", &self.pending_clear)
            .field("in_flight", &self.in_flight)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<O: 'static, K: StateKey> Fsm<O, K> {
    /// Create a machine from an owner handle and a non-empty set of states.
    ///
    /// Every supplied state receives exactly one `on_init`. Errors:
    /// [`FsmError::InvalidOwner`] when the owner has already been dropped,
    /// [`FsmError::EmptyStates`] on an empty set, and
    /// [`FsmError::DuplicateState`] when two states share a key — in which
    /// case no state receives `on_init` at all.
    pub fn create(
        name: impl Into<String>,
        owner: Weak<RefCell<O>>,
        states: Vec<Box<dyn FsmState<O, K>>>,
    ) -> Result<Self, FsmError> {
        let name = name.into();
        if owner.strong_count() == 0 {
            return Err(FsmError::InvalidOwner);
        }
        if states.is_empty() {
            return Err(FsmError::EmptyStates(name));
        }

        let mut map: FxHashMap<K, Box<dyn FsmState<O, K>>> = FxHashMap::default();
        for state in states {
            let key = state.key();
            if map.insert(key, state).is_some() {
                return Err(FsmError::DuplicateState {
                    fsm: name,
                    state: key.name(),
                });
            }
        }

        let mut fsm = Fsm {
            name,
            owner,
            states: map,
            datas: None,
            current: None,
            current_state_time: 0.0,
            pending: None,
            pending_clear: false,
            in_flight: None,
            destroyed: false,
        };

        let keys: Vec<K> = fsm.states.keys().copied().collect();
        for key in keys {
            fsm.with_state(key, |state, fsm| state.on_init(fsm));
        }
        debug!(
            "FSM '{}' created with {} states",
            fsm.full_name(),
            fsm.states.len()
        );
        Ok(fsm)
    }

    /// Upgrade the owner handle. `None` once the owner has been dropped.
    pub fn owner(&self) -> Option<Rc<RefCell<O>>> {
        self.owner.upgrade()
    }

    /// Instance name the machine was created with (may be empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type name of the owner, for diagnostics.
    pub fn owner_type_name(&self) -> &'static str {
        type_name::<O>()
    }

    /// Owner type name concatenated with the instance name.
    pub fn full_name(&self) -> String {
        format!("{}{}", self.owner_type_name(), self.name)
    }

    /// Number of registered states.
    pub fn state_count(&self) -> usize {
        self.states.len() + usize::from(self.in_flight.is_some())
    }

    /// Whether a state is current.
    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the machine has been cleared.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Display name of the current state, if any.
    pub fn current_state_name(&self) -> Option<&'static str> {
        self.current.map(|key| key.name())
    }

    /// Seconds accumulated in the current state.
    pub fn current_state_time(&self) -> f32 {
        self.current_state_time
    }

    /// Key of the current state, if the machine is running.
    pub fn current_state(&self) -> Option<K> {
        self.current
    }

    /// Whether `key` is registered in this machine.
    pub fn has_state(&self, key: K) -> bool {
        self.states.contains_key(&key) || self.in_flight == Some(key)
    }

    /// All registered state keys, in no particular order.
    pub fn state_keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.states.keys().copied().collect();
        if let Some(k) = self.in_flight {
            keys.push(k);
        }
        keys
    }

    /// Start the machine in the state identified by `key`.
    ///
    /// The only valid transition out of the created state; may be called once.
    pub fn start(&mut self, key: K) -> Result<(), FsmError> {
        if self.destroyed {
            return Err(FsmError::Destroyed(self.name.clone()));
        }
        if self.is_running() {
            return Err(FsmError::AlreadyRunning(self.name.clone()));
        }
        if !self.has_state(key) {
            return Err(FsmError::StateNotFound {
                fsm: self.name.clone(),
                state: key.name(),
            });
        }

        debug!("FSM '{}' starting in {:?}", self.full_name(), key);
        self.current_state_time = 0.0;
        self.current = Some(key);
        self.with_state(key, |state, fsm| state.on_enter(fsm));
        self.drain_pending();
        Ok(())
    }

    /// Switch the current state to the one identified by `key`.
    ///
    /// From host code the transition (leave → enter) runs before this call
    /// returns. From inside a lifecycle callback it is deferred until the
    /// callback returns; if a callback requests several transitions, the last
    /// request wins.
    pub fn change_state(&mut self, key: K) -> Result<(), FsmError> {
        if self.destroyed {
            return Err(FsmError::Destroyed(self.name.clone()));
        }
        if self.current.is_none() {
            return Err(FsmError::NotRunning(self.name.clone()));
        }
        if !self.has_state(key) {
            return Err(FsmError::StateNotFound {
                fsm: self.name.clone(),
                state: key.name(),
            });
        }

        if self.in_flight.is_some() {
            self.pending = Some(key);
        } else {
            self.apply_transition(key);
        }
        Ok(())
    }

    /// Accumulate elapsed time and tick the current state.
    ///
    /// No-op while the machine is not running or after it has been cleared.
    pub fn update(&mut self, elapsed: f32, real_elapsed: f32) {
        if self.destroyed {
            return;
        }
        let Some(current) = self.current else {
            return;
        };
        self.current_state_time += elapsed;
        self.with_state(current, |state, fsm| {
            state.on_update(fsm, elapsed, real_elapsed)
        });
        self.drain_pending();
    }

    /// Tear the machine down.
    ///
    /// The current state (if any) leaves with `is_shutdown = true`, then every
    /// registered state receives `on_destroy`, all auxiliary data is dropped,
    /// and the machine is marked destroyed. Idempotent. Requested from inside
    /// a lifecycle callback, teardown is deferred until the callback returns
    /// so no state misses its `on_destroy`.
    pub fn clear(&mut self) {
        if self.destroyed {
            return;
        }
        if self.in_flight.is_some() {
            self.pending_clear = true;
            return;
        }
        self.clear_now();
    }

    fn clear_now(&mut self) {
        debug!("FSM '{}' clearing", self.full_name());
        if let Some(current) = self.current {
            self.with_state(current, |state, fsm| state.on_leave(fsm, true));
        }
        // Transition requests from a leave/destroy callback are void here.
        self.pending = None;
        self.pending_clear = false;

        let keys: Vec<K> = self.states.keys().copied().collect();
        for key in keys {
            self.with_state(key, |state, fsm| state.on_destroy(fsm));
        }
        self.states.clear();
        self.datas = None;
        self.current = None;
        self.current_state_time = 0.0;
        self.pending_clear = false;
        self.owner = Weak::new();
        self.destroyed = true;
    }

    // ---------------- auxiliary data ----------------

    /// Whether a data value is stored under `name`.
    pub fn has_data(&self, name: &str) -> Result<bool, FsmError> {
        if name.is_empty() {
            return Err(FsmError::EmptyDataName);
        }
        Ok(self
            .datas
            .as_ref()
            .is_some_and(|datas| datas.contains_key(name)))
    }

    /// Read a typed data value stored under `name`.
    pub fn data<V: Variable>(&self, name: &str) -> Result<Option<&V>, FsmError> {
        if name.is_empty() {
            return Err(FsmError::EmptyDataName);
        }
        Ok(self
            .datas
            .as_ref()
            .and_then(|datas| datas.get(name))
            .and_then(|var| var.as_any().downcast_ref::<V>()))
    }

    /// Mutably read a typed data value stored under `name`.
    pub fn data_mut<V: Variable>(&mut self, name: &str) -> Result<Option<&mut V>, FsmError> {
        if name.is_empty() {
            return Err(FsmError::EmptyDataName);
        }
        Ok(self
            .datas
            .as_mut()
            .and_then(|datas| datas.get_mut(name))
            .and_then(|var| var.as_any_mut().downcast_mut::<V>()))
    }

    /// Store a data value under `name`, dropping any previous value.
    pub fn set_data<V: Variable>(&mut self, name: impl Into<String>, data: V) -> Result<(), FsmError> {
        let name = name.into();
        if name.is_empty() {
            return Err(FsmError::EmptyDataName);
        }
        self.datas
            .get_or_insert_with(FxHashMap::default)
            .insert(name, Box::new(data));
        Ok(())
    }

    /// Remove the data value stored under `name`. `Ok(false)` when absent.
    pub fn remove_data(&mut self, name: &str) -> Result<bool, FsmError> {
        if name.is_empty() {
            return Err(FsmError::EmptyDataName);
        }
        Ok(self
            .datas
            .as_mut()
            .is_some_and(|datas| datas.remove(name).is_some()))
    }

    // ---------------- internals ----------------

    /// Run a callback with `key`'s state checked out of the map, so the
    /// callback can receive `&mut self` without aliasing the state.
    fn with_state<R>(
        &mut self,
        key: K,
        f: impl FnOnce(&mut dyn FsmState<O, K>, &mut Self) -> R,
    ) -> Option<R> {
        let mut state = self.states.remove(&key)?;
        let previous = self.in_flight.replace(key);
        let result = f(state.as_mut(), self);
        self.in_flight = previous;
        self.states.insert(key, state);
        Some(result)
    }

    /// Leave the current state, switch to `next`, enter it. Loops while the
    /// entered state immediately requests another transition. A teardown
    /// requested by a callback in the sequence wins over further transitions.
    fn apply_transition(&mut self, mut next: K) {
        loop {
            if let Some(current) = self.current {
                debug!("FSM '{}' {:?} -> {:?}", self.full_name(), current, next);
                self.with_state(current, |state, fsm| state.on_leave(fsm, false));
                if self.pending_clear {
                    break;
                }
            }
            self.current_state_time = 0.0;
            self.current = Some(next);
            self.with_state(next, |state, fsm| state.on_enter(fsm));
            if self.pending_clear {
                break;
            }
            match self.pending.take() {
                Some(key) => next = key,
                None => break,
            }
        }
        if self.pending_clear {
            self.pending = None;
            self.clear_now();
        }
    }

    /// Apply a transition or teardown deferred from inside a callback, if any.
    fn drain_pending(&mut self) {
        if self.pending_clear {
            self.pending = None;
            self.clear_now();
            return;
        }
        if let Some(next) = self.pending.take() {
            self.apply_transition(next);
        }
    }
}

impl<O: 'static, K: StateKey> FsmHandle for Fsm<O, K> {
    fn name(&self) -> &str {
        Fsm::name(self)
    }

    fn owner_type_name(&self) -> &'static str {
        Fsm::owner_type_name(self)
    }

    fn full_name(&self) -> String {
        Fsm::full_name(self)
    }

    fn state_count(&self) -> usize {
        Fsm::state_count(self)
    }

    fn is_running(&self) -> bool {
        Fsm::is_running(self)
    }

    fn is_destroyed(&self) -> bool {
        Fsm::is_destroyed(self)
    }

    fn current_state_name(&self) -> Option<&'static str> {
        Fsm::current_state_name(self)
    }

    fn current_state_time(&self) -> f32 {
        Fsm::current_state_time(self)
    }

    fn update(&mut self, elapsed: f32, real_elapsed: f32) {
        Fsm::update(self, elapsed, real_elapsed);
    }

    fn shutdown(&mut self) {
        self.clear();
    }
}
