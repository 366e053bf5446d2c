//! Machine ownership and frame polling.
//!
//! The [`FsmManager`] is a [`Module`] that owns a keyed collection of
//! machines, ticks every live one each frame, and mediates creation and
//! destruction. Keys derive from the owner's `TypeId` plus the instance name,
//! so one owner type can have several named machines.
//!
//! The manager runs at [`FSM_MANAGER_PRIORITY`], ahead of default-priority
//! modules.

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use rustc_hash::FxHashMap;

use crate::error::FsmError;
use crate::fsm::machine::{Fsm, FsmHandle};
use crate::fsm::state::{FsmState, StateKey};
use crate::module::Module;

/// Tick priority of the FSM manager, above [`DEFAULT_MODULE_PRIORITY`].
///
/// [`DEFAULT_MODULE_PRIORITY`]: crate::module::DEFAULT_MODULE_PRIORITY
pub const FSM_MANAGER_PRIORITY: i32 = 1;

/// Collection key: owner type plus instance name.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct FsmKey {
    owner: TypeId,
    name: String,
}

impl FsmKey {
    fn of<O: 'static>(name: impl Into<String>) -> Self {
        FsmKey {
            owner: TypeId::of::<O>(),
            name: name.into(),
        }
    }
}

/// One registered machine. Two handles to the same cell: an erased view for
/// ticking and an `Any` view for typed retrieval.
struct FsmEntry {
    erased: Rc<RefCell<dyn FsmHandle>>,
    concrete: Rc<dyn Any>,
}

/// Module owning all machines, keyed by (owner type, name).
#[derive(Default)]
pub struct FsmManager {
    fsms: FxHashMap<FsmKey, FsmEntry>,
}

impl FsmManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self {
            fsms: FxHashMap::default(),
        }
    }

    /// Number of registered machines.
    pub fn count(&self) -> usize {
        self.fsms.len()
    }

    /// Create a machine and register it under (owner type, `name`).
    ///
    /// Fails with [`FsmError::DuplicateFsm`] when the key is taken; creation
    /// errors from [`Fsm::create`] pass through. The machine holds only a
    /// non-owning handle to `owner`.
    pub fn create_fsm<O: 'static, K: StateKey>(
        &mut self,
        name: impl Into<String>,
        owner: &Rc<RefCell<O>>,
        states: Vec<Box<dyn FsmState<O, K>>>,
    ) -> Result<Rc<RefCell<Fsm<O, K>>>, FsmError> {
        let name = name.into();
        let key = FsmKey::of::<O>(name.clone());
        if self.fsms.contains_key(&key) {
            return Err(FsmError::DuplicateFsm(format!(
                "{}{}",
                type_name::<O>(),
                name
            )));
        }

        let fsm = Rc::new(RefCell::new(Fsm::create(
            name,
            Rc::downgrade(owner),
            states,
        )?));
        self.fsms.insert(
            key,
            FsmEntry {
                erased: fsm.clone(),
                concrete: fsm.clone(),
            },
        );
        Ok(fsm)
    }

    /// Destroy the machine registered under (owner type `O`, `name`).
    ///
    /// Returns whether a machine was found; an unknown key is not an error.
    pub fn destroy_fsm<O: 'static>(&mut self, name: &str) -> bool {
        let key = FsmKey::of::<O>(name);
        match self.fsms.remove(&key) {
            Some(entry) => {
                entry.erased.borrow_mut().shutdown();
                true
            }
            None => false,
        }
    }

    /// Typed lookup by owner type with an implicit empty instance name.
    ///
    /// Matches the reference framework's lookup, which derived its key from
    /// the owner type alone: a machine created with a non-empty name is not
    /// reachable here. Use [`FsmManager::get_fsm_named`] for those.
    pub fn get_fsm<O: 'static, K: StateKey>(&self) -> Option<Rc<RefCell<Fsm<O, K>>>> {
        self.get_fsm_named("")
    }

    /// Typed lookup by owner type and instance name.
    pub fn get_fsm_named<O: 'static, K: StateKey>(
        &self,
        name: &str,
    ) -> Option<Rc<RefCell<Fsm<O, K>>>> {
        let key = FsmKey::of::<O>(name);
        self.fsms
            .get(&key)
            .and_then(|entry| entry.concrete.clone().downcast::<RefCell<Fsm<O, K>>>().ok())
    }

    /// Whether a machine is registered under (owner type `O`, `name`).
    pub fn has_fsm<O: 'static>(&self, name: &str) -> bool {
        self.fsms.contains_key(&FsmKey::of::<O>(name))
    }

    /// Erased handles to all registered machines, in no particular order.
    pub fn handles(&self) -> Vec<Rc<RefCell<dyn FsmHandle>>> {
        self.fsms.values().map(|e| e.erased.clone()).collect()
    }
}

impl Module for FsmManager {
    fn priority(&self) -> i32 {
        FSM_MANAGER_PRIORITY
    }

    /// Tick every machine not yet destroyed. Fine on an empty collection.
    fn update(&mut self, elapsed: f32, real_elapsed: f32) {
        for entry in self.fsms.values() {
            let mut fsm = entry.erased.borrow_mut();
            if fsm.is_destroyed() {
                continue;
            }
            fsm.update(elapsed, real_elapsed);
        }
    }

    /// Clear every machine, then drop the collection.
    fn shutdown(&mut self) {
        debug!("FSM manager shutting down {} machines", self.fsms.len());
        for entry in self.fsms.values() {
            entry.erased.borrow_mut().shutdown();
        }
        self.fsms.clear();
    }
}
