//! Framework context and priority-ordered module registry.
//!
//! The [`Framework`] is the host-facing entry point of the runtime: it owns a
//! [`ModuleRegistry`], lazily constructs modules on first request, and drives
//! `update`/`shutdown` across all of them once per frame. It is an explicitly
//! constructed value, not a global, so independent instances can coexist
//! (tests build throwaway frameworks freely).
//!
//! # Frame flow
//!
//! ```text
//! host frame loop
//!   └─ Framework::update(elapsed, real_elapsed)
//!        └─ each module, highest priority first
//!             └─ Module::update(elapsed, real_elapsed)
//! ```
//!
//! None of this is reentrant: calling back into the framework from inside a
//! module's `update` or `shutdown` will panic on the module's `RefCell`.

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use smallvec::SmallVec;

use crate::module::Module;

/// One registered module. Two handles to the same cell: a `dyn Module` view
/// for ticking and a `dyn Any` view for typed lookup.
struct ModuleEntry {
    type_id: TypeId,
    type_name: &'static str,
    priority: i32,
    module: Rc<RefCell<dyn Module>>,
    lookup: Rc<dyn Any>,
}

/// Ordered set of active modules, descending by priority at insertion time.
///
/// Insertion is stable for equal priorities: a new entry lands after all
/// existing entries of the same priority, before the first entry of strictly
/// lower priority. At most one entry per concrete module type exists at a
/// time (enforced by [`Framework::module`]'s lookup-before-create).
#[derive(Default)]
pub struct ModuleRegistry {
    entries: SmallVec<[ModuleEntry; 4]>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no modules.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a module at its priority-ordered position.
    pub fn insert<M: Module + 'static>(&mut self, module: Rc<RefCell<M>>) {
        let priority = module.borrow().priority();
        let entry = ModuleEntry {
            type_id: TypeId::of::<M>(),
            type_name: type_name::<M>(),
            priority,
            module: module.clone(),
            lookup: module,
        };
        let at = self
            .entries
            .iter()
            .position(|e| priority > e.priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, entry);
    }

    /// Typed lookup of a registered module.
    pub fn find<M: Module + 'static>(&self) -> Option<Rc<RefCell<M>>> {
        let type_id = TypeId::of::<M>();
        self.entries
            .iter()
            .find(|e| e.type_id == type_id)
            .and_then(|e| e.lookup.clone().downcast::<RefCell<M>>().ok())
    }

    /// Tick every module in registry order (highest priority first).
    pub fn update_all(&mut self, elapsed: f32, real_elapsed: f32) {
        for entry in self.entries.iter() {
            entry.module.borrow_mut().update(elapsed, real_elapsed);
        }
    }

    /// Shut down every module in registry order, then empty the registry.
    pub fn shutdown_all(&mut self) {
        for entry in self.entries.iter() {
            debug!("shutting down module {}", entry.type_name);
            entry.module.borrow_mut().shutdown();
        }
        self.entries.clear();
    }

    #[cfg(test)]
    fn priorities(&self) -> Vec<i32> {
        self.entries.iter().map(|e| e.priority).collect()
    }
}

/// Host-facing runtime context: lazily populated module registry plus the
/// per-frame drive and teardown operations.
#[derive(Default)]
pub struct Framework {
    registry: ModuleRegistry,
}

impl Framework {
    /// Create a framework with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: ModuleRegistry::new(),
        }
    }

    /// Get a module by type, constructing and registering it on first request.
    pub fn module<M: Module + Default + 'static>(&mut self) -> Rc<RefCell<M>> {
        if let Some(module) = self.registry.find::<M>() {
            debug!("module fetched: {}", type_name::<M>());
            return module;
        }
        debug!("module created: {}", type_name::<M>());
        let module = Rc::new(RefCell::new(M::default()));
        self.registry.insert(module.clone());
        module
    }

    /// Number of registered modules.
    pub fn module_count(&self) -> usize {
        self.registry.len()
    }

    /// Tick all modules. Intended to be called exactly once per host frame.
    pub fn update(&mut self, elapsed: f32, real_elapsed: f32) {
        self.registry.update_all(elapsed, real_elapsed);
    }

    /// Shut down and drop all modules. Intended to be called exactly once at
    /// the end of the process.
    pub fn shutdown(&mut self) {
        self.registry.shutdown_all();
    }
}
