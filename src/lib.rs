//! Tickframe library.
//!
//! A frame-driven module registry and finite-state-machine runtime for games:
//! the host calls [`Framework::update`](framework::Framework::update) once per
//! frame, the framework ticks its modules in priority order, and the
//! [`FsmManager`](fsm::manager::FsmManager) module forwards the tick to every
//! live state machine.
//!
//! This crate exposes the runtime for use in integration tests, the demo
//! binary, and as a reusable library.

pub mod clock;
pub mod config;
pub mod error;
pub mod framework;
pub mod fsm;
pub mod game;
pub mod module;
