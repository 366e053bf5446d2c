//! Module capability for frame-driven subsystems.
//!
//! A module is a process-wide subsystem that wants one `update` call per host
//! frame and an ordered `shutdown` at framework teardown. Modules are created
//! lazily by [`Framework::module`](crate::framework::Framework::module) and
//! owned exclusively by the framework's registry.

/// Default priority for modules that do not override [`Module::priority`].
pub const DEFAULT_MODULE_PRIORITY: i32 = 0;

/// Capability implemented by every frame-driven subsystem.
///
/// Higher-priority modules are ticked first on every frame. Shutdown runs in
/// the registry's current order; see `DESIGN.md` for the ordering decision.
pub trait Module {
    /// Relative tick priority. Higher values run earlier on `update`.
    fn priority(&self) -> i32 {
        DEFAULT_MODULE_PRIORITY
    }

    /// Per-frame tick.
    ///
    /// `elapsed` is the scaled (logical) delta in seconds, `real_elapsed` the
    /// unscaled wall-clock delta. Both come from the host's frame clock.
    fn update(&mut self, elapsed: f32, real_elapsed: f32);

    /// Tear down the module. Called exactly once, at framework shutdown.
    fn shutdown(&mut self);
}
