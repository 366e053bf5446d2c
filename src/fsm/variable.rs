//! Typed auxiliary data values for machines.
//!
//! Machines carry a lazily created map from string keys to [`Variable`] trait
//! objects. [`Var`] is the stock implementation wrapping any `Default` value.
//! Overwriting a key simply drops the previous value; an object pool could be
//! plugged in behind this trait if allocation ever shows up in a profile.

use std::any::{Any, type_name};

/// Capability of a value stored in a machine's data map.
pub trait Variable: Any {
    /// Human-readable type name, for logs and debugging.
    fn type_name(&self) -> &'static str;

    /// Downcasting access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcasting access.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Reset the value to its default.
    fn clear(&mut self);
}

/// Generic variable wrapping a single value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Var<T> {
    value: T,
}

impl<T: Default + 'static> Var<T> {
    /// Wrap a value.
    pub fn new(value: T) -> Self {
        Var { value }
    }

    /// Read the wrapped value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the wrapped value.
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// Take the wrapped value out, leaving the default behind.
    pub fn take(&mut self) -> T {
        std::mem::take(&mut self.value)
    }
}

impl<T: Default + 'static> Variable for Var<T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clear(&mut self) {
        self.value = T::default();
    }
}
