//! Module Engine
//!
//! Lifecycle management for pluggable modules: registration, dependency
//! injection through declared slots, dependency-ordered bring-up and
//! dependency-safe tear-down.

// Internal modules - all access should go through api module
pub(crate) mod error;
pub(crate) mod error_handling;
pub(crate) mod manager;
pub(crate) mod record;
pub(crate) mod registry;
pub(crate) mod slot;
pub(crate) mod traits;
pub(crate) mod types;

// Public API module - the only public interface for the module engine
pub mod api;

#[cfg(test)]
mod tests;
