//! Module Trait
//!
//! The contract every pluggable unit implements. The engine only ever calls
//! the five lifecycle hooks, `name`, and the two declaration methods
//! (`declare` for slots, `provide` for capabilities).
//!
//! # Lifecycle
//!
//! ```text
//! add_module ──► Constructed ──init+load──► Initialized ──start──► Started ──save+stop──► Stopped
//!                     │
//!                     └── init fails: record discarded, a new instance is needed to retry
//! ```
//!
//! Hard dependency slots are filled before `init`. Soft use slots are only
//! filled once the module is initialized and may stay empty for good.

use crate::module::error::HookResult;
use crate::module::slot::{Capabilities, Slots};
use crate::module::types::short_type_name;
use std::sync::Arc;

/// Base trait that all modules implement
///
/// Hooks take `&self` because an instance is shared with every module that
/// depends on it; modules keep mutable state behind their own locks.
#[async_trait::async_trait]
pub trait Module: Send + Sync + 'static {
    /// Called once to initialize the module
    ///
    /// An error here is fatal for this instance: it is removed from the
    /// manager and can never be initialized again.
    async fn init(&self) -> HookResult {
        Ok(())
    }

    /// Load configuration/data; called after `init` and again on `load_all`
    ///
    /// A failure is logged and the module is still considered working.
    async fn load(&self) -> HookResult {
        Ok(())
    }

    /// Save configuration/data; called before `stop` and on `save_all`
    ///
    /// A failure is logged and the module is still considered working.
    async fn save(&self) -> HookResult {
        Ok(())
    }

    /// Called once after `init` and `load`
    async fn start(&self) -> HookResult {
        Ok(())
    }

    async fn stop(&self) -> HookResult {
        Ok(())
    }

    /// Display name used in logs; defaults to the short type name
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Declare the module's dependency and use slots
    fn declare<'a>(&'a self, _slots: &mut Slots<'a>) {}

    /// Advertise capability interfaces this module can be injected as
    ///
    /// The concrete module type is always provided; override this to also
    /// provide e.g. `capabilities.provide::<dyn Storage>(self)`.
    fn provide(self: Arc<Self>, _capabilities: &mut Capabilities) {}

    /// Log an info message in the name of this module
    fn log_info(&self, msg: &str) {
        log::info!("[{}] {}", self.name(), msg);
    }

    /// Log a warning in the name of this module
    fn log_warning(&self, msg: &str) {
        log::warn!("[{}] {}", self.name(), msg);
    }

    /// Log an error in the name of this module
    fn log_error(&self, msg: &str) {
        log::error!("[{}] {}", self.name(), msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::slot::{AnySlot, Slot, SlotKind};
    use crate::module::types::ModuleType;

    trait Speaker: Send + Sync {
        fn speak(&self) -> &'static str;
    }

    struct Loud;

    impl Speaker for Loud {
        fn speak(&self) -> &'static str {
            "HEY"
        }
    }

    #[async_trait::async_trait]
    impl Module for Loud {
        fn provide(self: Arc<Self>, capabilities: &mut Capabilities) {
            capabilities.provide::<dyn Speaker>(self);
        }
    }

    struct Listener {
        speaker: Slot<dyn Speaker>,
        echo: Slot<Loud>,
    }

    #[async_trait::async_trait]
    impl Module for Listener {
        async fn init(&self) -> HookResult {
            if self.speaker.is_set() {
                Ok(())
            } else {
                Err("speaker missing".into())
            }
        }

        fn name(&self) -> String {
            "listener".to_string()
        }

        fn declare<'a>(&'a self, slots: &mut Slots<'a>) {
            slots.depends(&self.speaker).uses(&self.echo);
        }
    }

    #[test]
    fn test_default_name_is_short_type_name() {
        assert_eq!(Loud.name(), "Loud");
    }

    #[tokio::test]
    async fn test_default_hooks_succeed() {
        let module = Loud;
        assert!(module.init().await.is_ok());
        assert!(module.load().await.is_ok());
        assert!(module.start().await.is_ok());
        assert!(module.save().await.is_ok());
        assert!(module.stop().await.is_ok());
    }

    #[tokio::test]
    async fn test_declared_slots_and_provided_capabilities() {
        let listener = Listener {
            speaker: Slot::new(),
            echo: Slot::new(),
        };
        assert_eq!(listener.name(), "listener");
        assert!(listener.init().await.is_err());

        let mut capabilities = Capabilities::new();
        let loud = Arc::new(Loud);
        capabilities.provide::<Loud>(loud.clone());
        loud.provide(&mut capabilities);
        assert!(capabilities.provides(ModuleType::of::<dyn Speaker>()));

        let mut slots = Slots::new();
        listener.declare(&mut slots);
        for slot in slots.of_kind(SlotKind::Dependency) {
            assert!(slot.offer(&capabilities));
        }
        assert_eq!(listener.speaker.get().map(|s| s.speak()), Some("HEY"));
        assert!(!listener.echo.is_set());
        assert!(listener.init().await.is_ok());
    }
}
