//! Module Test Utilities
//!
//! Configurable mock modules and a shared journal recording every hook call,
//! so tests can assert on lifecycle ordering.

use crate::module::error::HookResult;
use crate::module::manager::ModuleManager;
use crate::module::slot::{AnySlot, Capabilities, Slot, SlotKind, Slots};
use crate::module::traits::Module;
use crate::module::types::{ModuleState, ModuleType};
use std::sync::{Arc, Mutex};

/// Ordered record of hook invocations shared between mocks
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events.lock().unwrap().iter().any(|e| e == event)
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == event)
    }

    /// Whether `first` was recorded strictly before `second`
    pub fn before(&self, first: &str, second: &str) -> bool {
        match (self.position(first), self.position(second)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }
}

/// Mock module; `N` gives every mock its own type (and thus registry key)
pub struct MockModule<const N: usize> {
    journal: Journal,
    slots: Vec<(SlotKind, Box<dyn AnySlot>)>,
    fail_init: bool,
    fail_load: bool,
    fail_save: bool,
    fail_start: bool,
    fail_stop: bool,
}

impl<const N: usize> MockModule<N> {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            slots: Vec::new(),
            fail_init: false,
            fail_load: false,
            fail_save: false,
            fail_start: false,
            fail_stop: false,
        }
    }

    pub fn depends_on<T: ?Sized + Send + Sync + 'static>(mut self) -> Self {
        self.slots
            .push((SlotKind::Dependency, Box::new(Slot::<T>::new())));
        self
    }

    pub fn uses<T: ?Sized + Send + Sync + 'static>(mut self) -> Self {
        self.slots.push((SlotKind::Use, Box::new(Slot::<T>::new())));
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn failing_save(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Number of filled use slots
    pub fn uses_set(&self) -> usize {
        self.slots
            .iter()
            .filter(|(kind, slot)| *kind == SlotKind::Use && slot.is_set())
            .count()
    }

    fn hook(&self, hook: &str, fail: bool) -> HookResult {
        self.journal.record(format!("{}:{}", self.name(), hook));
        if fail {
            return Err(format!("mock {} failure", hook).into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<const N: usize> Module for MockModule<N> {
    async fn init(&self) -> HookResult {
        self.hook("init", self.fail_init)?;
        let unset = self
            .slots
            .iter()
            .any(|(kind, slot)| *kind == SlotKind::Dependency && !slot.is_set());
        if unset {
            return Err("initialized before its dependencies were injected".into());
        }
        Ok(())
    }

    async fn load(&self) -> HookResult {
        self.hook("load", self.fail_load)
    }

    async fn save(&self) -> HookResult {
        self.hook("save", self.fail_save)
    }

    async fn start(&self) -> HookResult {
        self.hook("start", self.fail_start)
    }

    async fn stop(&self) -> HookResult {
        self.hook("stop", self.fail_stop)
    }

    fn name(&self) -> String {
        format!("Mock{}", N)
    }

    fn declare<'a>(&'a self, slots: &mut Slots<'a>) {
        for (kind, slot) in &self.slots {
            match kind {
                SlotKind::Dependency => slots.depends(slot.as_ref()),
                SlotKind::Use => slots.uses(slot.as_ref()),
            };
        }
    }
}

/// Capability interface used to test injection by interface
pub trait Backend: Send + Sync {
    fn answer(&self) -> u32;
}

pub struct BackendModule {
    journal: Journal,
}

impl BackendModule {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl Backend for BackendModule {
    fn answer(&self) -> u32 {
        42
    }
}

#[async_trait::async_trait]
impl Module for BackendModule {
    async fn init(&self) -> HookResult {
        self.journal.record("Backend:init");
        Ok(())
    }

    async fn stop(&self) -> HookResult {
        self.journal.record("Backend:stop");
        Ok(())
    }

    fn provide(self: Arc<Self>, capabilities: &mut Capabilities) {
        capabilities.provide::<dyn Backend>(self);
    }
}

/// Depends on whatever module provides `dyn Backend`
pub struct Frontend {
    journal: Journal,
    backend: Slot<dyn Backend>,
}

impl Frontend {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            backend: Slot::new(),
        }
    }
}

#[async_trait::async_trait]
impl Module for Frontend {
    async fn init(&self) -> HookResult {
        let answer = self
            .backend
            .get()
            .map(|backend| backend.answer())
            .ok_or("backend not injected")?;
        self.journal.record(format!("Frontend:init:{}", answer));
        Ok(())
    }

    async fn stop(&self) -> HookResult {
        self.journal.record("Frontend:stop");
        Ok(())
    }

    fn declare<'a>(&'a self, slots: &mut Slots<'a>) {
        slots.depends(&self.backend);
    }
}

/// Queries the manager for peers from inside its own hooks
pub struct PeerProbe {
    journal: Journal,
    manager: Arc<ModuleManager>,
}

impl PeerProbe {
    pub fn new(journal: &Journal, manager: &Arc<ModuleManager>) -> Self {
        Self {
            journal: journal.clone(),
            manager: manager.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Module for PeerProbe {
    async fn start(&self) -> HookResult {
        let own_state = self.manager.state_of(ModuleType::of::<PeerProbe>());
        let peer = self.manager.get_module::<MockModule<1>>().is_some();
        self.journal.record(format!(
            "PeerProbe:start:{}:{}",
            own_state.map(|s| s.to_string()).unwrap_or_default(),
            peer
        ));
        if own_state == Some(ModuleState::Initialized) {
            Ok(())
        } else {
            Err("unexpected own state".into())
        }
    }
}
