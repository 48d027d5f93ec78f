//! Module Record
//!
//! Per-module runtime wrapper: owns the shared instance, its capabilities
//! and its lifecycle state, performs the state-guarded transitions and
//! answers dependency questions from the module's declared slots.

use crate::module::error::{ModuleError, ModuleResult};
use crate::module::error_handling::log_module_error_with_context;
use crate::module::slot::{AnySlot, Capabilities, SlotKind, Slots};
use crate::module::traits::Module;
use crate::module::types::{ModuleState, ModuleType};
use log::debug;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub struct ModuleRecord {
    module_type: ModuleType,
    name: String,
    module: Arc<dyn Module>,
    capabilities: Capabilities,
    state: Mutex<ModuleState>,
}

impl ModuleRecord {
    /// Wrap a freshly constructed module; no hooks are called
    pub fn new<M: Module>(module: M) -> Self {
        let module = Arc::new(module);
        let mut capabilities = Capabilities::new();
        capabilities.provide::<M>(module.clone());
        module.clone().provide(&mut capabilities);

        Self {
            module_type: ModuleType::of::<M>(),
            name: module.name(),
            module,
            capabilities,
            state: Mutex::new(ModuleState::Constructed),
        }
    }

    pub fn module_type(&self) -> ModuleType {
        self.module_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &Arc<dyn Module> {
        &self.module
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn state(&self) -> ModuleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: ModuleState) {
        debug!("Module '{}': {} -> {}", self.name, self.state(), state);
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn require_state(&self, expected: ModuleState, operation: &'static str) -> ModuleResult<()> {
        let state = self.state();
        if state != expected {
            return Err(ModuleError::IllegalState {
                module: self.name.clone(),
                operation,
                state,
            });
        }
        Ok(())
    }

    /// Initialize and load the module
    ///
    /// Requires `Constructed`. An `init` failure is returned and the caller
    /// must discard the record. A `load` failure is logged and the record
    /// still becomes `Initialized`.
    pub async fn initialize(&self) -> ModuleResult<()> {
        self.require_state(ModuleState::Constructed, "initialize")?;

        self.module
            .init()
            .await
            .map_err(|source| ModuleError::InitializationFailure {
                module: self.name.clone(),
                source,
            })?;

        if let Err(source) = self.module.load().await {
            let error = ModuleError::LoadFailure {
                module: self.name.clone(),
                source,
            };
            log_module_error_with_context(&error, "Loading module during initialization");
        }

        self.set_state(ModuleState::Initialized);
        Ok(())
    }

    /// Start the module; requires `Initialized`
    ///
    /// A failing `start` hook leaves the state unchanged.
    pub async fn start(&self) -> ModuleResult<()> {
        self.require_state(ModuleState::Initialized, "start")?;

        self.module
            .start()
            .await
            .map_err(|source| ModuleError::StartFailure {
                module: self.name.clone(),
                source,
            })?;

        self.set_state(ModuleState::Started);
        Ok(())
    }

    /// Save and stop the module; requires `Started`
    ///
    /// A `save` failure is logged and stopping proceeds. A failing `stop`
    /// hook leaves the state unchanged.
    pub async fn stop(&self) -> ModuleResult<()> {
        self.require_state(ModuleState::Started, "stop")?;

        if let Err(error) = self.save().await {
            log_module_error_with_context(&error, "Saving module before stop");
        }

        self.module
            .stop()
            .await
            .map_err(|source| ModuleError::StopFailure {
                module: self.name.clone(),
                source,
            })?;

        self.set_state(ModuleState::Stopped);
        Ok(())
    }

    /// Invoke the `load` hook of an initialized or started module
    pub async fn load(&self) -> ModuleResult<()> {
        self.require_active("load")?;
        self.module
            .load()
            .await
            .map_err(|source| ModuleError::LoadFailure {
                module: self.name.clone(),
                source,
            })
    }

    /// Invoke the `save` hook of an initialized or started module
    pub async fn save(&self) -> ModuleResult<()> {
        self.require_active("save")?;
        self.module
            .save()
            .await
            .map_err(|source| ModuleError::SaveFailure {
                module: self.name.clone(),
                source,
            })
    }

    fn require_active(&self, operation: &'static str) -> ModuleResult<()> {
        let state = self.state();
        if !state.is_active() {
            return Err(ModuleError::IllegalState {
                module: self.name.clone(),
                operation,
                state,
            });
        }
        Ok(())
    }

    fn with_slots<R>(&self, kind: SlotKind, f: impl FnOnce(Vec<&dyn AnySlot>) -> R) -> R {
        let mut slots = Slots::new();
        self.module.declare(&mut slots);
        f(slots.of_kind(kind).collect())
    }

    /// Types this module hard-depends on
    pub fn dependencies(&self) -> HashSet<ModuleType> {
        self.with_slots(SlotKind::Dependency, |slots| {
            slots.into_iter().map(|slot| slot.target()).collect()
        })
    }

    /// Types this module optionally uses
    pub fn used_modules(&self) -> HashSet<ModuleType> {
        self.with_slots(SlotKind::Use, |slots| {
            slots.into_iter().map(|slot| slot.target()).collect()
        })
    }

    /// Dependency types whose slots are still empty
    pub fn unresolved_dependencies(&self) -> HashSet<ModuleType> {
        self.with_slots(SlotKind::Dependency, |slots| {
            slots
                .into_iter()
                .filter(|slot| !slot.is_set())
                .map(|slot| slot.target())
                .collect()
        })
    }

    pub fn has_all_dependencies_set(&self) -> bool {
        self.with_slots(SlotKind::Dependency, |slots| {
            slots.iter().all(|slot| slot.is_set())
        })
    }

    pub fn has_all_uses_set(&self) -> bool {
        self.with_slots(SlotKind::Use, |slots| slots.iter().all(|slot| slot.is_set()))
    }

    /// Offer `candidate` for every empty dependency slot it satisfies
    ///
    /// Returns the number of slots filled by this call.
    pub fn offer_dependency(&self, candidate: &ModuleRecord) -> usize {
        self.offer(SlotKind::Dependency, candidate)
    }

    /// Offer `candidate` for every empty use slot it satisfies
    ///
    /// Returns the number of slots filled by this call.
    pub fn offer_to_use(&self, candidate: &ModuleRecord) -> usize {
        self.offer(SlotKind::Use, candidate)
    }

    fn offer(&self, kind: SlotKind, candidate: &ModuleRecord) -> usize {
        let filled = self.with_slots(kind, |slots| {
            slots
                .into_iter()
                .filter(|slot| slot.offer(&candidate.capabilities))
                .count()
        });
        if filled > 0 {
            debug!(
                "Module '{}': injected '{}' into {} {:?} slot(s)",
                self.name, candidate.name, filled, kind
            );
        }
        filled
    }

    /// Whether this module provides a type another module depends on
    pub fn satisfies_any(&self, wanted: &HashSet<ModuleType>) -> bool {
        wanted.iter().any(|ty| self.capabilities.provides(*ty))
    }
}

impl fmt::Debug for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRecord")
            .field("name", &self.name)
            .field("type", &self.module_type)
            .field("state", &self.state())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
