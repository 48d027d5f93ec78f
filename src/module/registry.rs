//! Module Registry
//!
//! Storage for module records keyed by module type. Reads are safe while
//! lifecycle operations run: the lock only guards map access and is never
//! held while a module hook executes, so hooks may look up their peers.

use crate::module::error::{ModuleError, ModuleResult};
use crate::module::record::ModuleRecord;
use crate::module::types::{ModuleState, ModuleType};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
pub struct ModuleRegistry {
    records: RwLock<HashMap<ModuleType, Arc<ModuleRecord>>>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self.read().values().map(|r| r.name().to_string()).collect();
        names.sort();
        f.debug_struct("ModuleRegistry")
            .field("modules", &names)
            .finish()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ModuleType, Arc<ModuleRecord>>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ModuleType, Arc<ModuleRecord>>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a record; a type may only be registered once
    pub fn insert(&self, record: ModuleRecord) -> ModuleResult<Arc<ModuleRecord>> {
        let mut records = self.write();
        let module_type = record.module_type();
        if records.contains_key(&module_type) {
            return Err(ModuleError::DuplicateModule {
                module: record.name().to_string(),
            });
        }

        let record = Arc::new(record);
        records.insert(module_type, record.clone());
        Ok(record)
    }

    pub fn get(&self, module_type: ModuleType) -> Option<Arc<ModuleRecord>> {
        self.read().get(&module_type).cloned()
    }

    pub fn remove(&self, module_type: ModuleType) -> Option<Arc<ModuleRecord>> {
        self.write().remove(&module_type)
    }

    pub fn contains(&self, module_type: ModuleType) -> bool {
        self.read().contains_key(&module_type)
    }

    /// Snapshot of all records, in no particular order
    pub fn records(&self) -> Vec<Arc<ModuleRecord>> {
        self.read().values().cloned().collect()
    }

    pub fn module_types(&self) -> Vec<ModuleType> {
        self.read().keys().copied().collect()
    }

    /// Whether a registered module that has not stopped can be injected as
    /// `module_type`
    pub fn is_provided(&self, module_type: ModuleType) -> bool {
        self.read().values().any(|record| {
            record.state() != ModuleState::Stopped
                && record.capabilities().provides(module_type)
        })
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
