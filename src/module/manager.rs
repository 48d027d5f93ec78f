//! Module Manager
//!
//! Owns the module registry and drives bulk bring-up and tear-down in an
//! order that respects hard dependencies, plus point operations to add,
//! remove or individually start a module.
//!
//! Failures inside one module never abort a bulk operation: they are
//! logged, returned to the caller as a list, and the affected module is
//! pruned from the registry where the lifecycle requires it.

use crate::module::error::{ModuleError, ModuleResult};
use crate::module::error_handling::log_module_error_with_context;
use crate::module::record::ModuleRecord;
use crate::module::registry::ModuleRegistry;
use crate::module::traits::Module;
use crate::module::types::{ModuleState, ModuleType};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Central module manager responsible for:
/// - Module registration and lookup
/// - Dependency-ordered initialization and start
/// - Dependency-safe shutdown
/// - Load/save sweeps over active modules
///
/// Bring-up, tear-down, add and remove are meant to be driven from a single
/// control flow. Lookups (`get_module`, `state_of`, ...) may run at any
/// time, including from inside module hooks.
#[derive(Debug, Default)]
pub struct ModuleManager {
    registry: ModuleRegistry,
}

impl ModuleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get access to the underlying registry
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Register a module instance without calling any of its hooks
    pub fn add_module<M: Module>(&self, module: M) -> ModuleResult<()> {
        let record = self.registry.insert(ModuleRecord::new(module))?;
        debug!("ModuleManager: Registered module '{}'", record.name());
        Ok(())
    }

    /// Remove a module, stopping it first (which saves it) if it is started
    pub async fn remove_module(&self, module_type: ModuleType) -> ModuleResult<()> {
        let record = self
            .registry
            .remove(module_type)
            .ok_or_else(|| ModuleError::ModuleNotFound {
                module: module_type.to_string(),
            })?;
        debug!("ModuleManager: Removed module '{}'", record.name());

        if record.state() == ModuleState::Started {
            record.stop().await?;
        }
        Ok(())
    }

    /// Typed access to a registered module instance
    pub fn get_module<M: Module>(&self) -> Option<Arc<M>> {
        self.registry
            .get(ModuleType::of::<M>())
            .and_then(|record| record.capabilities().get::<M>())
    }

    pub fn get_module_by_type(&self, module_type: ModuleType) -> Option<Arc<dyn Module>> {
        self.registry
            .get(module_type)
            .map(|record| record.module().clone())
    }

    pub fn state_of(&self, module_type: ModuleType) -> Option<ModuleState> {
        self.registry.get(module_type).map(|record| record.state())
    }

    pub fn contains(&self, module_type: ModuleType) -> bool {
        self.registry.contains(module_type)
    }

    pub fn module_types(&self) -> Vec<ModuleType> {
        self.registry.module_types()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Initialize and start as many modules as possible
    ///
    /// Modules are initialized as soon as all of their hard dependencies
    /// have been injected, so a dependency is always initialized before its
    /// dependents. Modules whose `init` fails, whose dependencies are not
    /// registered, or that wait on each other in a cycle are removed. Soft
    /// uses are then injected between all remaining modules and every
    /// initialized module is started. A module whose `start` fails is
    /// removed, and so is every not yet started module that depends on it.
    /// Start order follows initialization order; no ordering between
    /// independent modules is guaranteed.
    ///
    /// Returns every failure captured along the way.
    pub async fn start_all(&self) -> Vec<ModuleError> {
        let mut failures = Vec::new();
        let records = self.registry.records();

        let mut working: Vec<Arc<ModuleRecord>> = records
            .iter()
            .filter(|record| record.state() < ModuleState::Started)
            .cloned()
            .collect();

        // Already running modules can satisfy newcomers right away.
        for started in records.iter().filter(|r| r.state() == ModuleState::Started) {
            for record in &working {
                record.offer_dependency(started);
            }
        }

        info!(
            "ModuleManager: Bringing up {} module(s) ({} registered)",
            working.len(),
            records.len()
        );

        let mut initialized_order: Vec<Arc<ModuleRecord>> = Vec::new();

        'scan: while !working.is_empty() {
            for index in 0..working.len() {
                if !working[index].has_all_dependencies_set() {
                    continue;
                }

                let record = working.remove(index);
                if record.state() == ModuleState::Constructed {
                    if let Err(error) = record.initialize().await {
                        self.registry.remove(record.module_type());
                        log_module_error_with_context(&error, "Initializing module");
                        failures.push(error);
                        continue 'scan;
                    }
                }

                for other in &working {
                    other.offer_dependency(&record);
                }
                initialized_order.push(record);
                continue 'scan;
            }

            // A full scan made no progress: nothing left can be satisfied.
            failures.extend(self.prune_unsatisfiable(std::mem::take(&mut working)));
        }

        self.offer_uses_between_all();

        // Records that did not come up; their dependents must not start.
        let mut fallen: Vec<Arc<ModuleRecord>> = Vec::new();
        for record in initialized_order {
            if record.state() != ModuleState::Initialized {
                continue;
            }

            let missing = Self::provided_by_any(&record, &fallen);
            if !missing.is_empty() {
                self.registry.remove(record.module_type());
                warn!(
                    "Not starting module '{}', its dependencies failed to start: {}",
                    record.name(),
                    missing.join(", ")
                );
                failures.push(ModuleError::DependencyMissing {
                    module: record.name().to_string(),
                    missing,
                });
                fallen.push(record);
                continue;
            }

            if let Err(error) = record.start().await {
                self.registry.remove(record.module_type());
                log_module_error_with_context(&error, "Starting module");
                failures.push(error);
                fallen.push(record);
            }
        }

        info!(
            "ModuleManager: Bring-up finished, {} module(s) registered, {} failure(s)",
            self.registry.len(),
            failures.len()
        );
        failures
    }

    /// Remove every record of a stuck working set and report why it is stuck
    ///
    /// Records whose dependencies nobody provides are reported as missing
    /// dependencies. Removing them may leave further records without a
    /// provider, so this repeats until stable; whatever remains is waiting
    /// on itself and is reported as a cycle.
    fn prune_unsatisfiable(&self, mut stuck: Vec<Arc<ModuleRecord>>) -> Vec<ModuleError> {
        let mut failures = Vec::new();

        loop {
            let mut pruned_any = false;
            let mut index = 0;
            while index < stuck.len() {
                let missing: Vec<String> = stuck[index]
                    .unresolved_dependencies()
                    .into_iter()
                    .filter(|ty| !self.registry.is_provided(*ty))
                    .map(|ty| ty.to_string())
                    .collect();

                if missing.is_empty() {
                    index += 1;
                    continue;
                }

                let record = stuck.remove(index);
                self.registry.remove(record.module_type());
                warn!(
                    "Could not initialize module '{}', it is missing the following modules: {}",
                    record.name(),
                    missing.join(", ")
                );
                failures.push(ModuleError::DependencyMissing {
                    module: record.name().to_string(),
                    missing,
                });
                pruned_any = true;
            }

            if !pruned_any {
                break;
            }
        }

        if !stuck.is_empty() {
            let mut modules: Vec<String> = stuck.iter().map(|r| r.name().to_string()).collect();
            modules.sort();
            for record in &stuck {
                self.registry.remove(record.module_type());
            }
            warn!(
                "Could not initialize modules that depend on each other: {}",
                modules.join(", ")
            );
            failures.push(ModuleError::DependencyCycle { modules });
        }

        failures
    }

    /// Names of the dependency types of `record` that one of `providers` satisfies
    fn provided_by_any(record: &ModuleRecord, providers: &[Arc<ModuleRecord>]) -> Vec<String> {
        let mut names: Vec<String> = record
            .dependencies()
            .into_iter()
            .filter(|ty| providers.iter().any(|p| p.capabilities().provides(*ty)))
            .map(|ty| ty.to_string())
            .collect();
        names.sort();
        names
    }

    fn offer_uses_between_all(&self) {
        let active: Vec<Arc<ModuleRecord>> = self
            .registry
            .records()
            .into_iter()
            .filter(|record| record.state().is_active())
            .collect();

        for record in &active {
            for other in &active {
                if !Arc::ptr_eq(record, other) {
                    record.offer_to_use(other);
                }
            }
        }
    }

    /// Initialize and start a single module
    ///
    /// Every other registered module is offered as a dependency, whatever
    /// its state. If the hard dependencies are still unset, or any hook
    /// fails, the module is removed and the error returned. Uses are
    /// injected both ways between the module and every other registered
    /// module before start.
    pub async fn start(&self, module_type: ModuleType) -> ModuleResult<()> {
        let record = self
            .registry
            .get(module_type)
            .ok_or_else(|| ModuleError::ModuleNotFound {
                module: module_type.to_string(),
            })?;

        if record.state() != ModuleState::Constructed {
            return Err(ModuleError::IllegalState {
                module: record.name().to_string(),
                operation: "start",
                state: record.state(),
            });
        }

        match self.bring_up_single(&record).await {
            Ok(()) => {
                info!("ModuleManager: Started module '{}'", record.name());
                Ok(())
            }
            Err(error) => {
                self.registry.remove(module_type);
                log_module_error_with_context(&error, "Starting module");
                Err(error)
            }
        }
    }

    async fn bring_up_single(&self, record: &Arc<ModuleRecord>) -> ModuleResult<()> {
        let peers: Vec<Arc<ModuleRecord>> = self
            .registry
            .records()
            .into_iter()
            .filter(|other| !Arc::ptr_eq(other, record))
            .collect();

        for other in &peers {
            record.offer_dependency(other);
        }
        if !record.has_all_dependencies_set() {
            let mut missing: Vec<String> = record
                .unresolved_dependencies()
                .into_iter()
                .map(|ty| ty.to_string())
                .collect();
            missing.sort();
            return Err(ModuleError::DependencyMissing {
                module: record.name().to_string(),
                missing,
            });
        }

        record.initialize().await?;

        for other in &peers {
            record.offer_to_use(other);
            other.offer_to_use(record);
        }

        record.start().await
    }

    /// Stop every started module so that no module is stopped while a
    /// still-running module depends on it
    ///
    /// Each round stops the modules nothing pending depends on. If a round
    /// finds none, the remainder depends on itself: this is reported and
    /// the remaining modules are stopped anyway.
    ///
    /// Returns every failure captured along the way.
    pub async fn stop_all(&self) -> Vec<ModuleError> {
        let mut failures = Vec::new();
        let mut pending: Vec<(Arc<ModuleRecord>, HashSet<ModuleType>)> = self
            .registry
            .records()
            .into_iter()
            .filter(|record| record.state() == ModuleState::Started)
            .map(|record| {
                let dependencies = record.dependencies();
                (record, dependencies)
            })
            .collect();

        info!("ModuleManager: Stopping {} module(s)", pending.len());

        while !pending.is_empty() {
            let stoppable: Vec<usize> = (0..pending.len())
                .filter(|&index| {
                    let (candidate, _) = &pending[index];
                    !pending.iter().enumerate().any(|(other, (_, dependencies))| {
                        other != index && candidate.satisfies_any(dependencies)
                    })
                })
                .collect();

            if stoppable.is_empty() {
                let mut modules: Vec<String> =
                    pending.iter().map(|(r, _)| r.name().to_string()).collect();
                modules.sort();
                warn!(
                    "Can't stop all modules without stopping a dependency of a running module, forcing stop of: {}",
                    modules.join(", ")
                );
                failures.push(ModuleError::DependencyCycle { modules });

                for (record, _) in pending.drain(..) {
                    Self::stop_record(&record, &mut failures).await;
                }
                break;
            }

            for index in stoppable.into_iter().rev() {
                let (record, _) = pending.remove(index);
                Self::stop_record(&record, &mut failures).await;
            }
        }

        failures
    }

    async fn stop_record(record: &ModuleRecord, failures: &mut Vec<ModuleError>) {
        match record.stop().await {
            Ok(()) => debug!("ModuleManager: Stopped module '{}'", record.name()),
            Err(error) => {
                log_module_error_with_context(&error, "Stopping module");
                failures.push(error);
            }
        }
    }

    /// Call `load` on every initialized or started module
    pub async fn load_all(&self) -> Vec<ModuleError> {
        let mut failures = Vec::new();
        for record in self.active_records() {
            if let Err(error) = record.load().await {
                log_module_error_with_context(&error, "Loading module");
                failures.push(error);
            }
        }
        failures
    }

    /// Call `save` on every initialized or started module
    pub async fn save_all(&self) -> Vec<ModuleError> {
        let mut failures = Vec::new();
        for record in self.active_records() {
            if let Err(error) = record.save().await {
                log_module_error_with_context(&error, "Saving module");
                failures.push(error);
            }
        }
        failures
    }

    fn active_records(&self) -> Vec<Arc<ModuleRecord>> {
        self.registry
            .records()
            .into_iter()
            .filter(|record| record.state().is_active())
            .collect()
    }
}
