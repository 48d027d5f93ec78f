//! Module Error Handling
//!
//! Error taxonomy for the module engine: hook failures (fatal only for
//! initialization), dependency resolution failures, lifecycle misuse and
//! registry misuse.

use crate::core::error_handling::ContextualError;
use crate::module::types::ModuleState;

/// Error type returned by module lifecycle hooks
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by module lifecycle hooks
pub type HookResult = Result<(), HookError>;

/// Result type alias for module engine operations
pub type ModuleResult<T> = Result<T, ModuleError>;

#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// `init` failed; the module is discarded and never retried
    #[error("Failed to initialize module '{module}': {source}")]
    InitializationFailure {
        module: String,
        #[source]
        source: HookError,
    },

    /// `load` failed; the module keeps working
    #[error("Failed to load module '{module}': {source}")]
    LoadFailure {
        module: String,
        #[source]
        source: HookError,
    },

    /// `save` failed; the module keeps working
    #[error("Failed to save module '{module}': {source}")]
    SaveFailure {
        module: String,
        #[source]
        source: HookError,
    },

    #[error("Failed to start module '{module}': {source}")]
    StartFailure {
        module: String,
        #[source]
        source: HookError,
    },

    #[error("Failed to stop module '{module}': {source}")]
    StopFailure {
        module: String,
        #[source]
        source: HookError,
    },

    /// Hard dependencies that no registered module provides
    #[error("Module '{module}' is missing dependencies: {}", .missing.join(", "))]
    DependencyMissing { module: String, missing: Vec<String> },

    /// Modules that could not make progress because they wait on each other
    #[error("Dependency cycle between modules: {}", .modules.join(", "))]
    DependencyCycle { modules: Vec<String> },

    #[error("Cannot {operation} module '{module}' while it is {state}")]
    IllegalState {
        module: String,
        operation: &'static str,
        state: ModuleState,
    },

    #[error("Module already registered: {module}")]
    DuplicateModule { module: String },

    #[error("Module not found: {module}")]
    ModuleNotFound { module: String },
}

impl ModuleError {
    /// Name of the module the error concerns, if it concerns a single module
    pub fn module_name(&self) -> Option<&str> {
        match self {
            ModuleError::InitializationFailure { module, .. }
            | ModuleError::LoadFailure { module, .. }
            | ModuleError::SaveFailure { module, .. }
            | ModuleError::StartFailure { module, .. }
            | ModuleError::StopFailure { module, .. }
            | ModuleError::DependencyMissing { module, .. }
            | ModuleError::IllegalState { module, .. }
            | ModuleError::DuplicateModule { module }
            | ModuleError::ModuleNotFound { module } => Some(module),
            ModuleError::DependencyCycle { .. } => None,
        }
    }

    /// Whether the error came out of a module's own hook
    pub fn is_hook_failure(&self) -> bool {
        matches!(
            self,
            ModuleError::InitializationFailure { .. }
                | ModuleError::LoadFailure { .. }
                | ModuleError::SaveFailure { .. }
                | ModuleError::StartFailure { .. }
                | ModuleError::StopFailure { .. }
        )
    }
}

impl ContextualError for ModuleError {
    fn is_user_actionable(&self) -> bool {
        // Hook failures are the module's business; everything else is a
        // registration or wiring mistake the host can fix.
        !self.is_hook_failure()
    }

    fn user_message(&self) -> Option<String> {
        if self.is_user_actionable() {
            Some(self.to_string())
        } else {
            None
        }
    }
}
