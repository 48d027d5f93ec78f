//! Module-specific error handling utilities
//!
//! Thin wrapper over the generic error logging in core so that every failure
//! the engine captures is logged the same way.

use crate::core::error_handling::log_error_with_context;
use crate::module::error::ModuleError;

/// Log a captured module error together with the operation that produced it
pub fn log_module_error_with_context(error: &ModuleError, operation_context: &str) {
    log_error_with_context(error, operation_context);
}
