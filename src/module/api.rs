//! Public API for the module engine
//!
//! External code should import from here rather than from the internal
//! modules.

// Module contract and dependency slots
pub use crate::module::slot::{AnySlot, Capabilities, Slot, SlotKind, Slots};
pub use crate::module::traits::Module;

// Module management
pub use crate::module::manager::ModuleManager;
pub use crate::module::record::ModuleRecord;
pub use crate::module::registry::ModuleRegistry;

// Identity and lifecycle state
pub use crate::module::types::{ModuleState, ModuleType};

// Error handling
pub use crate::module::error::{HookError, HookResult, ModuleError, ModuleResult};
pub use crate::module::error_handling::log_module_error_with_context;
