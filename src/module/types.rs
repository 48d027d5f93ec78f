//! Module Identity and Lifecycle State
//!
//! `ModuleType` is the registry key (one instance per type) and `ModuleState`
//! is the forward-only lifecycle every module record moves through.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Lifecycle state of a registered module
///
/// States only ever advance: `Constructed -> Initialized -> Started -> Stopped`.
/// A module that fails to initialize is discarded rather than reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModuleState {
    /// Registered, `init`/`load` not called yet
    Constructed,
    /// `init` (and `load`) completed, `start` not called yet
    Initialized,
    /// `start` completed, `stop` not called yet
    Started,
    /// `stop` completed
    Stopped,
}

impl ModuleState {
    /// Whether the module is in a state where `load`/`save` may be invoked
    pub fn is_active(self) -> bool {
        matches!(self, ModuleState::Initialized | ModuleState::Started)
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ModuleState::Constructed => "constructed",
            ModuleState::Initialized => "initialized",
            ModuleState::Started => "started",
            ModuleState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Type identity of a module or capability
///
/// Equality and hashing use the `TypeId` only; the type name is carried
/// along for diagnostics.
#[derive(Clone, Copy)]
pub struct ModuleType {
    id: TypeId,
    name: &'static str,
}

impl ModuleType {
    /// Identity of `T`, which may be a concrete module or a `dyn` capability
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without module paths (`a::b::Cache<a::Key>` -> `Cache<Key>`)
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

impl PartialEq for ModuleType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ModuleType {}

impl Hash for ModuleType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleType({})", self.name)
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

/// Strip the module path from every path inside a type name
///
/// Generic arguments are kept so that instantiations of one generic type
/// stay distinguishable. A leading `dyn ` is dropped.
pub(crate) fn short_type_name(full: &str) -> String {
    let full = full.strip_prefix("dyn ").unwrap_or(full);
    let mut short = String::with_capacity(full.len());
    let mut path = String::new();

    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            path.push(ch);
            continue;
        }
        short.push_str(path.rsplit("::").next().unwrap_or(&path));
        path.clear();
        short.push(ch);
    }
    short.push_str(path.rsplit("::").next().unwrap_or(&path));
    short
}
