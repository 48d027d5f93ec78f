//! Dependency and Use Slots
//!
//! Modules hold references to their peers in typed [`Slot`] fields and
//! describe them to the engine through [`Slots`] in `Module::declare`:
//!
//! ```rust,no_run
//! use modlife::module::api::{Module, Slot, Slots};
//!
//! trait Storage: Send + Sync {}
//! struct Clock;
//! impl Module for Clock {}
//!
//! struct Server {
//!     storage: Slot<dyn Storage>,
//!     clock: Slot<Clock>,
//! }
//!
//! impl Module for Server {
//!     fn declare<'a>(&'a self, slots: &mut Slots<'a>) {
//!         slots.depends(&self.storage).uses(&self.clock);
//!     }
//! }
//! ```
//!
//! A slot is filled from the [`Capabilities`] a candidate module provides:
//! its own concrete type always, plus whatever capability interfaces it
//! advertises in `Module::provide`. Filling is first-writer-wins.

use crate::module::types::ModuleType;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Whether a slot must be filled before initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Hard dependency, required before `init`
    Dependency,
    /// Soft use, filled opportunistically after `init`, may stay empty
    Use,
}

/// Typed reference to another module, filled by the engine
pub struct Slot<T: ?Sized> {
    value: OnceLock<Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Slot<T> {
    pub const fn new() -> Self {
        Self {
            value: OnceLock::new(),
        }
    }

    /// The injected module, if any
    pub fn get(&self) -> Option<&Arc<T>> {
        self.value.get()
    }

    pub fn is_set(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync + 'static> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("target", &ModuleType::of::<T>())
            .field("set", &self.is_set())
            .finish()
    }
}

/// Type-erased view of a [`Slot`] used by the engine
pub trait AnySlot: Send + Sync {
    /// The type this slot accepts
    fn target(&self) -> ModuleType;

    fn is_set(&self) -> bool;

    /// Fill the slot from `candidate` if it is empty and the candidate
    /// provides the slot's type. Returns true if this call filled the slot.
    fn offer(&self, candidate: &Capabilities) -> bool;
}

impl<T: ?Sized + Send + Sync + 'static> AnySlot for Slot<T> {
    fn target(&self) -> ModuleType {
        ModuleType::of::<T>()
    }

    fn is_set(&self) -> bool {
        Slot::is_set(self)
    }

    fn offer(&self, candidate: &Capabilities) -> bool {
        if Slot::is_set(self) {
            return false;
        }
        match candidate.get::<T>() {
            Some(module) => self.value.set(module).is_ok(),
            None => false,
        }
    }
}

/// Declaration of a module's slots, collected by `Module::declare`
pub struct Slots<'a> {
    entries: Vec<(SlotKind, &'a dyn AnySlot)>,
}

impl<'a> Slots<'a> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declare a hard dependency
    pub fn depends(&mut self, slot: &'a dyn AnySlot) -> &mut Self {
        self.entries.push((SlotKind::Dependency, slot));
        self
    }

    /// Declare a soft use
    pub fn uses(&mut self, slot: &'a dyn AnySlot) -> &mut Self {
        self.entries.push((SlotKind::Use, slot));
        self
    }

    /// Declared slots of one kind
    pub fn of_kind(&self, kind: SlotKind) -> impl Iterator<Item = &'a dyn AnySlot> + '_ {
        self.entries
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, slot)| *slot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The set of types a module instance can be injected as
///
/// Each entry maps a type (concrete module or `dyn` capability) to an
/// `Arc` of that type pointing at the same instance.
pub struct Capabilities {
    entries: HashMap<TypeId, (ModuleType, Box<dyn Any + Send + Sync>)>,
}

impl Capabilities {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Advertise `value` as an implementation of `T`
    ///
    /// A later `provide` for the same `T` replaces the earlier one.
    pub fn provide<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) -> &mut Self {
        let value: Box<dyn Any + Send + Sync> = Box::new(value);
        self.entries
            .insert(TypeId::of::<T>(), (ModuleType::of::<T>(), value));
        self
    }

    /// The instance as `T`, if provided
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|(_, value)| value.downcast_ref::<Arc<T>>())
            .cloned()
    }

    pub fn provides(&self, module_type: ModuleType) -> bool {
        self.entries.contains_key(&module_type.id())
    }

    /// All provided types
    pub fn types(&self) -> impl Iterator<Item = ModuleType> + '_ {
        self.entries.values().map(|(module_type, _)| *module_type)
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.types()).finish()
    }
}
