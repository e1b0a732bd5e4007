//! Loaded unit handles
//!
//! A `LoadedUnit` is the live, immutable form of a defined unit. Its
//! ancestors are held as handles, so walking a hierarchy never goes back
//! through the loader. The only interior mutability is the set of
//! write-once injection slots created from late-binding fields.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use crate::error::{LoadstoneError, Result};
use crate::unit::{Marker, MarkerKind, UnitDescriptor};

type Slot = OnceLock<Arc<dyn Any + Send + Sync>>;

/// A defined unit
pub struct LoadedUnit {
    descriptor: UnitDescriptor,
    supertype: Option<Arc<LoadedUnit>>,
    interfaces: Vec<Arc<LoadedUnit>>,
    slots: IndexMap<String, Slot>,
}

impl LoadedUnit {
    /// Define a unit from its final descriptor and already-loaded ancestors
    pub(crate) fn define(
        descriptor: UnitDescriptor,
        supertype: Option<Arc<LoadedUnit>>,
        interfaces: Vec<Arc<LoadedUnit>>,
    ) -> Self {
        let slots = descriptor
            .fields
            .iter()
            .filter(|field| field.is_injection_slot())
            .map(|field| (field.name.clone(), OnceLock::new()))
            .collect();

        Self {
            descriptor,
            supertype,
            interfaces,
            slots,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &UnitDescriptor {
        &self.descriptor
    }

    pub fn supertype(&self) -> Option<&Arc<LoadedUnit>> {
        self.supertype.as_ref()
    }

    pub fn interfaces(&self) -> &[Arc<LoadedUnit>] {
        &self.interfaces
    }

    pub fn markers(&self) -> &[Marker] {
        &self.descriptor.markers
    }

    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.descriptor.has_marker(kind)
    }

    /// Whether `name` is this unit or one of its transitive ancestors
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.name() == name
            || self
                .supertype
                .iter()
                .chain(self.interfaces.iter())
                .any(|ancestor| ancestor.is_subtype_of(name))
    }

    /// Names of the injection slots, in declaration order
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Install a late binding into injection slot `field`
    ///
    /// # Errors
    ///
    /// `NotInjectable` if the unit has no such slot, `AlreadyBound` if the
    /// slot was filled before.
    pub fn inject<T>(&self, field: &str, value: T) -> Result<()>
    where
        T: Any + Send + Sync,
    {
        let slot = self
            .slots
            .get(field)
            .ok_or_else(|| LoadstoneError::NotInjectable {
                unit: self.name().to_string(),
                field: field.to_string(),
            })?;

        slot.set(Arc::new(value))
            .map_err(|_| LoadstoneError::AlreadyBound {
                unit: self.name().to_string(),
                field: field.to_string(),
            })
    }

    /// Value bound to slot `field`, if it is bound and of type `T`
    pub fn binding<T>(&self, field: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let bound = Arc::clone(self.slots.get(field)?.get()?);
        bound.downcast::<T>().ok()
    }

    pub fn is_bound(&self, field: &str) -> bool {
        self.slots.get(field).is_some_and(|slot| slot.get().is_some())
    }
}

impl fmt::Debug for LoadedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedUnit")
            .field("name", &self.name())
            .field("supertype", &self.supertype.as_ref().map(|s| s.name()))
            .field(
                "interfaces",
                &self.interfaces.iter().map(|i| i.name()).collect::<Vec<_>>(),
            )
            .field("slots", &self.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}
