//! Parent loader and the platform's built-in units

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{LoadstoneError, Result};
use crate::loader::{LAUNCHER_UNIT, LoadedUnit};
use crate::unit::{Method, UnitDescriptor, Visibility};

/// Root type every other type ultimately extends
pub const OBJECT_UNIT: &str = "std.Object";

/// Loader consulted for delegated names
pub trait ParentLoader {
    fn find(&self, name: &str) -> Option<Arc<LoadedUnit>>;
}

/// Units provided by the platform itself rather than by any source
#[derive(Debug)]
pub struct PlatformUnits {
    units: IndexMap<String, Arc<LoadedUnit>>,
}

impl PlatformUnits {
    /// The standard root types plus the exported launcher interface
    pub fn new() -> Self {
        let mut units = Self {
            units: IndexMap::new(),
        };

        let builtins = [
            UnitDescriptor::new(OBJECT_UNIT).with_visibility(Visibility::Public),
            UnitDescriptor::new("std.Enum")
                .with_visibility(Visibility::Public)
                .extends(OBJECT_UNIT),
            UnitDescriptor::new("std.Record")
                .with_visibility(Visibility::Public)
                .extends(OBJECT_UNIT),
            UnitDescriptor::interface("std.Runnable").with_method(
                Method::new("run").with_visibility(Visibility::Public),
            ),
            UnitDescriptor::interface(LAUNCHER_UNIT),
        ];

        for descriptor in builtins {
            units.define(descriptor);
        }
        units
    }

    /// Add a unit whose ancestors are already provided
    ///
    /// # Errors
    ///
    /// `UnresolvedAncestor` if an ancestor is not a platform unit.
    pub fn with_unit(mut self, descriptor: UnitDescriptor) -> Result<Self> {
        if let Some(missing) = descriptor
            .ancestors()
            .find(|ancestor| !self.units.contains_key(*ancestor))
        {
            return Err(LoadstoneError::UnresolvedAncestor {
                unit: descriptor.name.clone(),
                ancestor: missing.to_string(),
            });
        }
        self.define(descriptor);
        Ok(self)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    fn define(&mut self, descriptor: UnitDescriptor) {
        let supertype = descriptor
            .supertype
            .as_deref()
            .and_then(|name| self.units.get(name))
            .cloned();
        let interfaces = descriptor
            .interfaces
            .iter()
            .filter_map(|name| self.units.get(name))
            .cloned()
            .collect();

        let name = descriptor.name.clone();
        let unit = LoadedUnit::define(descriptor, supertype, interfaces);
        self.units.insert(name, Arc::new(unit));
    }
}

impl Default for PlatformUnits {
    fn default() -> Self {
        Self::new()
    }
}

impl ParentLoader for PlatformUnits {
    fn find(&self, name: &str) -> Option<Arc<LoadedUnit>> {
        self.units.get(name).cloned()
    }
}
