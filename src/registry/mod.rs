//! Dependency-aware registries
//!
//! This module handles:
//! - `Registry<V>`: a named, typed key → value container with freeze rules
//! - `AnyRegistry`: the type-erased view used by the resolver and loader
//! - `RegistrySet`: the explicit context object holding every registry
//!
//! ## Freeze rules
//!
//! ```text
//! mutable ──freeze──▶ frozen ──unfreeze──▶ mutable ──freeze──▶ frozen (final)
//!                             (only with the unfreeze capability, once)
//! ```
//!
//! Freezing a frozen registry is a no-op only for registries created with
//! idempotent freeze; otherwise it fails with `RegistryFrozen`.

use std::any::{Any, TypeId};

use indexmap::IndexMap;

use crate::error::{LoadstoneError, Result};

pub mod id;
pub mod loader;
pub mod parser;

pub use id::ResourceId;
pub use loader::RegistryLoader;
pub use parser::{JsonParser, ParsedEntries, ResourceParser, VariantParser};

/// Namespace used for resource ids that do not name one
pub const DEFAULT_NAMESPACE: &str = "core";

/// Capabilities a registry is created with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    /// A second `freeze` is a no-op instead of an error
    pub idempotent_freeze: bool,
    /// One frozen → unfrozen → frozen cycle is permitted
    pub unfreezable: bool,
    /// Populated by the host before registry loading; skipped by the loader
    pub preloaded: bool,
}

/// A named, typed registry
pub struct Registry<V> {
    name: String,
    value_type: String,
    dependencies: Vec<String>,
    options: RegistryOptions,
    frozen: bool,
    unfrozen_once: bool,
    entries: IndexMap<ResourceId, V>,
}

impl<V> Registry<V>
where
    V: Any + Send + Sync,
{
    /// Create a mutable registry whose values are of the declared type `value_type`
    ///
    /// `value_type` is the name parsers declare in their `parser` marker.
    pub fn new(name: impl Into<String>, value_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: value_type.into(),
            dependencies: Vec::new(),
            options: RegistryOptions::default(),
            frozen: false,
            unfrozen_once: false,
            entries: IndexMap::new(),
        }
    }

    pub fn depends_on(mut self, registry: impl Into<String>) -> Self {
        self.dependencies.push(registry.into());
        self
    }

    pub fn with_idempotent_freeze(mut self) -> Self {
        self.options.idempotent_freeze = true;
        self
    }

    pub fn with_unfreeze(mut self) -> Self {
        self.options.unfreezable = true;
        self
    }

    pub fn preloaded(mut self) -> Self {
        self.options.preloaded = true;
        self
    }

    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Insert a new entry
    ///
    /// # Errors
    ///
    /// `RegistryFrozen` when frozen, `DuplicateEntry` when `key` is taken.
    pub fn register(&mut self, key: ResourceId, value: V) -> Result<()> {
        self.ensure_mutable()?;
        if self.entries.contains_key(&key) {
            return Err(LoadstoneError::DuplicateEntry {
                registry: self.name.clone(),
                key: key.to_string(),
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Remove an entry, returning its value
    pub fn remove(&mut self, key: &ResourceId) -> Result<Option<V>> {
        self.ensure_mutable()?;
        Ok(self.entries.shift_remove(key))
    }

    pub fn get(&self, key: &ResourceId) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &ResourceId) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceId, &V)> {
        self.entries.iter()
    }

    /// Re-open a frozen registry for one more population pass
    ///
    /// # Errors
    ///
    /// `UnfreezeNotPermitted` without the unfreeze capability, or when the
    /// registry has already been unfrozen once.
    pub fn unfreeze(&mut self) -> Result<()> {
        if !self.options.unfreezable {
            return Err(LoadstoneError::UnfreezeNotPermitted {
                name: self.name.clone(),
                reason: "registry was not created with the unfreeze capability".to_string(),
            });
        }
        if self.unfrozen_once {
            return Err(LoadstoneError::UnfreezeNotPermitted {
                name: self.name.clone(),
                reason: "registry has already been unfrozen once".to_string(),
            });
        }
        if self.frozen {
            self.frozen = false;
            self.unfrozen_once = true;
            tracing::debug!(registry = %self.name, "registry unfrozen");
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            return Err(LoadstoneError::RegistryFrozen {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Type-erased registry view
pub trait AnyRegistry: Any {
    fn name(&self) -> &str;

    /// Declared value type name, matched against `parser` marker values
    fn value_type(&self) -> &str;

    /// Runtime type of the values
    fn value_type_id(&self) -> TypeId;

    fn dependencies(&self) -> &[String];

    fn is_preloaded(&self) -> bool;

    fn is_frozen(&self) -> bool;

    /// Make the registry immutable
    fn freeze(&mut self) -> Result<()>;

    /// Insert a type-erased value; the value must have the registry's type
    fn insert_any(&mut self, key: ResourceId, value: Box<dyn Any + Send + Sync>) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<V> AnyRegistry for Registry<V>
where
    V: Any + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn value_type(&self) -> &str {
        &self.value_type
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<V>()
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    fn is_preloaded(&self) -> bool {
        self.options.preloaded
    }

    fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn freeze(&mut self) -> Result<()> {
        if self.frozen {
            if self.options.idempotent_freeze {
                return Ok(());
            }
            return Err(LoadstoneError::RegistryFrozen {
                name: self.name.clone(),
            });
        }
        self.frozen = true;
        tracing::debug!(registry = %self.name, entries = self.entries.len(), "registry frozen");
        Ok(())
    }

    fn insert_any(&mut self, key: ResourceId, value: Box<dyn Any + Send + Sync>) -> Result<()> {
        let value = value
            .downcast::<V>()
            .map_err(|_| LoadstoneError::TypeMismatch {
                registry: self.name.clone(),
                resource: key.to_string(),
                variant: key.to_string(),
                expected: self.value_type.clone(),
            })?;
        self.register(key, *value)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Every registry of an application, in registration order
#[derive(Default)]
pub struct RegistrySet {
    registries: IndexMap<String, Box<dyn AnyRegistry>>,
}

impl RegistrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registry
    ///
    /// # Errors
    ///
    /// `DuplicateRegistry` if the name is taken.
    pub fn register<V>(&mut self, registry: Registry<V>) -> Result<()>
    where
        V: Any + Send + Sync,
    {
        if self.registries.contains_key(&registry.name) {
            return Err(LoadstoneError::DuplicateRegistry {
                name: registry.name,
            });
        }
        self.registries
            .insert(registry.name.clone(), Box::new(registry));
        Ok(())
    }

    /// Typed view of registry `name`; `None` if absent or of another type
    pub fn get<V>(&self, name: &str) -> Option<&Registry<V>>
    where
        V: Any + Send + Sync,
    {
        self.registries.get(name)?.as_any().downcast_ref()
    }

    pub fn get_mut<V>(&mut self, name: &str) -> Option<&mut Registry<V>>
    where
        V: Any + Send + Sync,
    {
        self.registries.get_mut(name)?.as_any_mut().downcast_mut()
    }

    pub fn get_any(&self, name: &str) -> Option<&dyn AnyRegistry> {
        self.registries.get(name).map(|registry| &**registry)
    }

    pub fn get_any_mut(&mut self, name: &str) -> Option<&mut dyn AnyRegistry> {
        self.registries.get_mut(name).map(|registry| &mut **registry)
    }

    /// Registry names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registries.keys().map(String::as_str)
    }

    /// Declared dependencies of every registry, in registration order
    pub fn dependency_map(&self) -> IndexMap<String, Vec<String>> {
        self.registries
            .iter()
            .map(|(name, registry)| (name.clone(), registry.dependencies().to_vec()))
            .collect()
    }

    /// Load order of the registries, dependencies first
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        crate::resolver::resolve(&self.dependency_map())
    }

    /// Freeze every registry that is not frozen yet
    pub fn freeze_all(&mut self) -> Result<()> {
        for registry in self.registries.values_mut() {
            if !registry.is_frozen() {
                registry.freeze()?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.registries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}
