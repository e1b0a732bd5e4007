//! Registry loading from declarative resources
//!
//! ## Layout
//!
//! ```text
//! <assets>/<namespace>/<registry>.json               manifest: ["stone", "mymod:ore"]
//! <assets>/<namespace>/<registry>/<path>.json        one resource per manifest entry
//! ```
//!
//! Registries are walked in resolved order, dependencies first. Every
//! resource goes through the parser declared for the registry's value type;
//! every produced entry is checked for type and namespace before insertion.
//! Each registry is frozen once populated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::boot::Bindings;
use crate::error::{LoadstoneError, Result};
use crate::index::MarkerIndex;
use crate::registry::{AnyRegistry, DEFAULT_NAMESPACE, ResourceId, ResourceParser, RegistrySet};
use crate::unit::MarkerKind;

/// Populates registries from asset files
#[derive(Debug, Clone)]
pub struct RegistryLoader {
    assets: PathBuf,
    namespace: String,
}

impl RegistryLoader {
    pub fn new(assets: impl Into<PathBuf>) -> Self {
        Self {
            assets: assets.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Namespace holding the manifests
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn assets(&self) -> &Path {
        &self.assets
    }

    /// `<assets>/<namespace>/<registry>.json`
    pub fn manifest_path(&self, registry: &str) -> PathBuf {
        self.assets
            .join(&self.namespace)
            .join(format!("{registry}.json"))
    }

    /// `<assets>/<id namespace>/<registry>/<id path>.json`
    pub fn resource_path(&self, registry: &str, id: &ResourceId) -> PathBuf {
        self.assets
            .join(id.namespace())
            .join(registry)
            .join(format!("{}.json", id.path()))
    }

    /// Populate and freeze every registry of `set` that is not preloaded
    ///
    /// # Errors
    ///
    /// Resolution errors (`CircularDependency`, `DependencyNotFound`), parser
    /// discovery errors, and any failure reading, parsing or inserting a
    /// resource. Loading stops at the first error.
    pub fn load(
        &self,
        set: &mut RegistrySet,
        markers: &MarkerIndex,
        bindings: &Bindings,
    ) -> Result<()> {
        let order = set.resolve_order()?;
        tracing::debug!(order = ?order, "registry load order resolved");

        for name in order {
            let registry = set
                .get_any_mut(&name)
                .ok_or_else(|| LoadstoneError::RegistryNotFound { name: name.clone() })?;

            if registry.is_preloaded() {
                tracing::debug!(registry = %name, "preloaded registry skipped");
                continue;
            }

            self.load_registry(registry, markers, bindings)?;
            registry.freeze()?;
            tracing::info!(registry = %name, entries = registry.len(), "registry loaded");
        }

        Ok(())
    }

    fn load_registry(
        &self,
        registry: &mut dyn AnyRegistry,
        markers: &MarkerIndex,
        bindings: &Bindings,
    ) -> Result<()> {
        let name = registry.name().to_string();
        let resources = self.read_manifest(&name)?;
        if resources.is_empty() {
            return Ok(());
        }

        let parser = find_parser(markers, bindings, registry.value_type())?;

        for id in resources {
            let data = self.read_resource(&name, &id)?;
            let entries = parser
                .parse(&id, data)
                .map_err(|e| LoadstoneError::ResourceLoadFailed {
                    registry: name.clone(),
                    resource: id.to_string(),
                    reason: e.to_string(),
                })?;

            for (key, value) in entries {
                if (*value).type_id() != registry.value_type_id() {
                    return Err(LoadstoneError::TypeMismatch {
                        registry: name.clone(),
                        resource: id.to_string(),
                        variant: key.to_string(),
                        expected: registry.value_type().to_string(),
                    });
                }
                if key.namespace() != id.namespace() {
                    return Err(LoadstoneError::NamespaceMismatch {
                        registry: name.clone(),
                        resource: id.to_string(),
                        variant: key.to_string(),
                    });
                }
                registry.insert_any(key, value)?;
            }
        }

        Ok(())
    }

    fn read_manifest(&self, registry: &str) -> Result<Vec<ResourceId>> {
        let path = self.manifest_path(registry);
        let manifest_id = format!("{}:{registry}", self.namespace);

        let content = read_file(&path, registry, &manifest_id)?;
        let raw: Vec<String> =
            serde_json::from_slice(&content).map_err(|e| LoadstoneError::ResourceLoadFailed {
                registry: registry.to_string(),
                resource: manifest_id.clone(),
                reason: format!("invalid manifest: {e}"),
            })?;

        raw.iter()
            .map(|entry| ResourceId::parse(entry, &self.namespace))
            .collect()
    }

    fn read_resource(&self, registry: &str, id: &ResourceId) -> Result<serde_json::Value> {
        let path = self.resource_path(registry, id);
        let content = read_file(&path, registry, &id.to_string())?;

        serde_json::from_slice(&content).map_err(|e| LoadstoneError::ResourceLoadFailed {
            registry: registry.to_string(),
            resource: id.to_string(),
            reason: e.to_string(),
        })
    }
}

fn read_file(path: &Path, registry: &str, resource: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadstoneError::ResourceNotFound {
                registry: registry.to_string(),
                resource: resource.to_string(),
                path: path.display().to_string(),
            }
        } else {
            LoadstoneError::ResourceLoadFailed {
                registry: registry.to_string(),
                resource: resource.to_string(),
                reason: e.to_string(),
            }
        }
    })
}

/// The single parser declared for `value_type`
fn find_parser(
    markers: &MarkerIndex,
    bindings: &Bindings,
    value_type: &str,
) -> Result<Arc<dyn ResourceParser>> {
    let candidates: Vec<&str> = markers
        .query(MarkerKind::Parser)
        .iter()
        .filter(|unit| {
            unit.markers()
                .iter()
                .any(|m| m.kind == MarkerKind::Parser && m.value.as_deref() == Some(value_type))
        })
        .map(|unit| unit.name())
        .collect();

    match candidates.as_slice() {
        [] => Err(LoadstoneError::ParserNotFound {
            value_type: value_type.to_string(),
        }),
        [unit] => bindings
            .parser(unit)
            .ok_or_else(|| LoadstoneError::MissingBinding {
                unit: (*unit).to_string(),
                kind: "resource parser",
            }),
        many => Err(LoadstoneError::AmbiguousParser {
            value_type: value_type.to_string(),
            candidates: many.join(", "),
        }),
    }
}
