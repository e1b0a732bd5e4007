//! Isolated unit loading
//!
//! This module handles:
//! - Owning the name → unit table (only the pipeline inserts into it)
//! - Delegating platform names to the parent loader
//! - Rejecting access to pipeline-internal units
//! - Pre-loading supertypes and interfaces before a unit is defined
//! - Running each unit through the transformer chain exactly once
//!
//! ## Resolution order
//!
//! ```text
//! load_by_name(name)
//!   1. name under a delegate prefix     → parent loader (miss: UnitNotFound)
//!   2. name inside "loadstone."         → IllegalAccess, except loadstone.Launcher
//!   3. name already loaded              → cached handle
//!   4. otherwise                        → load super, then interfaces in order,
//!                                         transform, define
//! ```
//!
//! Each collected unit moves `Collected → Transformed → Loaded` and never
//! goes back.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::collector::CollectedUnits;
use crate::config::DebugFlags;
use crate::error::{LoadstoneError, Result};
use crate::transform::TransformerChain;
use crate::unit::UnitDescriptor;

pub mod platform;
pub mod unit;

pub use platform::{OBJECT_UNIT, ParentLoader, PlatformUnits};
pub use unit::LoadedUnit;

/// Namespace reserved for the pipeline's own units
pub const INTERNAL_NAMESPACE: &str = "loadstone.";

/// The one internal unit application code may reference
pub const LAUNCHER_UNIT: &str = "loadstone.Launcher";

/// Prefixes whose names are always served by the parent loader
pub const DEFAULT_DELEGATE_PREFIXES: &[&str] = &["std.", "core."];

/// Lifecycle state of a collected unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnitState {
    Collected,
    Transformed,
    Loaded,
}

enum UnitEntry {
    Collected(Vec<u8>),
    Transformed(Vec<u8>),
    Loaded(Arc<LoadedUnit>),
}

impl UnitEntry {
    fn state(&self) -> UnitState {
        match self {
            UnitEntry::Collected(_) => UnitState::Collected,
            UnitEntry::Transformed(_) => UnitState::Transformed,
            UnitEntry::Loaded(_) => UnitState::Loaded,
        }
    }
}

/// Loader defining collected units into an isolated table
pub struct IsolatedLoader {
    entries: IndexMap<String, UnitEntry>,
    load_order: Vec<Arc<LoadedUnit>>,
    in_progress: Vec<String>,
    delegate_prefixes: Vec<String>,
    parent: Box<dyn ParentLoader>,
    chain: TransformerChain,
    flags: DebugFlags,
}

impl IsolatedLoader {
    /// Create a loader over collected units, delegating to the platform
    pub fn new(units: CollectedUnits, chain: TransformerChain, flags: DebugFlags) -> Self {
        Self::with_parent(units, chain, flags, Box::new(PlatformUnits::new()))
    }

    pub fn with_parent(
        units: CollectedUnits,
        chain: TransformerChain,
        flags: DebugFlags,
        parent: Box<dyn ParentLoader>,
    ) -> Self {
        let mut loader = Self {
            entries: IndexMap::new(),
            load_order: Vec::new(),
            in_progress: Vec::new(),
            delegate_prefixes: DEFAULT_DELEGATE_PREFIXES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            parent,
            chain,
            flags,
        };
        loader.add_units(units);
        loader
    }

    /// Replace the always-delegate prefixes
    pub fn with_delegate_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.delegate_prefixes = prefixes;
        self
    }

    /// Add newly collected units; names already known are kept as they are
    ///
    /// Returns how many units were new.
    pub fn add_units(&mut self, units: CollectedUnits) -> usize {
        let mut added = 0;
        for (name, bytes) in units {
            if self.entries.contains_key(&name) {
                tracing::warn!(unit = %name, "unit already collected; keeping the first copy");
                continue;
            }
            self.entries.insert(name, UnitEntry::Collected(bytes));
            added += 1;
        }
        added
    }

    /// Chain applied to units that have not been transformed yet
    pub fn chain_mut(&mut self) -> &mut TransformerChain {
        &mut self.chain
    }

    pub fn chain(&self) -> &TransformerChain {
        &self.chain
    }

    /// Load every collected unit in collection order
    ///
    /// Names that can never be defined from a source (delegated or
    /// internal) are skipped with a warning.
    pub fn load_all(&mut self) -> Result<()> {
        let pending: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.state() != UnitState::Loaded)
            .map(|(name, _)| name.clone())
            .collect();

        for name in pending {
            if self.is_delegated(&name) || self.is_internal(&name) {
                tracing::warn!(unit = %name, "collected unit shadows a reserved name; skipped");
                continue;
            }
            self.load_by_name(&name)?;
        }
        Ok(())
    }

    /// Resolve `name` into a loaded unit, defining it if needed
    pub fn load_by_name(&mut self, name: &str) -> Result<Arc<LoadedUnit>> {
        if self.is_delegated(name) {
            return self.find_in_parent(name);
        }

        if self.is_internal(name) {
            if name == LAUNCHER_UNIT {
                return self.find_in_parent(name);
            }
            if self.flags.access {
                tracing::warn!(unit = name, "rejected access to pipeline-internal unit");
            }
            return Err(LoadstoneError::IllegalAccess {
                name: self.flags.developer.then(|| name.to_string()),
            });
        }

        match self.entries.get(name) {
            Some(UnitEntry::Loaded(unit)) => return Ok(Arc::clone(unit)),
            Some(_) => {}
            None => return self.find_in_parent(name),
        }

        if let Some(start) = self.in_progress.iter().position(|n| n == name) {
            let mut chain = self.in_progress[start..].to_vec();
            chain.push(name.to_string());
            return Err(LoadstoneError::CircularInheritance {
                chain: chain.join(" -> "),
            });
        }

        self.in_progress.push(name.to_string());
        let result = self.define(name);
        self.in_progress.pop();
        result
    }

    /// Read-only lookup of an already loaded unit
    pub fn get(&self, name: &str) -> Option<Arc<LoadedUnit>> {
        match self.entries.get(name) {
            Some(UnitEntry::Loaded(unit)) => Some(Arc::clone(unit)),
            _ => None,
        }
    }

    /// Units in the order they were defined
    pub fn loaded(&self) -> &[Arc<LoadedUnit>] {
        &self.load_order
    }

    pub fn state(&self, name: &str) -> Option<UnitState> {
        self.entries.get(name).map(UnitEntry::state)
    }

    /// Names of every collected unit, in collection order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn is_delegated(&self, name: &str) -> bool {
        self.delegate_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    fn is_internal(&self, name: &str) -> bool {
        name.starts_with(INTERNAL_NAMESPACE)
    }

    fn find_in_parent(&self, name: &str) -> Result<Arc<LoadedUnit>> {
        self.parent
            .find(name)
            .ok_or_else(|| LoadstoneError::UnitNotFound {
                name: name.to_string(),
            })
    }

    fn define(&mut self, name: &str) -> Result<Arc<LoadedUnit>> {
        let raw = match self.entries.get(name) {
            Some(UnitEntry::Collected(bytes) | UnitEntry::Transformed(bytes)) => bytes,
            Some(UnitEntry::Loaded(unit)) => return Ok(Arc::clone(unit)),
            None => {
                return Err(LoadstoneError::UnitNotFound {
                    name: name.to_string(),
                });
            }
        };
        let declared = UnitDescriptor::from_bytes(name, raw)?;

        let supertype = declared
            .supertype
            .as_deref()
            .map(|ancestor| self.load_ancestor(name, ancestor))
            .transpose()?;
        let interfaces = declared
            .interfaces
            .iter()
            .map(|ancestor| self.load_ancestor(name, ancestor))
            .collect::<Result<Vec<_>>>()?;

        let bytes = self.transformed_bytes(name)?;
        let descriptor = UnitDescriptor::from_bytes(name, &bytes)?;
        if descriptor.supertype != declared.supertype || descriptor.interfaces != declared.interfaces
        {
            return Err(LoadstoneError::MalformedUnit {
                name: name.to_string(),
                reason: "transform rules changed the unit's ancestors".to_string(),
            });
        }

        let unit = Arc::new(LoadedUnit::define(descriptor, supertype, interfaces));
        self.entries
            .insert(name.to_string(), UnitEntry::Loaded(Arc::clone(&unit)));
        self.load_order.push(Arc::clone(&unit));

        if self.flags.loads {
            tracing::info!(
                unit = name,
                slots = unit.slot_names().count(),
                "unit defined"
            );
        }
        Ok(unit)
    }

    /// Run the chain over a collected unit, once
    fn transformed_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let transformed = match self.entries.get(name) {
            Some(UnitEntry::Collected(raw)) => self.chain.transform(name, raw),
            Some(UnitEntry::Transformed(bytes)) => return Ok(bytes.clone()),
            _ => {
                return Err(LoadstoneError::UnitNotFound {
                    name: name.to_string(),
                });
            }
        };

        tracing::debug!(unit = name, digest = %crate::hash::short_digest(&transformed), "unit transformed");
        self.entries
            .insert(name.to_string(), UnitEntry::Transformed(transformed.clone()));
        Ok(transformed)
    }

    fn load_ancestor(&mut self, unit: &str, ancestor: &str) -> Result<Arc<LoadedUnit>> {
        self.load_by_name(ancestor).map_err(|e| match e {
            LoadstoneError::UnitNotFound { name } if name == ancestor => {
                LoadstoneError::UnresolvedAncestor {
                    unit: unit.to_string(),
                    ancestor: name,
                }
            }
            other => other,
        })
    }
}
