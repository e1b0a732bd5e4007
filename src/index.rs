//! Marker index: the discovery primitive over loaded units
//!
//! Built once per load pass from the loader's load order. A snapshot is
//! never mutated; a new load pass produces a new index.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::DebugFlags;
use crate::loader::LoadedUnit;
use crate::unit::MarkerKind;

/// Marker kind → units carrying it, in load order
#[derive(Debug, Default)]
pub struct MarkerIndex {
    entries: BTreeMap<MarkerKind, Vec<Arc<LoadedUnit>>>,
}

impl MarkerIndex {
    /// Index the type-level markers of `units`
    ///
    /// A unit carrying the same kind twice is listed once for that kind.
    pub fn build(units: &[Arc<LoadedUnit>], flags: &DebugFlags) -> Self {
        let mut entries: BTreeMap<MarkerKind, Vec<Arc<LoadedUnit>>> = BTreeMap::new();

        for unit in units {
            let mut seen = Vec::new();
            for marker in unit.markers() {
                if seen.contains(&marker.kind) {
                    continue;
                }
                seen.push(marker.kind);

                if flags.markers {
                    tracing::info!(
                        unit = unit.name(),
                        marker = %marker.kind,
                        value = marker.value.as_deref().unwrap_or(""),
                        "marker discovered"
                    );
                }
                entries.entry(marker.kind).or_default().push(Arc::clone(unit));
            }
        }

        Self { entries }
    }

    /// Units carrying `kind`; empty when none do
    pub fn query(&self, kind: MarkerKind) -> &[Arc<LoadedUnit>] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Kinds with at least one unit
    pub fn kinds(&self) -> impl Iterator<Item = MarkerKind> + '_ {
        self.entries.keys().copied()
    }

    /// Number of (kind, unit) pairs
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
