//! Native implementations bound to units by name
//!
//! Units only describe behaviour; the host binary supplies it. An entry
//! point unit is bound to an `EntryPoint`, a parser unit to a
//! `ResourceParser`. The table is built once, before boot.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::boot::Launcher;
use crate::error::Result;
use crate::registry::ResourceParser;

/// Native body of an entry method
pub trait EntryPoint {
    fn launch(&self, launcher: &mut Launcher<'_>, args: &[String]) -> Result<()>;
}

impl<F> EntryPoint for F
where
    F: Fn(&mut Launcher<'_>, &[String]) -> Result<()>,
{
    fn launch(&self, launcher: &mut Launcher<'_>, args: &[String]) -> Result<()> {
        self(launcher, args)
    }
}

/// Table of native implementations keyed by unit name
#[derive(Default, Clone)]
pub struct Bindings {
    entry_points: IndexMap<String, Arc<dyn EntryPoint>>,
    parsers: IndexMap<String, Arc<dyn ResourceParser>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the entry method of unit `unit` to a closure
    pub fn with_entry_point<F>(self, unit: impl Into<String>, entry: F) -> Self
    where
        F: Fn(&mut Launcher<'_>, &[String]) -> Result<()> + 'static,
    {
        self.with_entry(unit, entry)
    }

    /// Bind the entry method of unit `unit`
    pub fn with_entry(mut self, unit: impl Into<String>, entry: impl EntryPoint + 'static) -> Self {
        self.entry_points.insert(unit.into(), Arc::new(entry));
        self
    }

    /// Bind the parser behind unit `unit`
    pub fn with_parser(
        mut self,
        unit: impl Into<String>,
        parser: impl ResourceParser + 'static,
    ) -> Self {
        self.parsers.insert(unit.into(), Arc::new(parser));
        self
    }

    pub fn entry_point(&self, unit: &str) -> Option<Arc<dyn EntryPoint>> {
        self.entry_points.get(unit).cloned()
    }

    pub fn parser(&self, unit: &str) -> Option<Arc<dyn ResourceParser>> {
        self.parsers.get(unit).cloned()
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("entry_points", &self.entry_points.keys().collect::<Vec<_>>())
            .field("parsers", &self.parsers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::JsonParser;

    #[test]
    fn test_lookup_by_unit_name() {
        let bindings = Bindings::new()
            .with_entry_point("app.Main", |_, _| Ok(()))
            .with_parser("app.TileParser", JsonParser::<u32>::new());

        assert!(bindings.entry_point("app.Main").is_some());
        assert!(bindings.entry_point("app.Other").is_none());
        assert!(bindings.parser("app.TileParser").is_some());
        assert!(bindings.parser("app.Main").is_none());
    }

    #[test]
    fn test_debug_lists_bound_units() {
        let bindings = Bindings::new().with_parser("app.TileParser", JsonParser::<u32>::new());
        let debug = format!("{bindings:?}");
        assert!(debug.contains("app.TileParser"));
    }
}
