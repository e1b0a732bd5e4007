//! The pipeline handle passed to entry points

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::boot::{Bindings, Pipeline};
use crate::collector::ArtifactCollector;
use crate::config::{DebugFlags, LaunchConfig};
use crate::error::Result;
use crate::index::MarkerIndex;
use crate::loader::LoadedUnit;
use crate::registry::{RegistryLoader, RegistrySet};
use crate::transform::TransformRule;

/// Directory used for registry assets when the configuration names none
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Handle through which the application drives the pipeline after dispatch
pub struct Launcher<'a> {
    pipeline: &'a mut Pipeline,
}

impl<'a> Launcher<'a> {
    pub(crate) fn new(pipeline: &'a mut Pipeline) -> Self {
        Self { pipeline }
    }

    /// Add a rewrite rule for units that have not been transformed yet
    pub fn register_transformer(&mut self, rule: Box<dyn TransformRule>) {
        tracing::debug!(rule = rule.name(), priority = rule.priority(), "transform rule registered");
        self.pipeline.loader.chain_mut().register(rule);
    }

    /// Collect units from one more source location
    ///
    /// Returns how many new units were added. They are defined by the next
    /// `load`.
    pub fn add_source(&mut self, source: impl Into<PathBuf>) -> Result<usize> {
        let units = ArtifactCollector::new([source]).collect()?;
        Ok(self.pipeline.loader.add_units(units))
    }

    /// Run a load pass and return the fresh marker index
    pub fn load(&mut self) -> Result<Arc<MarkerIndex>> {
        self.pipeline.load()
    }

    /// The current marker index snapshot
    pub fn markers(&self) -> Arc<MarkerIndex> {
        self.pipeline.markers()
    }

    /// Read-only lookup of a loaded unit
    pub fn unit(&self, name: &str) -> Option<Arc<LoadedUnit>> {
        self.pipeline.loader.get(name)
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.pipeline.config
    }

    pub fn flags(&self) -> &DebugFlags {
        &self.pipeline.flags
    }

    pub fn bindings(&self) -> &Bindings {
        &self.pipeline.bindings
    }

    /// Populate and freeze `set` from the configured assets
    pub fn load_registries(&self, set: &mut RegistrySet) -> Result<()> {
        let config = &self.pipeline.config;
        let assets = config
            .assets
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_ASSETS_DIR));

        RegistryLoader::new(assets)
            .with_namespace(config.namespace.clone())
            .load(set, &self.pipeline.markers(), &self.pipeline.bindings)
    }
}
