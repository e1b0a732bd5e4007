//! Boot pipeline: collect, transform, load, index, dispatch
//!
//! ```text
//! sources ─► ArtifactCollector ─► IsolatedLoader ─► MarkerIndex ─► entry point
//!                                   │                                 │
//!                          TransformerChain                       Launcher
//! ```
//!
//! Every error escaping `run` is fatal and ends the process with
//! `FATAL_EXIT_CODE`.

use std::fmt::Write as _;
use std::sync::Arc;

use miette::Diagnostic;

use crate::collector::{ArtifactCollector, CollectedUnits};
use crate::config::{DebugFlags, LaunchConfig};
use crate::error::{LoadstoneError, Result};
use crate::index::MarkerIndex;
use crate::loader::IsolatedLoader;
use crate::transform::{TransformerChain, default_rules};

pub mod bindings;
pub mod dispatch;
pub mod launcher;

pub use bindings::{Bindings, EntryPoint};
pub use dispatch::{dispatch, entry_method, select_entry_point};
pub use launcher::{DEFAULT_ASSETS_DIR, Launcher};

/// Process exit code for any error escaping the boot process
pub const FATAL_EXIT_CODE: i32 = 3;

/// Message shown instead of withheld failure detail
const WITHHELD_MESSAGE: &str = "the application failed to start (set LOADSTONE_DEV=1 for details)";

/// One boot pipeline over a fixed configuration
pub struct Pipeline {
    pub(crate) config: LaunchConfig,
    pub(crate) flags: DebugFlags,
    pub(crate) loader: IsolatedLoader,
    pub(crate) index: Arc<MarkerIndex>,
    pub(crate) bindings: Bindings,
}

impl Pipeline {
    /// Collect units from the configured sources and prepare the loader
    pub fn new(config: LaunchConfig, flags: DebugFlags, bindings: Bindings) -> Result<Self> {
        let units = ArtifactCollector::new(config.sources.iter().cloned()).collect()?;
        tracing::info!(
            sources = config.sources.len(),
            units = units.len(),
            "units collected"
        );
        Ok(Self::from_units(config, flags, bindings, units))
    }

    /// Prepare a pipeline over units that were already collected
    pub fn from_units(
        config: LaunchConfig,
        flags: DebugFlags,
        bindings: Bindings,
        units: CollectedUnits,
    ) -> Self {
        let flags = flags.with_fallback_dump_dir(config.dump_dir.clone());
        let chain = TransformerChain::with_rules(flags.clone(), default_rules(&config.public_types));
        let loader = IsolatedLoader::new(units, chain, flags.clone())
            .with_delegate_prefixes(config.delegate_prefixes.clone());

        Self {
            config,
            flags,
            loader,
            index: Arc::new(MarkerIndex::default()),
            bindings,
        }
    }

    /// Define every pending unit and rebuild the marker index
    pub fn load(&mut self) -> Result<Arc<MarkerIndex>> {
        self.loader.load_all()?;

        let index = Arc::new(MarkerIndex::build(self.loader.loaded(), &self.flags));
        tracing::debug!(
            units = self.loader.loaded().len(),
            kinds = index.len(),
            "marker index built"
        );
        self.index = Arc::clone(&index);
        Ok(index)
    }

    /// Snapshot of the latest marker index
    pub fn markers(&self) -> Arc<MarkerIndex> {
        Arc::clone(&self.index)
    }

    pub fn loader(&self) -> &IsolatedLoader {
        &self.loader
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn flags(&self) -> &DebugFlags {
        &self.flags
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Load everything and hand control to the entry point
    pub fn boot(&mut self, args: &[String]) -> Result<()> {
        self.load()?;
        dispatch(self, args)
    }
}

/// Boot the application described by `config`, exiting on failure
pub fn run(config: LaunchConfig, flags: DebugFlags, bindings: Bindings, args: &[String]) {
    let result = Pipeline::new(config, flags.clone(), bindings)
        .and_then(|mut pipeline| pipeline.boot(args));

    if let Err(err) = result {
        terminate(&err, &flags);
    }
}

/// Report `err` and exit with `FATAL_EXIT_CODE`
pub fn terminate(err: &LoadstoneError, flags: &DebugFlags) -> ! {
    tracing::error!(code = ?err.code().map(|c| c.to_string()), "boot failed");
    eprintln!("Error: {}", fatal_message(err, flags));
    std::process::exit(FATAL_EXIT_CODE)
}

/// Message shown for a fatal error
///
/// Developer mode adds the diagnostic code and help. Outside it, sensitive
/// failures are replaced by a generic message.
pub fn fatal_message(err: &LoadstoneError, flags: &DebugFlags) -> String {
    if flags.developer {
        let mut message = err.to_string();
        if let Some(code) = err.code() {
            let _ = write!(message, "\n  code: {code}");
        }
        if let Some(help) = err.help() {
            let _ = write!(message, "\n  help: {help}");
        }
        message
    } else if err.is_sensitive() {
        WITHHELD_MESSAGE.to_string()
    } else {
        err.to_string()
    }
}
