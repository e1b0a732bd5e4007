//! Loadstone - application bootstrap
//!
//! Collects code units from directories and archives, rewrites them in
//! flight, defines them into an isolated table, indexes their markers and
//! hands control to the single entry point. Applications then initialize
//! their registries in dependency order from JSON assets.
//!
//! ```no_run
//! use loadstone::{Bindings, DebugFlags, LaunchConfig};
//!
//! let bindings = Bindings::new().with_entry_point("app.Main", |launcher, _args| {
//!     let markers = launcher.markers();
//!     println!("{} marker kinds", markers.len());
//!     Ok(())
//! });
//!
//! let config = LaunchConfig::default().with_sources(vec!["units".into()]);
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! loadstone::boot::run(config, DebugFlags::from_env(), bindings, &args);
//! ```

pub mod boot;
pub mod collector;
pub mod config;
pub mod error;
pub mod hash;
pub mod index;
pub mod loader;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod transform;
pub mod unit;

pub use boot::{Bindings, EntryPoint, FATAL_EXIT_CODE, Launcher, Pipeline};
pub use config::{DebugFlags, LaunchConfig};
pub use error::{LoadstoneError, Result};
pub use index::MarkerIndex;
pub use loader::{IsolatedLoader, LoadedUnit};
pub use registry::{Registry, RegistrySet, ResourceId, ResourceParser};
pub use transform::{TransformRule, TransformerChain};
pub use unit::{MarkerKind, UnitDescriptor};
