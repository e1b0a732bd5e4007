//! Error types and handling for loadstone
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Variants are grouped by boot stage:
//! - collection: unreadable source locations
//! - transform: a single rewrite rule failed (recovered locally by the chain)
//! - load: illegal access, unresolved units, malformed descriptors
//! - entry point: missing, ambiguous or failing entry point
//! - dependency: cycles and unknown registry dependencies
//! - registry: frozen registries, resource loading and type validation

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use miette::Diagnostic;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Main error type for loadstone operations
#[derive(Error, Diagnostic, Debug)]
pub enum LoadstoneError {
    // Collection errors
    #[error("Failed to read unit source: {path}: {reason}")]
    #[diagnostic(
        code(loadstone::collect::source_unreadable),
        help("Every configured source must be a readable directory or zip archive")
    )]
    SourceUnreadable { path: String, reason: String },

    // Transform errors
    #[error("Transform rule '{rule}' failed on unit '{unit}': {reason}")]
    #[diagnostic(code(loadstone::transform::rule_failed))]
    TransformFailed {
        rule: String,
        unit: String,
        reason: String,
    },

    // Load errors
    #[error("Unit not found: {name}")]
    #[diagnostic(
        code(loadstone::load::not_found),
        help("Check that the unit is present in one of the configured sources")
    )]
    UnitNotFound { name: String },

    #[error(
        "Illegal access to a pipeline-internal unit{}",
        .name.as_deref().map(|n| format!(": {n}")).unwrap_or_default()
    )]
    #[diagnostic(
        code(loadstone::load::illegal_access),
        help("Only the exported launcher unit may be referenced from application code")
    )]
    IllegalAccess { name: Option<String> },

    #[error("Unit '{unit}' references '{ancestor}', which could not be resolved")]
    #[diagnostic(code(loadstone::load::unresolved_ancestor))]
    UnresolvedAncestor { unit: String, ancestor: String },

    #[error("Circular inheritance detected: {chain}")]
    #[diagnostic(code(loadstone::load::circular_inheritance))]
    CircularInheritance { chain: String },

    #[error("Malformed unit '{name}': {reason}")]
    #[diagnostic(code(loadstone::load::malformed))]
    MalformedUnit { name: String, reason: String },

    #[error("Field '{field}' of unit '{unit}' is not an injection slot")]
    #[diagnostic(
        code(loadstone::load::not_injectable),
        help("Only static, non-final fields without a constant value accept late bindings")
    )]
    NotInjectable { unit: String, field: String },

    #[error("Field '{field}' of unit '{unit}' is already bound")]
    #[diagnostic(code(loadstone::load::already_bound))]
    AlreadyBound { unit: String, field: String },

    // Entry point errors
    #[error("No entry point found among loaded units")]
    #[diagnostic(
        code(loadstone::entry::missing),
        help("Exactly one unit must carry the 'entry_point' marker")
    )]
    NoEntryPoint,

    #[error("Multiple entry points found: {candidates}")]
    #[diagnostic(
        code(loadstone::entry::ambiguous),
        help("Exactly one unit must carry the 'entry_point' marker")
    )]
    AmbiguousEntryPoint { candidates: String },

    #[error("Malformed entry point '{unit}': {reason}")]
    #[diagnostic(
        code(loadstone::entry::malformed),
        help("The entry method must return void and take (loadstone.Launcher, string[])")
    )]
    MalformedEntryPoint { unit: String, reason: String },

    #[error("No native {kind} bound for unit '{unit}'")]
    #[diagnostic(code(loadstone::entry::missing_binding))]
    MissingBinding { unit: String, kind: &'static str },

    #[error("Entry point '{unit}' failed: {reason}")]
    #[diagnostic(code(loadstone::entry::failed))]
    EntryPointFailed { unit: String, reason: String },

    // Dependency errors
    #[error("Circular dependency detected between registries:\n{report}")]
    #[diagnostic(
        code(loadstone::deps::circular),
        help("Break the cycle by removing one of the listed dependency declarations")
    )]
    CircularDependency {
        report: String,
        cycles: Vec<Vec<String>>,
    },

    #[error("Dependency not found: '{name}' (required by registry '{required_by}')")]
    #[diagnostic(code(loadstone::deps::not_found))]
    DependencyNotFound { name: String, required_by: String },

    #[error("Registry already registered: {name}")]
    #[diagnostic(code(loadstone::deps::duplicate))]
    DuplicateRegistry { name: String },

    // Registry errors
    #[error("Registry '{name}' is frozen")]
    #[diagnostic(code(loadstone::registry::frozen))]
    RegistryFrozen { name: String },

    #[error("Registry '{name}' cannot be unfrozen: {reason}")]
    #[diagnostic(code(loadstone::registry::unfreeze_denied))]
    UnfreezeNotPermitted { name: String, reason: String },

    #[error("Registry not found: {name}")]
    #[diagnostic(code(loadstone::registry::not_found))]
    RegistryNotFound { name: String },

    #[error("Registry '{registry}' already contains '{key}'")]
    #[diagnostic(code(loadstone::registry::duplicate_entry))]
    DuplicateEntry { registry: String, key: String },

    #[error("Invalid resource id '{id}': {reason}")]
    #[diagnostic(code(loadstone::registry::invalid_id))]
    InvalidResourceId { id: String, reason: String },

    #[error("Resource '{resource}' for registry '{registry}' not found at {path}")]
    #[diagnostic(code(loadstone::registry::resource_not_found))]
    ResourceNotFound {
        registry: String,
        resource: String,
        path: String,
    },

    #[error("Failed to load resource '{resource}' for registry '{registry}': {reason}")]
    #[diagnostic(code(loadstone::registry::resource_failed))]
    ResourceLoadFailed {
        registry: String,
        resource: String,
        reason: String,
    },

    #[error("No parser declared for value type '{value_type}'")]
    #[diagnostic(
        code(loadstone::registry::parser_not_found),
        help("Mark exactly one unit with a 'parser' marker whose value is the registry's value type")
    )]
    ParserNotFound { value_type: String },

    #[error("Multiple parsers declared for value type '{value_type}': {candidates}")]
    #[diagnostic(code(loadstone::registry::parser_ambiguous))]
    AmbiguousParser {
        value_type: String,
        candidates: String,
    },

    #[error(
        "Resource '{resource}' (variant '{variant}') produced a value that is not a '{expected}' for registry '{registry}'"
    )]
    #[diagnostic(code(loadstone::registry::type_mismatch))]
    TypeMismatch {
        registry: String,
        resource: String,
        variant: String,
        expected: String,
    },

    #[error(
        "Resource '{resource}' (variant '{variant}') produced a key outside its namespace for registry '{registry}'"
    )]
    #[diagnostic(code(loadstone::registry::namespace_mismatch))]
    NamespaceMismatch {
        registry: String,
        resource: String,
        variant: String,
    },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(loadstone::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(loadstone::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    // Application errors surfaced through an entry point
    #[error("{message}")]
    #[diagnostic(code(loadstone::application))]
    Application { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(loadstone::fs::io_error))]
    IoError { message: String },
}

impl LoadstoneError {
    /// Whether this error aborts the boot process.
    ///
    /// Only transform failures are recovered locally; every other error means
    /// code integrity or registry contents can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LoadstoneError::TransformFailed { .. })
    }

    /// Whether the message should be withheld outside developer mode
    pub fn is_sensitive(&self) -> bool {
        matches!(self, LoadstoneError::EntryPointFailed { .. })
    }

    /// Convenience constructor for application-level failures
    pub fn application(message: impl Into<String>) -> Self {
        LoadstoneError::Application {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for LoadstoneError {
    fn from(err: std::io::Error) -> Self {
        LoadstoneError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for LoadstoneError {
    fn from(err: serde_yaml::Error) -> Self {
        LoadstoneError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for LoadstoneError {
    fn from(err: serde_json::Error) -> Self {
        LoadstoneError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for LoadstoneError {
    fn from(err: zip::result::ZipError) -> Self {
        LoadstoneError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, LoadstoneError>;

/// Extract a readable message from a caught panic payload
pub(crate) fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

thread_local! {
    /// `Some(report)` while this thread runs inside `contain_panic`
    static CONTAINED: Cell<Option<bool>> = const { Cell::new(None) };
}

static QUIET_HOOK: Once = Once::new();

/// Wrap the process panic hook once
///
/// Panics raised inside `contain_panic` never reach the previous hook; they
/// go to `tracing` when the caller asked for reporting and are dropped
/// otherwise. Every other panic is handed to the previous hook unchanged.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| match CONTAINED.with(Cell::get) {
            Some(true) => tracing::debug!(panic = %info, "contained panic"),
            Some(false) => {}
            None => previous(info),
        }));
    });
}

/// Run `f`, turning a panic into its reason
///
/// The panic message and location are only logged when `report` is set.
pub(crate) fn contain_panic<R>(report: bool, f: impl FnOnce() -> R) -> std::result::Result<R, String> {
    install_quiet_hook();
    let outer = CONTAINED.with(|contained| contained.replace(Some(report)));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINED.with(|contained| contained.set(outer));
    outcome.map_err(|payload| panic_reason(&*payload))
}
