//! Entry point selection and dispatch

use std::sync::Arc;

use crate::boot::{Launcher, Pipeline};
use crate::error::{LoadstoneError, Result, contain_panic};
use crate::index::MarkerIndex;
use crate::loader::{LAUNCHER_UNIT, LoadedUnit};
use crate::unit::{MarkerKind, Method, STRING_ARRAY, VOID};

/// The single unit carrying the `entry_point` marker
pub fn select_entry_point(markers: &MarkerIndex) -> Result<Arc<LoadedUnit>> {
    match markers.query(MarkerKind::EntryPoint) {
        [] => Err(LoadstoneError::NoEntryPoint),
        [unit] => Ok(Arc::clone(unit)),
        many => Err(LoadstoneError::AmbiguousEntryPoint {
            candidates: many
                .iter()
                .map(|unit| unit.name())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// The entry method: static, returns void, takes `(loadstone.Launcher, string[])`
pub fn entry_method(unit: &LoadedUnit) -> Result<&Method> {
    let mut matching = unit.descriptor().methods.iter().filter(|method| {
        method.is_static && method.returns == VOID && method.params == [LAUNCHER_UNIT, STRING_ARRAY]
    });

    let method = matching
        .next()
        .ok_or_else(|| LoadstoneError::MalformedEntryPoint {
            unit: unit.name().to_string(),
            reason: format!(
                "no static method returns {VOID} and takes ({LAUNCHER_UNIT}, {STRING_ARRAY})"
            ),
        })?;

    if let Some(other) = matching.next() {
        return Err(LoadstoneError::MalformedEntryPoint {
            unit: unit.name().to_string(),
            reason: format!(
                "methods '{}' and '{}' both match the entry signature",
                method.name, other.name
            ),
        });
    }

    Ok(method)
}

/// Invoke the bound entry point with a launcher over `pipeline`
///
/// Pipeline errors raised by the entry point propagate unchanged;
/// application errors and panics become `EntryPointFailed`.
pub fn dispatch(pipeline: &mut Pipeline, args: &[String]) -> Result<()> {
    let unit = select_entry_point(&pipeline.markers())?;
    let method = entry_method(&unit)?.name.clone();
    let entry = pipeline
        .bindings
        .entry_point(unit.name())
        .ok_or_else(|| LoadstoneError::MissingBinding {
            unit: unit.name().to_string(),
            kind: "entry point",
        })?;

    tracing::info!(unit = unit.name(), method = %method, args = args.len(), "dispatching entry point");

    let developer = pipeline.flags.developer;
    let mut launcher = Launcher::new(pipeline);
    let outcome = contain_panic(developer, || entry.launch(&mut launcher, args));

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(LoadstoneError::Application { message })) => Err(LoadstoneError::EntryPointFailed {
            unit: unit.name().to_string(),
            reason: message,
        }),
        Ok(Err(err)) => Err(err),
        Err(reason) => Err(LoadstoneError::EntryPointFailed {
            unit: unit.name().to_string(),
            reason,
        }),
    }
}
