//! Dependency-ordered registry resolution
//!
//! This module handles:
//! - Building the registry dependency graph
//! - Producing a deterministic topological order, dependencies first
//! - Reporting the components that make ordering impossible
//!
//! ```text
//! A: []        B: [A]        C: [A, B]      →  A, B, C
//! A: [C]       B: [A]        C: [A, B]      →  cycle {A, B, C}
//! ```

pub mod graph;
pub mod scc;
pub mod sort;

use indexmap::IndexMap;

use crate::error::{LoadstoneError, Result};

pub use graph::DependencyGraph;
pub use scc::find_cycles;
pub use sort::{SortOutcome, topological_sort};

/// Resolve a registration-ordered dependency map into a load order
///
/// # Errors
///
/// - `DependencyNotFound` if a dependency names an unregistered registry
/// - `CircularDependency` if the graph contains a cycle, carrying every
///   offending component
pub fn resolve(dependencies: &IndexMap<String, Vec<String>>) -> Result<Vec<String>> {
    let graph = DependencyGraph::build(dependencies)?;

    match topological_sort(&graph) {
        SortOutcome::Ordered(order) => Ok(graph.names_of(&order)),
        SortOutcome::Blocked(blocked) => {
            let cycles: Vec<Vec<String>> = find_cycles(&graph)
                .iter()
                .map(|component| graph.names_of(component))
                .collect();

            tracing::debug!(
                blocked = blocked.len(),
                cycles = cycles.len(),
                "dependency resolution blocked"
            );

            Err(LoadstoneError::CircularDependency {
                report: format_cycles(&cycles),
                cycles,
            })
        }
    }
}

/// Render cycle components as an indented list, one component per line
pub fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|component| {
            if component.len() == 1 {
                format!("  - {{{}}} (depends on itself)", component[0])
            } else {
                format!("  - {{{}}}", component.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
