//! Dependency graph over registries
//!
//! Nodes are registry names, numbered by registration order. Edges point
//! from a registry to each registry it depends on:
//!
//! ```text
//! IndexMap<String, Vec<String>>          DependencyGraph
//!   "tiles"  → ["blocks", "items"]        0 tiles  → [1, 2]
//!   "blocks" → []                  ==>    1 blocks → []
//!   "items"  → ["blocks"]                 2 items  → [1]
//! ```
//!
//! The graph is rebuilt for every resolution and never persisted.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{LoadstoneError, Result};

/// Index-based adjacency list
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    names: Vec<String>,
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Build the graph from a registration-ordered dependency map
    ///
    /// Repeated declarations of the same dependency collapse into one edge.
    ///
    /// # Errors
    ///
    /// Returns `DependencyNotFound` if a dependency names an unregistered node.
    pub fn build(dependencies: &IndexMap<String, Vec<String>>) -> Result<Self> {
        let index: HashMap<&str, usize> = dependencies
            .keys()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut edges = Vec::with_capacity(dependencies.len());
        for (name, deps) in dependencies {
            let mut targets: Vec<usize> = Vec::with_capacity(deps.len());
            for dep in deps {
                let target = *index.get(dep.as_str()).ok_or_else(|| {
                    LoadstoneError::DependencyNotFound {
                        name: dep.clone(),
                        required_by: name.clone(),
                    }
                })?;
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
            edges.push(targets);
        }

        Ok(Self {
            names: dependencies.keys().cloned().collect(),
            edges,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of node `node`
    pub fn name(&self, node: usize) -> &str {
        &self.names[node]
    }

    /// Nodes that `node` depends on, in declaration order
    pub fn dependencies(&self, node: usize) -> &[usize] {
        &self.edges[node]
    }

    /// Whether `node` declares itself as a dependency
    pub fn has_self_loop(&self, node: usize) -> bool {
        self.edges[node].contains(&node)
    }

    /// Map node indices back to names
    pub fn names_of(&self, nodes: &[usize]) -> Vec<String> {
        nodes.iter().map(|&n| self.names[n].clone()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) mod tests {
    use super::*;

    /// Build a registration-ordered dependency map from literals
    pub(crate) fn deps(entries: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(name, deps)| {
                (
                    (*name).to_string(),
                    deps.iter().map(|d| (*d).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_build_numbers_nodes_by_registration() {
        let graph = DependencyGraph::build(&deps(&[
            ("tiles", &["blocks", "items"]),
            ("blocks", &[]),
            ("items", &["blocks"]),
        ]))
        .expect("build graph");

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.name(0), "tiles");
        assert_eq!(graph.dependencies(0), &[1, 2]);
        assert_eq!(graph.dependencies(2), &[1]);
    }

    #[test]
    fn test_duplicate_dependencies_collapse() {
        let graph = DependencyGraph::build(&deps(&[("a", &[]), ("b", &["a", "a"])]))
            .expect("build graph");
        assert_eq!(graph.dependencies(1), &[0]);
    }

    #[test]
    fn test_unknown_dependency() {
        let result = DependencyGraph::build(&deps(&[("tiles", &["blocks"])]));

        match result {
            Err(LoadstoneError::DependencyNotFound { name, required_by }) => {
                assert_eq!(name, "blocks");
                assert_eq!(required_by, "tiles");
            }
            other => panic!("Expected DependencyNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_detection() {
        let graph = DependencyGraph::build(&deps(&[("a", &["a"]), ("b", &["a"])]))
            .expect("build graph");
        assert!(graph.has_self_loop(0));
        assert!(!graph.has_self_loop(1));
    }
}
