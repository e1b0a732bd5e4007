//! Topological sort using Kahn's algorithm
//!
//! ## Algorithm
//!
//! 1. Every node starts with a pending count equal to its number of
//!    dependencies.
//! 2. Nodes with nothing pending are ready. The ready set is a min-heap on
//!    registration index, so the earliest-registered ready node is always
//!    emitted next and the output is reproducible.
//! 3. Emitting a node releases one pending dependency of each dependent.
//!
//! Nodes still pending at the end sit on, or downstream of, a cycle.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::resolver::graph::DependencyGraph;

/// Outcome of a sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    /// Every node, dependencies first
    Ordered(Vec<usize>),
    /// Nodes that could not be ordered, ascending
    Blocked(Vec<usize>),
}

/// Order `graph` so that every dependency precedes its dependents
pub fn topological_sort(graph: &DependencyGraph) -> SortOutcome {
    let len = graph.len();
    let mut pending: Vec<usize> = (0..len).map(|n| graph.dependencies(n).len()).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); len];
    for node in 0..len {
        for &dep in graph.dependencies(node) {
            dependents[dep].push(node);
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..len)
        .filter(|&n| pending[n] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(len);

    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        for &dependent in &dependents[node] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    if order.len() == len {
        SortOutcome::Ordered(order)
    } else {
        SortOutcome::Blocked((0..len).filter(|&n| pending[n] > 0).collect())
    }
}
