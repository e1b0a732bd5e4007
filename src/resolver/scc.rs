//! Cycle detection with Tarjan's strongly connected components
//!
//! Runs only after a sort has failed. The traversal is iterative: each frame
//! of the explicit call stack is `(node, next edge to follow)`, so deep
//! dependency chains cannot overflow the thread stack.
//!
//! A component is reported when it has two or more members, or when its
//! single member depends on itself.

use crate::resolver::graph::DependencyGraph;

struct Tarjan<'a> {
    graph: &'a DependencyGraph,
    index_of: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    components: Vec<Vec<usize>>,
}

impl<'a> Tarjan<'a> {
    fn new(graph: &'a DependencyGraph) -> Self {
        let len = graph.len();
        Self {
            graph,
            index_of: vec![None; len],
            lowlink: vec![0; len],
            on_stack: vec![false; len],
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        }
    }

    fn discover(&mut self, node: usize) {
        self.index_of[node] = Some(self.next_index);
        self.lowlink[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;
    }

    fn run_from(&mut self, root: usize) {
        let graph = self.graph;
        let mut call_stack: Vec<(usize, usize)> = vec![(root, 0)];
        self.discover(root);

        while let Some(&(node, edge)) = call_stack.last() {
            let deps = graph.dependencies(node);

            if edge < deps.len() {
                if let Some(frame) = call_stack.last_mut() {
                    frame.1 += 1;
                }
                let next = deps[edge];
                match self.index_of[next] {
                    None => {
                        self.discover(next);
                        call_stack.push((next, 0));
                    }
                    Some(next_index) if self.on_stack[next] => {
                        self.lowlink[node] = self.lowlink[node].min(next_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            call_stack.pop();
            if let Some(&(parent, _)) = call_stack.last() {
                self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[node]);
            }
            if Some(self.lowlink[node]) == self.index_of[node] {
                self.close_component(node);
            }
        }
    }

    fn close_component(&mut self, root: usize) {
        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack[member] = false;
            component.push(member);
            if member == root {
                break;
            }
        }

        if component.len() >= 2 || self.graph.has_self_loop(root) {
            component.sort_unstable();
            self.components.push(component);
        }
    }
}

/// Components of `graph` that cannot be ordered
///
/// Members are listed in registration order; components are ordered by
/// their earliest-registered member.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<usize>> {
    let mut tarjan = Tarjan::new(graph);
    for node in 0..graph.len() {
        if tarjan.index_of[node].is_none() {
            tarjan.run_from(node);
        }
    }

    let mut components = tarjan.components;
    components.sort_by_key(|component| component.first().copied());
    components
}
