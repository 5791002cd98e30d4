// src/resolver/graph.rs

//! Dependency-ordered sorting of transaction targets
//!
//! Edges are drawn between targets only: `i -> j` when target `j` has the
//! name of, or provides, some dependency of target `i`. Versions are not
//! considered. The graph is walked depth first in input order and a node
//! is emitted once all of its children are; cycles are logged and broken
//! at the back edge.

use super::Operation;
use crate::packages::{Dependency, Package};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnStack,
    Done,
}

/// Per-target node; children and parent are indices into the node arena
#[derive(Debug)]
struct GraphNode<'a> {
    package: &'a Package,
    children: Vec<usize>,
    /// Next child to visit
    cursor: usize,
    state: VisitState,
    parent: Option<usize>,
}

impl<'a> GraphNode<'a> {
    fn new(package: &'a Package) -> Self {
        Self {
            package,
            children: Vec::new(),
            cursor: 0,
            state: VisitState::Unvisited,
            parent: None,
        }
    }
}

/// Whether `pkg` can stand in for `dep`, ignoring versions
fn may_satisfy(pkg: &Package, dep: &Dependency) -> bool {
    pkg.name == dep.name || pkg.provides(&dep.name)
}

fn build_graph<'a>(targets: &[&'a Package]) -> Vec<GraphNode<'a>> {
    let mut nodes: Vec<GraphNode<'a>> = targets.iter().map(|&pkg| GraphNode::new(pkg)).collect();

    for i in 0..nodes.len() {
        let deps = Dependency::parse_all(&nodes[i].package.depends);
        let children = (0..targets.len())
            .filter(|&j| j != i && deps.iter().any(|dep| may_satisfy(targets[j], dep)))
            .collect();
        nodes[i].children = children;
    }

    nodes
}

/// Return `targets` ordered so dependencies come before their dependents
///
/// For [`Operation::Remove`] the order is reversed so dependents are
/// removed first. The result is always a permutation of `targets`.
pub fn sort_by_deps<'a>(targets: &[&'a Package], mode: Operation) -> Vec<&'a Package> {
    if targets.is_empty() {
        return Vec::new();
    }

    debug!("started sorting dependencies");

    let mut nodes = build_graph(targets);
    let mut sorted = Vec::with_capacity(nodes.len());

    for start in 0..nodes.len() {
        if nodes[start].state != VisitState::Unvisited {
            continue;
        }

        let mut current = start;
        nodes[current].state = VisitState::OnStack;

        loop {
            let mut next = None;
            while nodes[current].cursor < nodes[current].children.len() {
                let child = nodes[current].children[nodes[current].cursor];
                nodes[current].cursor += 1;
                match nodes[child].state {
                    VisitState::Unvisited => {
                        next = Some(child);
                        break;
                    }
                    VisitState::OnStack => debug!(
                        "dependency cycle detected: {} -> {}",
                        nodes[current].package.name, nodes[child].package.name
                    ),
                    VisitState::Done => {}
                }
            }

            match next {
                Some(child) => {
                    nodes[child].parent = Some(current);
                    nodes[child].state = VisitState::OnStack;
                    current = child;
                }
                None => {
                    nodes[current].state = VisitState::Done;
                    sorted.push(nodes[current].package);
                    match nodes[current].parent {
                        Some(parent) => current = parent,
                        None => break,
                    }
                }
            }
        }
    }

    debug!("sorting dependencies finished");

    if mode == Operation::Remove {
        sorted.reverse();
    }
    sorted
}
