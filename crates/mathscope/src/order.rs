//! Evaluation order: a topological sort of the child map.
//!
//! Kahn's algorithm over the edge list, with the ready set kept ordered so
//! ties always break by name. Nodes that never touch an edge are appended
//! afterwards in name order. Nodes still blocked when the sort runs dry sit
//! on a dependency loop or downstream of one; they are reported with the
//! loop instead of being ordered.

use crate::graph::{descendants, ChildMap};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationOrder {
    /// Every dependency precedes its dependents.
    pub order: Vec<String>,
    /// Blocked node to the loop it is stuck behind, e.g. `[a, b, a]`.
    pub cycles: BTreeMap<String, Vec<String>>,
}

/// Order the nodes of `children`.
///
/// With `restrict_to`, only those nodes and their descendants are ordered;
/// edges from nodes outside that closure are ignored.
pub fn evaluation_order(children: &ChildMap, restrict_to: Option<&BTreeSet<String>>) -> EvaluationOrder {
    let nodes: BTreeSet<String> = match restrict_to {
        Some(roots) => descendants(roots.iter().map(String::as_str), children),
        None => children.keys().cloned().collect(),
    };

    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut parents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (dep, kids) in children {
        if !nodes.contains(dep) {
            continue;
        }
        for kid in kids.iter().filter(|k| nodes.contains(*k)) {
            in_degree.entry(dep.as_str()).or_insert(0);
            *in_degree.entry(kid.as_str()).or_insert(0) += 1;
            parents.entry(kid.as_str()).or_default().insert(dep.as_str());
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&n, _)| n)
        .collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(node) = ready.pop_first() {
        order.push(node.to_string());
        let Some(kids) = children.get(node) else {
            continue;
        };
        for kid in kids {
            if let Some(d) = in_degree.get_mut(kid.as_str()) {
                *d -= 1;
                if *d == 0 {
                    ready.insert(kid.as_str());
                }
            }
        }
    }

    let blocked: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d > 0)
        .map(|(&n, _)| n)
        .collect();
    let cycles = blocked
        .iter()
        .map(|&node| (node.to_string(), find_cycle(node, &blocked, &parents)))
        .collect();

    order.extend(
        nodes
            .iter()
            .filter(|n| !in_degree.contains_key(n.as_str()))
            .cloned(),
    );

    EvaluationOrder { order, cycles }
}

/// Walk dependency edges back from `start`, smallest name first, until a
/// name repeats; return the closed loop in "depends on" order.
fn find_cycle(
    start: &str,
    blocked: &BTreeSet<&str>,
    parents: &BTreeMap<&str, BTreeSet<&str>>,
) -> Vec<String> {
    let mut path: Vec<&str> = vec![start];
    let mut current = start;
    loop {
        // A blocked node always has a blocked parent.
        let next = parents
            .get(current)
            .and_then(|ps| ps.iter().find(|p| blocked.contains(*p)));
        let Some(&next) = next else {
            return path.iter().map(|s| s.to_string()).collect();
        };
        if let Some(i) = path.iter().position(|&p| p == next) {
            let mut cycle: Vec<String> = path[i..].iter().map(|s| s.to_string()).collect();
            cycle.push(next.to_string());
            return cycle;
        }
        path.push(next);
        current = next;
    }
}
