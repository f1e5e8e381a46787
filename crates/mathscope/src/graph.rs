//! Dependency graph construction.
//!
//! Edges run from a dependency to its dependents: if `a = b/2 - c`, then
//! `a` is a child of both `b` and `c`.

use std::collections::{BTreeMap, BTreeSet};

/// Symbol name to the symbols that reference it directly.
pub type ChildMap = BTreeMap<String, BTreeSet<String>>;

/// Symbol name to the undefined name it (transitively) depends on.
pub type UnmetDependencies = BTreeMap<String, String>;

/// Output of [`build_child_map`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    /// Every symbol appears as a key. An undefined name a symbol references
    /// also appears, with no children, so traversal never misses a key.
    pub children: ChildMap,
    pub unmet: UnmetDependencies,
}

/// Build the child map and the unmet dependencies of a set of symbols.
///
/// `references` yields each symbol with the free variables its definition
/// references. A reference to a known symbol adds an edge; a reference to a
/// built-in (that no symbol shadows) is ignored; anything else is an unmet
/// dependency, of which the first per symbol is recorded.
///
/// Unmet dependencies then propagate: every descendant of a symbol with a
/// direct unmet dependency inherits that root's missing name, unless it has
/// a direct unmet dependency of its own. Roots are visited in name order.
pub fn build_child_map<'a, I>(references: I, is_builtin: impl Fn(&str) -> bool) -> DependencyGraph
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let references: Vec<(&str, &[String])> = references.into_iter().collect();

    let known: BTreeSet<&str> = references.iter().map(|(name, _)| *name).collect();
    let mut children: ChildMap = known
        .iter()
        .map(|name| (name.to_string(), BTreeSet::new()))
        .collect();
    let mut direct = UnmetDependencies::new();

    for &(name, free) in &references {
        for dep in free {
            if known.contains(dep.as_str()) {
                if let Some(dependents) = children.get_mut(dep) {
                    dependents.insert(name.to_string());
                }
            } else if !is_builtin(dep) {
                direct
                    .entry(name.to_string())
                    .or_insert_with(|| dep.clone());
                children.entry(dep.clone()).or_default();
            }
        }
    }

    let mut unmet = direct.clone();
    for (root, missing) in &direct {
        for name in descendants([root.as_str()], &children) {
            unmet.entry(name).or_insert_with(|| missing.clone());
        }
    }

    DependencyGraph { children, unmet }
}

/// The given nodes plus everything reachable from them through `children`.
///
/// Names that are not keys of `children` are ignored.
pub fn descendants<'a, I>(nodes: I, children: &ChildMap) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut visited = BTreeSet::new();
    let mut stack: Vec<&str> = nodes
        .into_iter()
        .filter(|n| children.contains_key(*n))
        .collect();

    while let Some(node) = stack.pop() {
        if !visited.insert(node.to_string()) {
            continue;
        }
        if let Some(kids) = children.get(node) {
            stack.extend(
                kids.iter()
                    .map(String::as_str)
                    .filter(|k| !visited.contains(*k)),
            );
        }
    }
    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathscope_types::is_builtin_name;

    fn refs(entries: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        entries
            .iter()
            .map(|(name, free)| {
                (
                    name.to_string(),
                    free.iter().map(|f| f.to_string()).collect(),
                )
            })
            .collect()
    }

    fn build(entries: &[(&str, &[&str])]) -> DependencyGraph {
        let owned = refs(entries);
        build_child_map(
            owned.iter().map(|(n, f)| (n.as_str(), f.as_slice())),
            is_builtin_name,
        )
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_edges_run_from_dependency_to_dependent() {
        let graph = build(&[("c", &[]), ("b", &["c"]), ("a", &["b", "c"])]);
        assert_eq!(graph.children["c"], set(&["a", "b"]));
        assert_eq!(graph.children["b"], set(&["a"]));
        assert_eq!(graph.children["a"], set(&[]));
        assert!(graph.unmet.is_empty());
    }

    #[test]
    fn test_builtins_are_ignored() {
        let graph = build(&[("a", &["pi", "sin"])]);
        assert_eq!(graph.children.len(), 1);
        assert!(graph.unmet.is_empty());
    }

    #[test]
    fn test_symbol_shadows_builtin() {
        let graph = build(&[("e", &[]), ("a", &["e"])]);
        assert_eq!(graph.children["e"], set(&["a"]));
    }

    #[test]
    fn test_unmet_gets_placeholder_entry() {
        let graph = build(&[("a", &["b"])]);
        assert_eq!(graph.unmet["a"], "b");
        assert_eq!(graph.children["b"], set(&[]));
    }

    #[test]
    fn test_first_unmet_dependency_wins() {
        let graph = build(&[("a", &["x", "y"])]);
        assert_eq!(graph.unmet["a"], "x");
    }

    #[test]
    fn test_unmet_propagates_to_descendants() {
        let graph = build(&[("a", &["zz"]), ("b", &["a"]), ("c", &["b"]), ("d", &[])]);
        assert_eq!(graph.unmet["a"], "zz");
        assert_eq!(graph.unmet["b"], "zz");
        assert_eq!(graph.unmet["c"], "zz");
        assert!(!graph.unmet.contains_key("d"));
    }

    #[test]
    fn test_own_unmet_dependency_beats_inherited() {
        let graph = build(&[("a", &["x"]), ("b", &["a", "y"])]);
        assert_eq!(graph.unmet["b"], "y");
    }

    #[test]
    fn test_descendants_include_start_nodes() {
        let graph = build(&[("c", &[]), ("b", &["c"]), ("a", &["b"]), ("z", &[])]);
        assert_eq!(descendants(["c"], &graph.children), set(&["a", "b", "c"]));
        assert_eq!(descendants(["b", "z"], &graph.children), set(&["a", "b", "z"]));
        assert_eq!(descendants(["nope"], &graph.children), set(&[]));
    }

    #[test]
    fn test_descendants_terminate_on_cycles() {
        let graph = build(&[("a", &["b"]), ("b", &["a"])]);
        assert_eq!(descendants(["a"], &graph.children), set(&["a", "b"]));
    }

    #[test]
    fn test_descendants_deep_chain() {
        let owned: Vec<(String, Vec<String>)> = (0..10_000)
            .map(|i| {
                let deps = if i == 0 { vec![] } else { vec![format!("s{}", i - 1)] };
                (format!("s{i}"), deps)
            })
            .collect();
        let graph = build_child_map(
            owned.iter().map(|(n, f)| (n.as_str(), f.as_slice())),
            is_builtin_name,
        );
        assert_eq!(descendants(["s0"], &graph.children).len(), 10_000);
    }
}
