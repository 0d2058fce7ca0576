//! Workspace dependency graph construction.
//!
//! Edges point from dependent to dependency and only ever target discovered
//! member packages; any other name is assumed to come from a registry.
//! Cycles are tolerated throughout: the topological order visits every node
//! exactly once and closures are collected with an explicit worklist.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::DfsPostOrder;
use tracing::{debug, warn};

use crate::types::{WorkspaceConfig, WorkspaceGraph, WorkspaceGraphNode, WorkspacePackage};

/// Builds the dependency graph of `packages` under `config`.
///
/// Duplicate package names keep the later package (with a warning); an
/// unresolvable specifier produces no edge rather than an error.
#[must_use]
pub fn build_graph(config: WorkspaceConfig, packages: Vec<WorkspacePackage>) -> WorkspaceGraph {
    let mut by_name: BTreeMap<String, WorkspacePackage> = BTreeMap::new();
    for package in packages {
        let key = package.name.clone();
        if let Some(previous) = by_name.insert(key, package) {
            warn!(
                name = %previous.name,
                "duplicate package name in workspace, keeping the later one"
            );
        }
    }

    let mut by_dir: HashMap<PathBuf, String> = HashMap::with_capacity(by_name.len());
    for (name, package) in &by_name {
        by_dir.insert(normalize_lexically(&package.dir), name.clone());
    }

    // Direct edges from dependencies + optionalDependencies, dev edges from
    // devDependencies. Everything downstream works on their union.
    let mut direct_edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut dev_edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (name, package) in &by_name {
        let manifest = &package.manifest;
        let mut direct = BTreeSet::new();
        for (dep, spec) in manifest
            .dependencies
            .iter()
            .chain(&manifest.optional_dependencies)
        {
            if let Some(target) = member_edge(dep, spec, &package.dir, &by_name, &by_dir) {
                direct.insert(target);
            }
        }
        let mut dev = BTreeSet::new();
        for (dep, spec) in &manifest.dev_dependencies {
            if let Some(target) = member_edge(dep, spec, &package.dir, &by_name, &by_dir) {
                dev.insert(target);
            }
        }
        direct_edges.insert(name.clone(), direct);
        dev_edges.insert(name.clone(), dev);
    }

    let mut dag: DiGraph<String, ()> = DiGraph::new();
    let mut indices: HashMap<String, NodeIndex> = HashMap::with_capacity(by_name.len());
    for name in by_name.keys() {
        let index = dag.add_node(name.clone());
        indices.insert(name.clone(), index);
    }
    for (name, direct) in &direct_edges {
        for dep in direct.iter().chain(&dev_edges[name]) {
            dag.add_edge(indices[name], indices[dep], ());
        }
    }

    // Post-order from every node in name order: dependencies are finished
    // before their dependents, nodes already mid-visit are not re-entered,
    // and the shared discovered set yields each node exactly once.
    let mut sorted = Vec::with_capacity(by_name.len());
    let mut visit = DfsPostOrder::empty(&dag);
    for name in by_name.keys() {
        visit.move_to(indices[name]);
        while let Some(index) = visit.next(&dag) {
            sorted.push(dag[index].clone());
        }
    }

    let mut all_edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (name, direct) in &direct_edges {
        let mut union = direct.clone();
        union.extend(dev_edges[name].iter().cloned());
        all_edges.insert(name.clone(), union);
    }
    let mut transitive: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for name in by_name.keys() {
        transitive.insert(name.clone(), reachable_from(name, &all_edges));
    }

    let mut nodes = BTreeMap::new();
    for (name, package) in by_name {
        let node = WorkspaceGraphNode {
            direct_dependencies: direct_edges.remove(&name).unwrap_or_default(),
            direct_dev_dependencies: dev_edges.remove(&name).unwrap_or_default(),
            transitive_dependencies: transitive.remove(&name).unwrap_or_default(),
            package,
        };
        nodes.insert(name, node);
    }

    debug!(nodes = nodes.len(), "workspace graph built");
    WorkspaceGraph {
        nodes,
        sorted,
        root: config,
    }
}

/// Decides whether one dependency entry links to a workspace member.
///
/// `workspace:` specifiers resolve through [`workspace_target`] and drop
/// silently when the target is not a member. Other specifiers link by plain
/// name match, except `npm:` aliases which opt out of workspace linking.
fn member_edge(
    dep_name: &str,
    spec: &str,
    from_dir: &Path,
    members: &BTreeMap<String, WorkspacePackage>,
    by_dir: &HashMap<PathBuf, String>,
) -> Option<String> {
    if spec.starts_with("workspace:") {
        let target = workspace_target(dep_name, spec, from_dir, by_dir)?;
        if members.contains_key(&target) {
            Some(target)
        } else {
            None
        }
    } else if !spec.starts_with("npm:") && members.contains_key(dep_name) {
        Some(dep_name.to_string())
    } else {
        None
    }
}

/// Resolves a `workspace:` specifier to a candidate package name.
///
/// A bare range suffix (empty, `*`, `^` or `~`) aliases the dependency's
/// own name. A suffix starting with `.` or `/` is a directory, resolved
/// against the depending package and mapped back through the directory
/// index. Anything else is a name, with a trailing `@version` stripped when
/// the `@` is not the leading scope marker.
fn workspace_target(
    dep_name: &str,
    spec: &str,
    from_dir: &Path,
    by_dir: &HashMap<PathBuf, String>,
) -> Option<String> {
    let target = spec.strip_prefix("workspace:")?.trim();
    if target.is_empty() || matches!(target, "*" | "^" | "~") {
        return Some(dep_name.to_string());
    }
    if target.starts_with('.') || target.starts_with('/') {
        let dir = if Path::new(target).is_absolute() {
            normalize_lexically(Path::new(target))
        } else {
            normalize_lexically(&from_dir.join(target))
        };
        return by_dir.get(&dir).cloned();
    }
    match target.rfind('@') {
        Some(at) if at > 0 => Some(target[..at].to_string()),
        _ => Some(target.to_string()),
    }
}

/// Collapses `.` and `..` components without consulting the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Names reachable from `name` over `edges`, worklist-based and
/// cycle-tolerant. `name` itself appears only when a cycle reaches it.
fn reachable_from(name: &str, edges: &BTreeMap<String, BTreeSet<String>>) -> BTreeSet<String> {
    let mut collected = BTreeSet::new();
    let mut stack: Vec<String> = edges
        .get(name)
        .map(|direct| direct.iter().cloned().collect())
        .unwrap_or_default();
    while let Some(current) = stack.pop() {
        if !collected.insert(current.clone()) {
            continue;
        }
        if let Some(next) = edges.get(&current) {
            for dep in next {
                if !collected.contains(dep) {
                    stack.push(dep.clone());
                }
            }
        }
    }
    collected
}
