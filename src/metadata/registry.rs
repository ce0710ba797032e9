//! Dependency registry for metadata invalidation.
//!
//! The registry is a directed graph whose edges read "downstream depends on upstream".
//! Edges are recorded while providers compute (every upstream read registers one) and
//! are removed when a provider deregisters or stops reading an upstream.
//!
//! The registry never computes anything. [`DependencyRegistry::notify`] only walks the
//! edges reachable from a changed identifier and hands each `(upstream, downstream)`
//! pair to a [`NotificationListener`], which decides what invalidating means.
//!
//! The graph stays acyclic: an edge whose upstream is already reachable from its
//! downstream is rejected with [`MetadataError::CyclicDependency`]. `notify` still checks
//! the reachable subgraph before walking it.
//!
//! # Class-level edges
//!
//! A downstream may depend on a whole provider kind rather than one instance by
//! registering against `MID:<tag>`. Notifying an instance identifier also notifies the
//! downstream of its class-level identifier; the listener resolves such a class-level
//! downstream into the concrete identifier that was invalidated.
//!
//! # Examples
//!
//! ```rust,no_run
//! use itdgen::metadata::{DependencyRegistry, MetadataId};
//!
//! # fn example() -> Result<(), itdgen::core::MetadataError> {
//! let physical: MetadataId = "MID:PhysicalType#SRC_MAIN_JAVA?com.example.Customer".parse()?;
//! let bean: MetadataId = "MID:JavaBean#SRC_MAIN_JAVA?com.example.Customer".parse()?;
//!
//! let mut registry = DependencyRegistry::new();
//! registry.register_dependency(&physical, &bean)?;
//! assert_eq!(registry.downstream_of(&physical), vec![bean]);
//! # Ok(())
//! # }
//! ```

use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{trace, warn};

use super::identifier::MetadataId;
use crate::core::MetadataError;

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Receives the edges reached by a notification burst.
pub trait NotificationListener {
    /// Invalidate `downstream` because `upstream` changed.
    ///
    /// Returns the identifier that was actually invalidated, whose own downstream is
    /// followed next, or `None` to stop propagation along this edge. For a class-level
    /// `downstream` the returned identifier is the resolved instance identifier.
    fn on_notify(&mut self, upstream: &MetadataId, downstream: &MetadataId)
    -> Option<MetadataId>;
}

impl<F> NotificationListener for F
where
    F: FnMut(&MetadataId, &MetadataId) -> Option<MetadataId>,
{
    fn on_notify(
        &mut self,
        upstream: &MetadataId,
        downstream: &MetadataId,
    ) -> Option<MetadataId> {
        self(upstream, downstream)
    }
}

/// Outcome of one notification burst.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifySummary {
    /// Identifiers invalidated, in the order the listener reported them.
    pub invalidated: Vec<MetadataId>,
    /// Number of listener invocations.
    pub edges_followed: usize,
}

/// Directed graph of metadata dependencies.
#[derive(Debug, Default)]
pub struct DependencyRegistry {
    /// Edges point from upstream to downstream.
    graph: StableDiGraph<MetadataId, ()>,
    node_map: HashMap<MetadataId, NodeIndex>,
}

impl DependencyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, id: &MetadataId) -> NodeIndex {
        if let Some(&index) = self.node_map.get(id) {
            index
        } else {
            let index = self.graph.add_node(id.clone());
            self.node_map.insert(id.clone(), index);
            index
        }
    }

    fn remove_if_isolated(&mut self, index: NodeIndex) {
        if self.graph.neighbors_undirected(index).next().is_none() {
            if let Some(id) = self.graph.remove_node(index) {
                self.node_map.remove(&id);
            }
        }
    }

    /// Record that `downstream` depends on `upstream`.
    ///
    /// Returns `true` if the edge is new. Registering an existing edge is a no-op.
    ///
    /// # Errors
    ///
    /// See [`check_dependency`](Self::check_dependency). A rejected edge leaves the graph
    /// untouched.
    pub fn register_dependency(
        &mut self,
        upstream: &MetadataId,
        downstream: &MetadataId,
    ) -> Result<bool, MetadataError> {
        self.check_dependency(upstream, downstream)?;

        let from = self.ensure_node(upstream);
        let to = self.ensure_node(downstream);
        if self.graph.contains_edge(from, to) {
            return Ok(false);
        }
        trace!("Registering dependency {} -> {}", upstream, downstream);
        self.graph.add_edge(from, to, ());
        Ok(true)
    }

    /// Whether the edge `upstream -> downstream` could be registered.
    ///
    /// # Errors
    ///
    /// [`MetadataError::CyclicDependency`] if `upstream == downstream`, or if `upstream`
    /// is already reachable from `downstream` so the edge would close a cycle.
    pub fn check_dependency(
        &self,
        upstream: &MetadataId,
        downstream: &MetadataId,
    ) -> Result<(), MetadataError> {
        if upstream == downstream {
            return Err(MetadataError::CyclicDependency {
                cycle: vec![upstream.to_string(), downstream.to_string()],
            });
        }
        if self.has_dependency(upstream, downstream) {
            return Ok(());
        }
        if let Some(path) = self.path_between(downstream, upstream) {
            let mut cycle = vec![upstream.to_string()];
            cycle.extend(path.iter().map(|&n| self.graph[n].to_string()));
            warn!("Rejecting dependency {} -> {}: {}", upstream, downstream, cycle.join(" → "));
            return Err(MetadataError::CyclicDependency {
                cycle,
            });
        }
        Ok(())
    }

    /// Remove one edge. Returns `true` if it existed.
    pub fn deregister_dependency(&mut self, upstream: &MetadataId, downstream: &MetadataId) -> bool {
        let (Some(&from), Some(&to)) = (self.node_map.get(upstream), self.node_map.get(downstream))
        else {
            return false;
        };
        let Some(edge) = self.graph.find_edge(from, to) else {
            return false;
        };
        trace!("Deregistering dependency {} -> {}", upstream, downstream);
        self.graph.remove_edge(edge);
        self.remove_if_isolated(from);
        self.remove_if_isolated(to);
        true
    }

    /// Remove every edge into `downstream`, returning how many were removed.
    pub fn deregister_dependencies(&mut self, downstream: &MetadataId) -> usize {
        self.upstream_of(downstream)
            .iter()
            .filter(|upstream| self.deregister_dependency(upstream, downstream))
            .count()
    }

    /// Remove every edge out of `upstream`, returning how many were removed.
    pub fn deregister_upstream(&mut self, upstream: &MetadataId) -> usize {
        self.downstream_of(upstream)
            .iter()
            .filter(|downstream| self.deregister_dependency(upstream, downstream))
            .count()
    }

    fn neighbors_sorted(&self, id: &MetadataId, direction: Direction) -> Vec<MetadataId> {
        let Some(&index) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<MetadataId> = self
            .graph
            .neighbors_directed(index, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        ids.sort();
        ids
    }

    /// Direct dependents of `upstream`, sorted.
    pub fn downstream_of(&self, upstream: &MetadataId) -> Vec<MetadataId> {
        self.neighbors_sorted(upstream, Direction::Outgoing)
    }

    /// Direct dependencies of `downstream`, sorted.
    pub fn upstream_of(&self, downstream: &MetadataId) -> Vec<MetadataId> {
        self.neighbors_sorted(downstream, Direction::Incoming)
    }

    pub fn has_dependency(&self, upstream: &MetadataId, downstream: &MetadataId) -> bool {
        match (self.node_map.get(upstream), self.node_map.get(downstream)) {
            (Some(&from), Some(&to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Every identifier taking part in at least one edge, sorted.
    pub fn identifiers(&self) -> Vec<MetadataId> {
        let mut ids: Vec<MetadataId> = self.node_map.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Every identifier reachable from `upstream` along downstream edges.
    pub fn transitive_downstream(&self, upstream: &MetadataId) -> BTreeSet<MetadataId> {
        let mut reached = BTreeSet::new();
        let mut queue = VecDeque::new();

        if let Some(&start) = self.node_map.get(upstream) {
            queue.push_back(start);

            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors(current) {
                    if reached.insert(self.graph[neighbor].clone()) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        reached
    }

    /// Successors of `index` including the class-level fan-out of instance nodes.
    fn fan_out(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = self.graph.neighbors(index).collect();
        let id = &self.graph[index];
        if !id.is_class_level() {
            if let Some(&class_index) = self.node_map.get(&id.class_id()) {
                next.extend(self.graph.neighbors(class_index));
            }
        }
        next
    }

    /// Shortest path from `from` to `to` along downstream edges, both ends included.
    ///
    /// When `to` is class-level, reaching any instance of that class counts, since the
    /// class node's edges fan out from its instances.
    fn path_between(&self, from: &MetadataId, to: &MetadataId) -> Option<Vec<NodeIndex>> {
        let &start = self.node_map.get(from)?;
        let reaches = |id: &MetadataId| {
            id == to || (to.is_class_level() && !id.is_class_level() && id.class_id() == *to)
        };
        if reaches(from) {
            return Some(vec![start]);
        }

        let mut parents: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.fan_out(current) {
                if neighbor == start || parents.contains_key(&neighbor) {
                    continue;
                }
                parents.insert(neighbor, current);
                if reaches(&self.graph[neighbor]) {
                    let mut path = vec![neighbor];
                    let mut node = neighbor;
                    while let Some(&parent) = parents.get(&node) {
                        path.push(parent);
                        node = parent;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(neighbor);
            }
        }
        None
    }

    /// Check the subgraph reachable from `start` for a cycle.
    ///
    /// # Errors
    ///
    /// [`MetadataError::CyclicDependency`] naming the cycle path.
    pub fn detect_cycle_from(&self, start: &MetadataId) -> Result<(), MetadataError> {
        let Some(&index) = self.node_map.get(start) else {
            return Ok(());
        };
        let mut colors: HashMap<NodeIndex, Color> = HashMap::new();
        let mut path: Vec<NodeIndex> = Vec::new();

        if let Some(cycle) = self.dfs_visit(index, &mut colors, &mut path) {
            let cycle: Vec<String> = cycle.iter().map(|&n| self.graph[n].to_string()).collect();
            warn!("Cyclic metadata dependency detected: {}", cycle.join(" → "));
            return Err(MetadataError::CyclicDependency {
                cycle,
            });
        }
        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.fan_out(node) {
            match colors.get(&neighbor).copied().unwrap_or(Color::White) {
                Color::Gray => {
                    let start = path.iter().position(|&n| n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Color::White => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                Color::Black => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Propagate a change of `upstream` to everything depending on it.
    ///
    /// Downstream edges are walked breadth-first. Each instance identifier is handed to
    /// the listener at most once per burst, so diamonds invalidate their sink once. The
    /// graph is checked for cycles before the listener sees any edge.
    ///
    /// # Errors
    ///
    /// [`MetadataError::CyclicDependency`] if the reachable subgraph contains a cycle.
    pub fn notify(
        &self,
        upstream: &MetadataId,
        listener: &mut dyn NotificationListener,
    ) -> Result<NotifySummary, MetadataError> {
        self.detect_cycle_from(upstream)?;
        if !upstream.is_class_level() {
            self.detect_cycle_from(&upstream.class_id())?;
        }

        let mut summary = NotifySummary::default();
        let mut visited: HashSet<MetadataId> = HashSet::from([upstream.clone()]);
        let mut queue = VecDeque::from([upstream.clone()]);

        while let Some(current) = queue.pop_front() {
            let mut targets = self.downstream_of(&current);
            if !current.is_class_level() {
                targets.extend(self.downstream_of(&current.class_id()));
            }

            for downstream in targets {
                if !downstream.is_class_level() && visited.contains(&downstream) {
                    continue;
                }
                summary.edges_followed += 1;
                let Some(invalidated) = listener.on_notify(&current, &downstream) else {
                    continue;
                };
                if visited.insert(invalidated.clone()) {
                    summary.invalidated.push(invalidated.clone());
                    queue.push_back(invalidated);
                }
            }
        }

        Ok(summary)
    }

    /// Render the downstream tree of `root` for display.
    pub fn to_tree_string(&self, root: &MetadataId) -> String {
        let mut result = String::new();
        let mut visited = HashSet::new();
        self.build_tree_string(root, &mut result, "", true, &mut visited);
        result
    }

    fn build_tree_string(
        &self,
        node: &MetadataId,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<MetadataId>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{node}\n"));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(node.clone()) {
            result.push_str(&format!("{child_prefix}└── (already shown)\n"));
            return;
        }

        let children = self.downstream_of(node);
        for (i, child) in children.iter().enumerate() {
            let is_last_child = i == children.len() - 1;
            self.build_tree_string(child, result, &child_prefix, is_last_child, visited);
        }
    }
}
