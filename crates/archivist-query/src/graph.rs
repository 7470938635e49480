//! Link graph snapshot: filtered adjacency in both directions, built once per
//! operation from the host's link index.
//!
//! Reachability is a depth-first walk over an explicit work-list, so vault
//! size never bounds call depth.

use std::collections::{BTreeMap, BTreeSet};

use archivist_core::LinkIndex;

use crate::context::InclusionFilter;

/// Directed link graph restricted by an [`InclusionFilter`].
///
/// Outbound edges keep only in-scope targets; inbound edges keep only
/// in-scope sources. A node outside the filter may still have outbound
/// edges, so a root outside the scope can start a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkGraph {
    outbound: BTreeMap<String, BTreeSet<String>>,
    inbound: BTreeMap<String, BTreeSet<String>>,
}

static EMPTY: BTreeSet<String> = BTreeSet::new();

impl LinkGraph {
    #[must_use]
    pub fn from_index(index: &LinkIndex, filter: &InclusionFilter) -> Self {
        let mut graph = Self::default();
        for (source, targets) in index.iter() {
            for (target, count) in targets {
                if *count == 0 {
                    continue;
                }
                if filter.contains(target) {
                    graph
                        .outbound
                        .entry(source.to_string())
                        .or_default()
                        .insert(target.clone());
                }
                if filter.contains(source) {
                    graph
                        .inbound
                        .entry(target.clone())
                        .or_default()
                        .insert(source.to_string());
                }
            }
        }
        graph
    }

    /// In-scope targets of `path`.
    #[must_use]
    pub fn outbound(&self, path: &str) -> &BTreeSet<String> {
        self.outbound.get(path).unwrap_or(&EMPTY)
    }

    /// In-scope sources linking to `path`.
    #[must_use]
    pub fn inbound(&self, path: &str) -> &BTreeSet<String> {
        self.inbound.get(path).unwrap_or(&EMPTY)
    }

    #[must_use]
    pub fn is_orphan(&self, path: &str) -> bool {
        self.outbound(path).is_empty() && self.inbound(path).is_empty()
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.outbound.values().map(BTreeSet::len).sum()
    }

    /// Drop `nodes` and every edge touching them.
    #[must_use]
    pub fn without(mut self, nodes: &BTreeSet<String>) -> Self {
        if nodes.is_empty() {
            return self;
        }
        for map in [&mut self.outbound, &mut self.inbound] {
            map.retain(|path, _| !nodes.contains(path));
            for neighbours in map.values_mut() {
                neighbours.retain(|path| !nodes.contains(path));
            }
        }
        self
    }

    /// Every path reachable from `root` over outbound edges, `root` included.
    #[must_use]
    pub fn reachable_from(&self, root: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut stack = vec![root.to_string()];

        while let Some(current) = stack.pop() {
            if visited.contains(&current) {
                continue;
            }
            for next in self.outbound(&current) {
                if !visited.contains(next) {
                    stack.push(next.clone());
                }
            }
            visited.insert(current);
        }

        tracing::debug!(root, reached = visited.len(), "reachability walk");
        visited
    }
}
