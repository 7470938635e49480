//! Link index — the resolved source → target link counts of a vault.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A snapshot of resolved links: source path → (target path → link count).
///
/// Only positive counts are stored. The index is read-only to the core and
/// is fetched fresh from the host for every query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkIndex {
    links: BTreeMap<String, BTreeMap<String, u32>>,
}

impl LinkIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` more links from `source` to `target`. Zero counts are ignored.
    pub fn add(&mut self, source: &str, target: &str, count: u32) {
        if count == 0 {
            return;
        }
        *self
            .links
            .entry(source.to_string())
            .or_default()
            .entry(target.to_string())
            .or_insert(0) += count;
    }

    /// Targets referenced by `source`, with their counts.
    pub fn targets_of<'a>(&'a self, source: &str) -> impl Iterator<Item = (&'a str, u32)> + 'a {
        self.links
            .get(source)
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(t, c)| (t.as_str(), *c)))
    }

    /// Sources whose entry for `target` carries a positive count.
    pub fn sources_of<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.links.iter().filter_map(move |(source, targets)| {
            targets
                .get(target)
                .filter(|count| **count > 0)
                .map(|_| source.as_str())
        })
    }

    /// Number of links from `source` to `target` (0 when absent).
    #[must_use]
    pub fn count(&self, source: &str, target: &str) -> u32 {
        self.links
            .get(source)
            .and_then(|targets| targets.get(target))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate over every source and its target map.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, u32>)> {
        self.links.iter().map(|(s, t)| (s.as_str(), t))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
