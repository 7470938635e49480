//! Untracked-file discovery over a [`LinkGraph`] snapshot.

use std::fmt;

use serde::Serialize;

use archivist_core::FileRef;

use crate::graph::LinkGraph;

/// Why a file was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    /// No in-scope links in or out (no root configured).
    Orphan,
    /// Not reachable from the root document.
    Untracked,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orphan => f.write_str("Orphan"),
            Self::Untracked => f.write_str("Untracked"),
        }
    }
}

/// How untracked files were decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DiscoveryMode {
    RootTracking { root: String },
    Orphan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredFile {
    pub path: String,
    pub name: String,
    pub reason: Reason,
}

/// Result of one discovery run, sorted by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    #[serde(flatten)]
    pub mode: DiscoveryMode,
    pub files: Vec<DiscoveredFile>,
}

impl Discovery {
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Pick the untracked files among `candidates`.
///
/// With a root, a candidate is untracked when the root cannot reach it.
/// Without one, a candidate is untracked when it is an orphan.
pub fn find_untracked<'a, I>(graph: &LinkGraph, candidates: I, root: Option<&str>) -> Discovery
where
    I: IntoIterator<Item = &'a FileRef>,
{
    let (mode, mut files): (DiscoveryMode, Vec<DiscoveredFile>) = match root {
        Some(root) => {
            let reached = graph.reachable_from(root);
            let files = candidates
                .into_iter()
                .filter(|file| !reached.contains(&file.path))
                .map(|file| discovered(file, Reason::Untracked))
                .collect();
            (
                DiscoveryMode::RootTracking {
                    root: root.to_string(),
                },
                files,
            )
        }
        None => {
            let files = candidates
                .into_iter()
                .filter(|file| graph.is_orphan(&file.path))
                .map(|file| discovered(file, Reason::Orphan))
                .collect();
            (DiscoveryMode::Orphan, files)
        }
    };

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files.dedup_by(|a, b| a.path == b.path);
    Discovery { mode, files }
}

fn discovered(file: &FileRef, reason: Reason) -> DiscoveredFile {
    DiscoveredFile {
        path: file.path.clone(),
        name: file.name.clone(),
        reason,
    }
}
