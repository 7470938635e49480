//! # archivist-index
//!
//! Builds the resolved link index and tag table of a vault snapshot.
//!
//! Parsed notes carry raw link text (`[[Alpha]]`, `[x](../Beta.md)`). This
//! crate maps that text onto vault paths:
//! - exact vault path, with or without an implied `.md`
//! - path relative to the linking note's folder
//! - unique name anywhere in the vault, shortest path winning
//!
//! Links that match no file are kept apart as unresolved and never enter the
//! [`LinkIndex`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use archivist_core::{FileRef, LinkIndex};
use archivist_parser::NoteRefs;

/// Resolves link text against the files of one vault snapshot.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    /// Lowercased path → actual path.
    by_path: HashMap<String, String>,
}

impl LinkResolver {
    #[must_use]
    pub fn new(files: &[FileRef]) -> Self {
        let by_path = files
            .iter()
            .map(|f| (f.path.to_lowercase(), f.path.clone()))
            .collect();
        Self { by_path }
    }

    /// Resolve `target` as written in the note at `source`.
    #[must_use]
    pub fn resolve(&self, target: &str, source: &str) -> Option<String> {
        let target = target.trim().trim_start_matches("./");
        let absolute = target.starts_with('/');
        let target = target.trim_start_matches('/');
        if target.is_empty() {
            return None;
        }

        let wanted = [target.to_lowercase(), format!("{target}.md").to_lowercase()];

        for candidate in &wanted {
            if let Some(path) = self.by_path.get(candidate) {
                return Some(path.clone());
            }
        }
        if absolute {
            return None;
        }

        let folder = parent_of(source);
        if !folder.is_empty() || target.starts_with("../") {
            for candidate in &wanted {
                let Some(joined) = join_relative(folder, candidate) else {
                    continue;
                };
                if let Some(path) = self.by_path.get(&joined) {
                    return Some(path.clone());
                }
            }
        }

        self.by_path
            .iter()
            .filter(|(lower, _)| {
                wanted
                    .iter()
                    .any(|w| lower.ends_with(w.as_str()) && lower[..lower.len() - w.len()].ends_with('/'))
            })
            .map(|(_, path)| path)
            .min_by(|a, b| {
                depth(a)
                    .cmp(&depth(b))
                    .then_with(|| a.len().cmp(&b.len()))
                    .then_with(|| a.cmp(b))
            })
            .cloned()
    }
}

fn parent_of(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

fn depth(path: &str) -> usize {
    path.matches('/').count()
}

/// Join `relative` onto `folder`, collapsing `.` and `..` segments. Returns
/// `None` when `..` climbs above the vault root.
fn join_relative(folder: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = folder.split('/').filter(|s| !s.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/").to_lowercase())
}

/// A resolved snapshot of links and tags.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VaultIndex {
    pub links: LinkIndex,
    /// Link text that matched no file: source path → (text → count).
    pub unresolved: BTreeMap<String, BTreeMap<String, u32>>,
    /// Tags per file. Files that declared none have no entry.
    pub tags: BTreeMap<String, BTreeSet<String>>,
}

impl VaultIndex {
    /// Tag set of a file, or `None` when the file has no cache entry.
    #[must_use]
    pub fn tags_of(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.tags.get(path)
    }
}

/// Accumulates parsed notes into a [`VaultIndex`].
#[derive(Debug)]
pub struct IndexBuilder {
    resolver: LinkResolver,
    index: VaultIndex,
}

impl IndexBuilder {
    #[must_use]
    pub fn new(files: &[FileRef]) -> Self {
        Self {
            resolver: LinkResolver::new(files),
            index: VaultIndex::default(),
        }
    }

    /// Resolve and record everything `refs` declares for the note at `source`.
    pub fn add_note(&mut self, source: &str, refs: &NoteRefs) {
        for link in &refs.links {
            match self.resolver.resolve(&link.target, source) {
                Some(target) => self.index.links.add(source, &target, 1),
                None => {
                    tracing::debug!(source, target = %link.target, "unresolved link");
                    *self
                        .index
                        .unresolved
                        .entry(source.to_string())
                        .or_default()
                        .entry(link.target.clone())
                        .or_insert(0) += 1;
                }
            }
        }

        if !refs.tags.is_empty() {
            self.index
                .tags
                .entry(source.to_string())
                .or_default()
                .extend(refs.tags.iter().cloned());
        }
    }

    #[must_use]
    pub fn finish(self) -> VaultIndex {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archivist_parser::{parse_note, LinkRef};

    fn files(paths: &[&str]) -> Vec<FileRef> {
        paths.iter().map(|p| FileRef::from_path(p)).collect()
    }

    fn resolver() -> LinkResolver {
        LinkResolver::new(&files(&[
            "Home.md",
            "Notes/Alpha.md",
            "Notes/Deep/Alpha.md",
            "Notes/Beta.md",
            "Projects/Beta.md",
            "Assets/diagram.png",
            "Notes/v1.2 plan.md",
        ]))
    }

    #[test]
    fn resolves_exact_paths_with_and_without_extension() {
        let r = resolver();
        assert_eq!(r.resolve("Notes/Alpha.md", "Home.md").as_deref(), Some("Notes/Alpha.md"));
        assert_eq!(r.resolve("Notes/Alpha", "Home.md").as_deref(), Some("Notes/Alpha.md"));
        assert_eq!(r.resolve("/Home", "Notes/Beta.md").as_deref(), Some("Home.md"));
        assert_eq!(r.resolve("notes/alpha", "Home.md").as_deref(), Some("Notes/Alpha.md"));
    }

    #[test]
    fn bare_names_prefer_shortest_path() {
        let r = resolver();
        assert_eq!(r.resolve("Alpha", "Home.md").as_deref(), Some("Notes/Alpha.md"));
        assert_eq!(r.resolve("diagram.png", "Home.md").as_deref(), Some("Assets/diagram.png"));
        assert_eq!(r.resolve("v1.2 plan", "Home.md").as_deref(), Some("Notes/v1.2 plan.md"));
    }

    #[test]
    fn same_folder_wins_for_relative_names() {
        let r = resolver();
        assert_eq!(r.resolve("Beta", "Projects/Index.md").as_deref(), Some("Projects/Beta.md"));
        assert_eq!(r.resolve("Beta", "Notes/Today.md").as_deref(), Some("Notes/Beta.md"));
        assert_eq!(r.resolve("Alpha", "Notes/Deep/x.md").as_deref(), Some("Notes/Deep/Alpha.md"));
        assert_eq!(r.resolve("../Alpha.md", "Notes/Deep/x.md").as_deref(), Some("Notes/Alpha.md"));
    }

    #[test]
    fn unknown_targets_do_not_resolve() {
        let r = resolver();
        assert!(r.resolve("Gamma", "Home.md").is_none());
        assert!(r.resolve("../../../Alpha", "Notes/x.md").is_none());
        assert!(r.resolve("  ", "Home.md").is_none());
        // Suffix matches must align with a folder boundary.
        assert!(r.resolve("lpha", "Home.md").is_none());
    }

    #[test]
    fn builder_counts_links_and_collects_tags() {
        let all = files(&["Home.md", "Notes/Alpha.md", "Notes/Beta.md"]);
        let mut builder = IndexBuilder::new(&all);

        let home = parse_note("[[Alpha]] [[Alpha|again]] [[Missing]] #root").unwrap();
        builder.add_note("Home.md", &home);
        let alpha = parse_note("---\ntags: mirror\n---\n[[Beta]]").unwrap();
        builder.add_note("Notes/Alpha.md", &alpha);
        builder.add_note("Notes/Beta.md", &NoteRefs::default());

        let index = builder.finish();
        assert_eq!(index.links.count("Home.md", "Notes/Alpha.md"), 2);
        assert_eq!(index.links.count("Notes/Alpha.md", "Notes/Beta.md"), 1);
        assert_eq!(index.unresolved["Home.md"]["Missing"], 1);
        assert!(index.tags_of("Home.md").unwrap().contains("#root"));
        assert!(index.tags_of("Notes/Alpha.md").unwrap().contains("#mirror"));
        assert!(index.tags_of("Notes/Beta.md").is_none());
    }

    #[test]
    fn self_links_are_recorded() {
        let all = files(&["Loop.md"]);
        let mut builder = IndexBuilder::new(&all);
        builder.add_note(
            "Loop.md",
            &NoteRefs {
                links: vec![LinkRef::wiki("Loop")],
                tags: Vec::new(),
            },
        );
        assert_eq!(builder.finish().links.count("Loop.md", "Loop.md"), 1);
    }

    #[test]
    fn index_serializes_to_json() {
        let all = files(&["a.md", "b.md"]);
        let mut builder = IndexBuilder::new(&all);
        builder.add_note("a.md", &parse_note("[[b]]").unwrap());
        let json = serde_json::to_value(builder.finish()).unwrap();
        assert_eq!(json["links"]["a.md"]["b.md"], 1);
    }
}
