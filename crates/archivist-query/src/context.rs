//! Query context: the inclusion filter, the exclusion toggle, and the host
//! handle that every link query runs against.
//!
//! The context owns no link data. Each query reads the host's link index at
//! call time; operations that ask many questions take one [`LinkGraph`]
//! snapshot up front with [`QueryContext::graph`].

use std::collections::BTreeSet;

use archivist_core::error::Result;
use archivist_core::{FileRef, LinkSource, ValidatedSettings, MIRROR_TAG};

use crate::graph::LinkGraph;

/// Allow-list of folder prefixes. A path is in scope when it lies under one
/// of them; the empty prefix names the vault root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionFilter {
    prefixes: Vec<String>,
}

impl InclusionFilter {
    /// Build a filter from folder prefixes. Surrounding slashes are ignored.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|p| p.as_ref().trim().trim_matches('/').to_string())
            .collect();
        Self { prefixes }
    }

    /// A filter that admits every path.
    #[must_use]
    pub fn everything() -> Self {
        Self::new([""])
    }

    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Whether `path` lies under one of the prefixes. Matching stops at
    /// folder boundaries: `Notes` admits `Notes/a.md` but not `Notes2/a.md`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            prefix.is_empty()
                || path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Everything a link query needs, passed explicitly to each operation.
pub struct QueryContext<'h, H: ?Sized> {
    host: &'h H,
    filter: InclusionFilter,
    exclude_mirrors: bool,
}

impl<'h, H: LinkSource + ?Sized> QueryContext<'h, H> {
    pub fn new(host: &'h H, filter: InclusionFilter, exclude_mirrors: bool) -> Self {
        Self {
            host,
            filter,
            exclude_mirrors,
        }
    }

    /// Context for validated settings.
    pub fn from_settings(host: &'h H, settings: &ValidatedSettings) -> Self {
        Self::new(
            host,
            InclusionFilter::new(&settings.included_folders),
            settings.exclude_mirrors,
        )
    }

    #[must_use]
    pub fn host(&self) -> &'h H {
        self.host
    }

    #[must_use]
    pub fn filter(&self) -> &InclusionFilter {
        &self.filter
    }

    #[must_use]
    pub fn in_scope(&self, path: &str) -> bool {
        self.filter.contains(path)
    }

    /// Snapshot the host's current link index under this context's filter.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the link index cannot be read.
    pub fn graph(&self) -> Result<LinkGraph> {
        let index = self.host.read_link_index()?;
        Ok(LinkGraph::from_index(&index, &self.filter))
    }

    /// In-scope targets that `file` links to.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the link index cannot be read.
    pub fn outbound_links(&self, file: &FileRef) -> Result<BTreeSet<String>> {
        let index = self.host.read_link_index()?;
        let targets = index
            .targets_of(&file.path)
            .filter(|(target, count)| *count > 0 && self.in_scope(target))
            .map(|(target, _)| target.to_string())
            .collect();
        Ok(targets)
    }

    /// In-scope sources that link to `file`.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the link index cannot be read.
    pub fn inbound_links(&self, file: &FileRef) -> Result<BTreeSet<String>> {
        let index = self.host.read_link_index()?;
        let sources = index
            .sources_of(&file.path)
            .filter(|source| self.in_scope(source))
            .map(str::to_string)
            .collect();
        Ok(sources)
    }

    /// No in-scope links in either direction.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the link index cannot be read.
    pub fn is_orphan(&self, file: &FileRef) -> Result<bool> {
        Ok(self.inbound_links(file)?.is_empty() && self.outbound_links(file)?.is_empty())
    }

    /// Whether the file's tag cache entry contains `tag`. A file without an
    /// entry is not marked.
    #[must_use]
    pub fn is_marked(&self, file: &FileRef, tag: &str) -> bool {
        self.host
            .read_tags(&file.path)
            .is_some_and(|tags| tags.contains(tag))
    }

    /// Whether the exclusion predicate drops `file` from discovery output.
    #[must_use]
    pub fn is_excluded(&self, file: &FileRef) -> bool {
        self.exclude_mirrors && self.is_marked(file, MIRROR_TAG)
    }
}
