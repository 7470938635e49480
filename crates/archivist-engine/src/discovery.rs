//! Untracked-file discovery and the discovery report.

use std::collections::BTreeSet;

use archivist_core::error::Result;
use archivist_core::{FileRef, Host, ARCHIVE_VIEW_TAG};
use archivist_query::{find_untracked, render_report, Discovery, InclusionFilter};

use crate::archive::Archiver;
use crate::paths;

/// Shown once per [`Archiver`] when discovery falls back to orphan mode.
pub const ORPHAN_MODE_ADVICE: &str =
    "no root file configured: reporting orphans only; set root_file to track reachability";

impl<'h, H: Host + ?Sized> Archiver<'h, H> {
    /// Find the in-scope files nothing tracks.
    ///
    /// With a root file, these are the files the root cannot reach. Without
    /// one, they are the orphans. Archive views and files already in the
    /// archive folder are never candidates, and marker-tagged files are
    /// dropped when the exclusion toggle is on. Archived copies are orphans
    /// by construction, so an archive folder inside the included folders
    /// never shows up in the results.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the file list or link index cannot be read.
    pub fn discover_untracked(&self) -> Result<Discovery> {
        let query = self.query();
        let files = self.host.list_all_files()?;
        let archived = InclusionFilter::new([&self.settings.archive_folder]);

        let views: BTreeSet<String> = files
            .iter()
            .filter(|file| query.is_marked(file, ARCHIVE_VIEW_TAG))
            .map(|file| file.path.clone())
            .collect();
        let graph = query.graph()?.without(&views);
        tracing::debug!(
            files = files.len(),
            edges = graph.edge_count(),
            views = views.len(),
            "discovery snapshot"
        );

        let candidates: Vec<&FileRef> = files
            .iter()
            .filter(|file| query.in_scope(&file.path))
            .filter(|file| !views.contains(&file.path) && !archived.contains(&file.path))
            .filter(|file| !query.is_excluded(file))
            .collect();

        let root = self.settings.root_file.as_deref();
        if root.is_none() && !self.advised.replace(true) {
            self.host.notify(ORPHAN_MODE_ADVICE);
        }

        let discovery = find_untracked(&graph, candidates, root);
        tracing::info!(
            untracked = discovery.len(),
            scanned = files.len(),
            "discovery finished"
        );
        Ok(discovery)
    }

    /// Write the discovery report into the archive folder, replacing any
    /// report already at today's path, and open it.
    ///
    /// # Errors
    ///
    /// Returns the host's error if discovery, the delete, the create, or the
    /// open fails. Nothing is retried.
    pub fn create_discovery_report(&self) -> Result<FileRef> {
        let folder = self.ensure_archive_folder()?;
        let discovery = self.discover_untracked()?;
        let path = paths::report_path(&folder, self.today);

        if self.host.file_exists(&path) {
            self.host.delete_entry(&path)?;
            tracing::debug!(path = %path, "replaced previous report");
        }
        let report = self.host.create_document(&path, &render_report(&discovery))?;
        self.host.open_in_new_pane(&report)?;

        tracing::info!(path = %path, files = discovery.len(), "created discovery report");
        Ok(report)
    }
}
