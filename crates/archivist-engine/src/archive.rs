//! Archiving files: copy (or move) into the archive folder under a dated,
//! collision-free name.
//!
//! Files of one batch are processed strictly in order, each one's collision
//! check seeing the previous one's writes. A failing file is recorded and the
//! batch moves on; one summary notice goes out at the end.

use std::cell::Cell;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use archivist_core::error::{ArchivistError, Result};
use archivist_core::{FileRef, Host, ValidatedSettings, ARCHIVE_VIEW_TAG};
use archivist_query::QueryContext;

use crate::paths::{self, Slot};

/// Runs archive and discovery operations against one host.
pub struct Archiver<'h, H: ?Sized> {
    pub(crate) host: &'h H,
    pub(crate) settings: ValidatedSettings,
    pub(crate) today: NaiveDate,
    /// Set once the orphan-mode advisory has been shown.
    pub(crate) advised: Cell<bool>,
}

/// One file that reached the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archived {
    /// Where the file was before archiving.
    pub source: String,
    pub archived: FileRef,
    /// Whether an older archive at the same path was deleted to make room.
    pub replaced: bool,
}

/// One file that failed to archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveFailure {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveOutcome {
    pub archived: Vec<Archived>,
    pub failures: Vec<ArchiveFailure>,
}

impl ArchiveOutcome {
    /// Text of the summary notice.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            format!("archived {} file(s)", self.archived.len())
        } else {
            format!(
                "archived {} file(s), {} failed",
                self.archived.len(),
                self.failures.len()
            )
        }
    }
}

/// What invoked [`Archiver::archive_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Availability check: report whether the command applies, change nothing.
    Check,
    Execute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CurrentArchive {
    /// No active file.
    NotApplicable,
    /// A check found something to archive. `view` is set when the active
    /// file is an archive view.
    Available { file: FileRef, view: bool },
    Archived(ArchiveOutcome),
}

impl CurrentArchive {
    /// Whether the command had something to act on.
    #[must_use]
    pub fn applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

impl<'h, H: Host + ?Sized> Archiver<'h, H> {
    pub fn new(host: &'h H, settings: ValidatedSettings) -> Self {
        Self {
            host,
            settings,
            today: Utc::now().date_naive(),
            advised: Cell::new(false),
        }
    }

    /// Fix the date used for prefixes instead of today's UTC date.
    #[must_use]
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &ValidatedSettings {
        &self.settings
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Query context for the current settings.
    #[must_use]
    pub fn query(&self) -> QueryContext<'h, H> {
        QueryContext::from_settings(self.host, &self.settings)
    }

    /// Create the archive folder if needed and return its path.
    ///
    /// # Errors
    ///
    /// Returns the host's error if the folder cannot be created.
    pub fn ensure_archive_folder(&self) -> Result<String> {
        paths::ensure_archive_folder(self.host, &self.settings.archive_folder)
    }

    /// Archive `files` in order. Sources are deleted after a successful copy
    /// unless `copy_only` is set.
    ///
    /// # Errors
    ///
    /// Fails only when the archive folder cannot be created. Per-file errors
    /// are collected in [`ArchiveOutcome::failures`].
    pub fn archive(&self, files: &[FileRef], copy_only: bool) -> Result<ArchiveOutcome> {
        let folder = self.ensure_archive_folder()?;
        let mut outcome = ArchiveOutcome::default();

        for file in files {
            match self.archive_one(&folder, file, copy_only) {
                Ok(archived) => {
                    tracing::debug!(
                        source = %archived.source,
                        destination = %archived.archived.path,
                        replaced = archived.replaced,
                        "archived file"
                    );
                    outcome.archived.push(archived);
                }
                Err(err) => {
                    tracing::warn!(path = %file.path, error = %err, "failed to archive file");
                    outcome.failures.push(ArchiveFailure {
                        path: file.path.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            archived = outcome.archived.len(),
            failed = outcome.failures.len(),
            copy_only,
            "archive batch finished"
        );
        self.host.notify(&outcome.summary());
        Ok(outcome)
    }

    fn archive_one(&self, folder: &str, file: &FileRef, copy_only: bool) -> Result<Archived> {
        let base = paths::archive_base(folder, file, self.today);
        let mut destination = paths::with_extension(&base, &file.extension);
        let mut replaced = false;

        let archived = if !self.host.file_exists(&destination) {
            self.host.copy_file(file, &destination)?
        } else if file.is_mutable() {
            match paths::resolve_collision(&base, &file.extension, |p| self.host.file_exists(p)) {
                Slot::Free(path) => destination = path,
                Slot::Evict(path) => {
                    self.host.delete_entry(&path)?;
                    destination = path;
                    replaced = true;
                }
            }
            self.host.copy_file(file, &destination)?
        } else {
            if destination == file.path {
                return Err(ArchivistError::Vault(format!(
                    "{} is already at its archive destination",
                    file.path
                )));
            }
            // Binary archives are not versioned: the old copy is replaced.
            replaced = true;
            self.replace_binary(&base, file, &destination)?
        };

        if !copy_only {
            self.host.delete_entry(&file.path)?;
        }

        Ok(Archived {
            source: file.path.clone(),
            archived,
            replaced,
        })
    }

    /// Replace the archived binary at `destination` with `file`.
    ///
    /// The new content is staged under a free versioned name first, so the
    /// old archive is only evicted once the source has been copied.
    fn replace_binary(&self, base: &str, file: &FileRef, destination: &str) -> Result<FileRef> {
        let Slot::Free(staging) =
            paths::resolve_collision(base, &file.extension, |p| self.host.file_exists(p))
        else {
            return Err(ArchivistError::Vault(format!(
                "no free staging name next to {destination}"
            )));
        };
        let staged = self.host.copy_file(file, &staging)?;

        if let Err(err) = self.host.delete_entry(destination) {
            if let Err(cleanup) = self.host.delete_entry(&staging) {
                tracing::warn!(path = %staging, error = %cleanup, "failed to remove staged copy");
            }
            return Err(err);
        }
        let archived = self.host.copy_file(&staged, destination)?;
        self.host.delete_entry(&staging)?;
        Ok(archived)
    }

    /// Archive the active file, or, when it is an archive view, the in-scope
    /// files it links to.
    ///
    /// # Errors
    ///
    /// Returns an error if the link index cannot be read or the archive
    /// folder cannot be created.
    pub fn archive_current(&self, trigger: Trigger, copy_only: bool) -> Result<CurrentArchive> {
        let Some(active) = self.host.active_file() else {
            if trigger == Trigger::Execute {
                self.host.notify("no active file to archive");
            }
            return Ok(CurrentArchive::NotApplicable);
        };

        let query = self.query();
        let view = query.is_marked(&active, ARCHIVE_VIEW_TAG);

        if trigger == Trigger::Check {
            return Ok(CurrentArchive::Available { file: active, view });
        }

        let files = if view {
            let targets: Vec<FileRef> = query
                .outbound_links(&active)?
                .iter()
                .filter(|path| **path != active.path)
                .filter_map(|path| self.host.file(path))
                .collect();
            tracing::debug!(view = %active.path, targets = targets.len(), "archiving through view");
            targets
        } else {
            vec![active]
        };

        Ok(CurrentArchive::Archived(self.archive(&files, copy_only)?))
    }
}
