//! # archivist-core
//!
//! Core types, settings, and host capability traits for archivist.
//!
//! This crate defines the foundational types used across all other archivist crates:
//! - [`FileRef`] and [`FileKind`] — read-only file handles with an explicit
//!   mutable/immutable classification
//! - [`LinkIndex`] — resolved source → target link counts
//! - Host capability traits ([`Storage`], [`LinkSource`], [`Workspace`], [`Notifier`], [`Host`])
//! - [`ArchivistSettings`] — the persisted configuration record and its validation
//! - Error hierarchy ([`ArchivistError`], [`ConfigError`])
//! - Frontmatter tag parsing ([`frontmatter`])

pub mod error;
pub mod file;
pub mod frontmatter;
pub mod host;
pub mod link;
pub mod settings;

pub use error::{ArchivistError, ConfigError, Result};
pub use file::{FileKind, FileRef};
pub use host::{Host, LinkSource, Notifier, Storage, Workspace};
pub use link::LinkIndex;
pub use settings::{validate_folder_list, ArchivistSettings, ValidatedSettings};

/// Tag marking generated mirror files; excluded from discovery reports on request.
pub const MIRROR_TAG: &str = "#mirror";

/// Tag marking archive-view documents, whose outbound links name the files to archive.
pub const ARCHIVE_VIEW_TAG: &str = "#archive-view";
