//! # archivist-engine
//!
//! Archival engine for archivist.
//!
//! Exposes the operations the command layer calls:
//! - [`Archiver::archive`]: copy or move files into the dated archive folder
//! - [`Archiver::archive_current`]: archive the active file, or the files an
//!   archive view links to
//! - [`Archiver::discover_untracked`]: files unreachable from the root, or
//!   orphans when no root is set
//! - [`Archiver::create_discovery_report`]: write and open the archive-view
//!   report of untracked files
//!
//! Path rules (date prefix, collision suffixes) live in [`paths`].

pub mod archive;
pub mod discovery;
pub mod paths;

pub use archive::{
    ArchiveFailure, ArchiveOutcome, Archived, Archiver, CurrentArchive, Trigger,
};
pub use discovery::ORPHAN_MODE_ADVICE;
pub use paths::{date_prefix, resolve_collision, Slot, MAX_VERSIONS};
