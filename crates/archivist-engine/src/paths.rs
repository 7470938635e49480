//! Archive destinations: the archive folder, dated file names, and the
//! numbered-suffix collision policy.

use chrono::NaiveDate;

use archivist_core::error::Result;
use archivist_core::{FileRef, Storage};

/// Highest collision suffix. Once `(1)` to `(9)` are all taken, `(9)` is
/// evicted and reused.
pub const MAX_VERSIONS: u32 = 9;

/// File name of the discovery report, after the date prefix.
pub const REPORT_NAME: &str = "Archive Index.md";

/// Create `folder` unless it exists, and return its path.
///
/// # Errors
///
/// Returns the host's error if the folder cannot be created.
pub fn ensure_archive_folder<S: Storage + ?Sized>(storage: &S, folder: &str) -> Result<String> {
    if !storage.folder_exists(folder) {
        storage.create_folder(folder)?;
        tracing::info!(folder, "created archive folder");
    }
    Ok(folder.to_string())
}

/// `YY-MM-DD - `, the prefix of dated archive names.
#[must_use]
pub fn date_prefix(date: NaiveDate) -> String {
    date.format("%y-%m-%d - ").to_string()
}

/// Destination path without the extension. Mutable files get the date
/// prefix; immutable ones keep their plain name.
#[must_use]
pub fn archive_base(folder: &str, file: &FileRef, date: NaiveDate) -> String {
    if file.is_mutable() {
        format!("{folder}/{}{}", date_prefix(date), file.basename)
    } else {
        format!("{folder}/{}", file.basename)
    }
}

/// Append `.extension` unless it is empty.
#[must_use]
pub fn with_extension(base: &str, extension: &str) -> String {
    if extension.is_empty() {
        base.to_string()
    } else {
        format!("{base}.{extension}")
    }
}

/// Where `file` is archived before any collision handling.
#[must_use]
pub fn archive_destination(folder: &str, file: &FileRef, date: NaiveDate) -> String {
    with_extension(&archive_base(folder, file, date), &file.extension)
}

/// Path of the discovery report for `date`.
#[must_use]
pub fn report_path(folder: &str, date: NaiveDate) -> String {
    format!("{folder}/{}{REPORT_NAME}", date_prefix(date))
}

/// Outcome of collision resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Nothing exists at the path.
    Free(String),
    /// Every suffix is taken; the occupant of this path must be deleted first.
    Evict(String),
}

impl Slot {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Free(path) | Self::Evict(path) => path,
        }
    }
}

/// First free `base (n).extension` for n in 1..=9, or `(9)` for eviction
/// when all nine exist.
pub fn resolve_collision<F>(base: &str, extension: &str, exists: F) -> Slot
where
    F: Fn(&str) -> bool,
{
    for n in 1..=MAX_VERSIONS {
        let candidate = with_extension(&format!("{base} ({n})"), extension);
        if !exists(&candidate) {
            return Slot::Free(candidate);
        }
    }
    Slot::Evict(with_extension(&format!("{base} ({MAX_VERSIONS})"), extension))
}
