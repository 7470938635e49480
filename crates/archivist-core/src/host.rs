//! Host capabilities consumed by the archivist core.
//!
//! The core never touches storage directly. File operations, the link index,
//! the tag cache, the active-file tracker and user notifications are injected
//! through these traits so each can be backed by a real vault on disk or by an
//! in-memory fake in tests. Implementations must always answer from current
//! state; the core does not cache anything across calls.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::file::FileRef;
use crate::link::LinkIndex;

/// File and folder primitives of the vault.
pub trait Storage {
    /// Whether a folder exists at the vault-relative path. The empty path
    /// names the vault root, which always exists.
    fn folder_exists(&self, path: &str) -> bool;

    /// Whether a file exists at the vault-relative path.
    fn file_exists(&self, path: &str) -> bool;

    /// Create a folder (and any missing parents).
    fn create_folder(&self, path: &str) -> Result<()>;

    /// Delete a file or an empty folder.
    fn delete_entry(&self, path: &str) -> Result<()>;

    /// Copy `src` to `dest`. Fails if `dest` already exists.
    fn copy_file(&self, src: &FileRef, dest: &str) -> Result<FileRef>;

    /// Every file in the vault.
    fn list_all_files(&self) -> Result<Vec<FileRef>>;

    /// Look up a single file by path.
    fn file(&self, path: &str) -> Option<FileRef>;

    fn read_file_text(&self, path: &str) -> Result<String>;

    /// Create a new document. Fails if the path is taken.
    fn create_document(&self, path: &str, content: &str) -> Result<FileRef>;
}

/// Read access to the externally maintained link index and tag cache.
pub trait LinkSource {
    /// Snapshot of the resolved links at call time.
    fn read_link_index(&self) -> Result<LinkIndex>;

    /// Tags declared in the file (normalized with a leading `#`), or `None`
    /// when the cache has no entry for the path.
    fn read_tags(&self, path: &str) -> Option<BTreeSet<String>>;
}

/// The user's editing workspace.
pub trait Workspace {
    fn active_file(&self) -> Option<FileRef>;

    fn open_in_new_pane(&self, file: &FileRef) -> Result<()>;
}

/// Fire-and-forget user notifications.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Everything the archival engine needs from its host.
pub trait Host: Storage + LinkSource + Workspace + Notifier {}

impl<T: Storage + LinkSource + Workspace + Notifier + ?Sized> Host for T {}
