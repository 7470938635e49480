//! A vault backed by a directory on disk.
//!
//! Paths handed to the host traits are vault-relative and slash-separated.
//! Hidden entries (`.archivist`, `.git`, `.obsidian`, ...) are not part of
//! the vault. The link index is rebuilt from the files on every call.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use archivist_core::error::{ArchivistError, Result};
use archivist_core::{FileRef, LinkIndex, LinkSource, Notifier, Storage, Workspace};
use archivist_index::{IndexBuilder, VaultIndex};

use crate::notes::{is_linkable, refs_from_text};

type NoticeSink = Box<dyn Fn(&str)>;

/// A vault rooted at a directory.
pub struct FsVault {
    root: PathBuf,
    active: RefCell<Option<String>>,
    opened: RefCell<Vec<FileRef>>,
    notices: RefCell<Vec<String>>,
    sink: Option<NoticeSink>,
}

impl std::fmt::Debug for FsVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsVault")
            .field("root", &self.root)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl FsVault {
    /// Open the vault rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchivistError::Vault`] if `root` is not a directory.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(ArchivistError::Vault(format!(
                "vault root is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self {
            root: root.canonicalize()?,
            active: RefCell::new(None),
            opened: RefCell::new(Vec::new()),
            notices: RefCell::new(Vec::new()),
            sink: None,
        })
    }

    /// Forward every notification to `sink` as well as keeping it.
    #[must_use]
    pub fn with_notifier(mut self, sink: impl Fn(&str) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mark a file as the active one. Accepts vault-relative paths or paths
    /// inside the vault root.
    ///
    /// # Errors
    ///
    /// Returns [`ArchivistError::NotFound`] if no such file exists in the vault.
    pub fn set_active_file(&self, path: &str) -> Result<FileRef> {
        let relative = self.relativize(path)?;
        let file = self
            .file(&relative)
            .ok_or_else(|| ArchivistError::NotFound(relative.clone()))?;
        *self.active.borrow_mut() = Some(relative);
        Ok(file)
    }

    /// Map a user-supplied path onto a vault-relative one.
    ///
    /// # Errors
    ///
    /// Returns [`ArchivistError::Vault`] if the path lies outside the vault.
    pub fn relativize(&self, path: &str) -> Result<String> {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            let absolute = candidate.canonicalize().unwrap_or_else(|_| candidate.to_path_buf());
            let relative = absolute.strip_prefix(&self.root).map_err(|_| {
                ArchivistError::Vault(format!("path is outside the vault: {path}"))
            })?;
            return Ok(to_slash(relative));
        }
        let normalized = path.replace('\\', "/");
        let trimmed = normalized.trim_start_matches("./").trim_matches('/');
        self.resolve(trimmed)?;
        Ok(trimmed.to_string())
    }

    /// Files handed to [`Workspace::open_in_new_pane`], in order.
    #[must_use]
    pub fn opened(&self) -> Vec<FileRef> {
        self.opened.borrow().clone()
    }

    /// Every notification sent so far.
    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }

    /// Parse every linkable file and resolve links across the whole vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault cannot be listed.
    pub fn snapshot(&self) -> Result<VaultIndex> {
        let files = self.list_all_files()?;
        let mut builder = IndexBuilder::new(&files);
        for file in files.iter().filter(|f| is_linkable(f)) {
            match self.read_file_text(&file.path) {
                Ok(text) => builder.add_note(&file.path, &refs_from_text(file, &text)),
                Err(err) => tracing::warn!(path = %file.path, error = %err, "skipping unreadable note"),
            }
        }
        let index = builder.finish();
        tracing::debug!(files = files.len(), sources = index.links.iter().count(), "vault indexed");
        Ok(index)
    }

    /// Absolute path for a vault-relative one. Rejects anything that could
    /// climb out of the vault.
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ArchivistError::Vault(format!(
                "path escapes the vault: {}",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn io_error(path: &str, err: std::io::Error) -> ArchivistError {
    if err.kind() == ErrorKind::NotFound {
        ArchivistError::NotFound(path.to_string())
    } else {
        ArchivistError::Vault(format!("{path}: {err}"))
    }
}

impl Storage for FsVault {
    fn folder_exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_dir())
    }

    fn file_exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_file())
    }

    fn create_folder(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        fs::create_dir_all(&target).map_err(|e| io_error(path, e))?;
        tracing::debug!(path, "created folder");
        Ok(())
    }

    fn delete_entry(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        if target == self.root {
            return Err(ArchivistError::Vault("refusing to delete the vault root".to_string()));
        }
        let result = if target.is_dir() {
            fs::remove_dir(&target)
        } else {
            fs::remove_file(&target)
        };
        result.map_err(|e| io_error(path, e))?;
        tracing::debug!(path, "deleted entry");
        Ok(())
    }

    fn copy_file(&self, src: &FileRef, dest: &str) -> Result<FileRef> {
        let from = self.resolve(&src.path)?;
        let to = self.resolve(dest)?;
        if to.exists() {
            return Err(ArchivistError::Vault(format!("destination already exists: {dest}")));
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(dest, e))?;
        }
        fs::copy(&from, &to).map_err(|e| io_error(&src.path, e))?;
        tracing::debug!(from = %src.path, to = dest, "copied file");
        Ok(FileRef::from_path(dest))
    }

    fn list_all_files(&self) -> Result<Vec<FileRef>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry.map_err(|e| ArchivistError::Vault(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| ArchivistError::Vault(e.to_string()))?;
            files.push(FileRef::from_path(&to_slash(relative)));
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn file(&self, path: &str) -> Option<FileRef> {
        self.file_exists(path)
            .then(|| FileRef::from_path(path.trim_start_matches('/')))
    }

    fn read_file_text(&self, path: &str) -> Result<String> {
        let target = self.resolve(path)?;
        fs::read_to_string(&target).map_err(|e| io_error(path, e))
    }

    fn create_document(&self, path: &str, content: &str) -> Result<FileRef> {
        let target = self.resolve(path)?;
        if target.exists() {
            return Err(ArchivistError::Vault(format!("file already exists: {path}")));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
        }
        fs::write(&target, content).map_err(|e| io_error(path, e))?;
        tracing::debug!(path, bytes = content.len(), "created document");
        Ok(FileRef::from_path(path))
    }
}

impl LinkSource for FsVault {
    fn read_link_index(&self) -> Result<LinkIndex> {
        Ok(self.snapshot()?.links)
    }

    fn read_tags(&self, path: &str) -> Option<BTreeSet<String>> {
        let file = self.file(path)?;
        if !is_linkable(&file) {
            return None;
        }
        let text = self.read_file_text(&file.path).ok()?;
        let tags: BTreeSet<String> = refs_from_text(&file, &text).tags.into_iter().collect();
        (!tags.is_empty()).then_some(tags)
    }
}

impl Workspace for FsVault {
    fn active_file(&self) -> Option<FileRef> {
        let active = self.active.borrow();
        active.as_deref().and_then(|path| self.file(path))
    }

    fn open_in_new_pane(&self, file: &FileRef) -> Result<()> {
        if !self.file_exists(&file.path) {
            return Err(ArchivistError::NotFound(file.path.clone()));
        }
        tracing::info!(path = %file.path, "opened in new pane");
        self.opened.borrow_mut().push(file.clone());
        Ok(())
    }
}

impl Notifier for FsVault {
    fn notify(&self, message: &str) {
        tracing::info!(message, "notice");
        if let Some(sink) = &self.sink {
            sink(message);
        }
        self.notices.borrow_mut().push(message.to_string());
    }
}
