//! An in-memory vault for tests.
//!
//! Links and tags are declared explicitly with [`MemoryVault::link`] and
//! [`MemoryVault::tag`]. Documents created through [`Storage::create_document`]
//! are parsed like notes on disk, so generated reports link to their rows.
//! Copies inherit the source's links and tags; deletes drop them.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use archivist_core::error::{ArchivistError, Result};
use archivist_core::{FileRef, LinkIndex, LinkSource, Notifier, Storage, Workspace};
use archivist_index::IndexBuilder;

use crate::notes::refs_from_text;

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, String>,
    folders: BTreeSet<String>,
    links: BTreeMap<String, BTreeMap<String, u32>>,
    tags: BTreeMap<String, BTreeSet<String>>,
    active: Option<String>,
    opened: Vec<FileRef>,
    notices: Vec<String>,
    failing_copies: BTreeSet<String>,
    failing_deletes: BTreeSet<String>,
}

/// A vault held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryVault {
    state: RefCell<State>,
}

fn parent_folders(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(idx, _)| &path[..idx])
}

impl MemoryVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (and its parent folders).
    #[must_use]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.insert_file(path, content);
        self
    }

    #[must_use]
    pub fn with_folder(self, path: &str) -> Self {
        self.insert_folder(path);
        self
    }

    /// Declare one link from `source` to `target`.
    #[must_use]
    pub fn link(self, source: &str, target: &str) -> Self {
        *self
            .state
            .borrow_mut()
            .links
            .entry(source.to_string())
            .or_default()
            .entry(target.to_string())
            .or_insert(0) += 1;
        self
    }

    /// Declare a tag (`#` optional) on `path`.
    #[must_use]
    pub fn tag(self, path: &str, tag: &str) -> Self {
        let tag = format!("#{}", tag.trim_start_matches('#'));
        self.state
            .borrow_mut()
            .tags
            .entry(path.to_string())
            .or_default()
            .insert(tag);
        self
    }

    #[must_use]
    pub fn with_active(self, path: &str) -> Self {
        self.state.borrow_mut().active = Some(path.to_string());
        self
    }

    /// Make every copy of `path` fail.
    #[must_use]
    pub fn failing_copy(self, path: &str) -> Self {
        self.state.borrow_mut().failing_copies.insert(path.to_string());
        self
    }

    /// Make every delete of `path` fail.
    #[must_use]
    pub fn failing_delete(self, path: &str) -> Self {
        self.state.borrow_mut().failing_deletes.insert(path.to_string());
        self
    }

    pub fn insert_file(&self, path: &str, content: &str) {
        let mut state = self.state.borrow_mut();
        for folder in parent_folders(path) {
            state.folders.insert(folder.to_string());
        }
        state.files.insert(path.to_string(), content.to_string());
    }

    pub fn insert_folder(&self, path: &str) {
        let mut state = self.state.borrow_mut();
        for folder in parent_folders(path) {
            state.folders.insert(folder.to_string());
        }
        state.folders.insert(path.to_string());
    }

    /// Paths of every file, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.state.borrow().files.keys().cloned().collect()
    }

    #[must_use]
    pub fn content(&self, path: &str) -> Option<String> {
        self.state.borrow().files.get(path).cloned()
    }

    #[must_use]
    pub fn opened(&self) -> Vec<FileRef> {
        self.state.borrow().opened.clone()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.state.borrow().notices.clone()
    }

    /// Index links and tags declared in `content`, as a note on disk would be.
    fn index_document(&self, file: &FileRef, content: &str) {
        let refs = refs_from_text(file, content);
        let files = self.list_all_files().unwrap_or_default();
        let mut builder = IndexBuilder::new(&files);
        builder.add_note(&file.path, &refs);
        let index = builder.finish();

        let mut state = self.state.borrow_mut();
        for (source, targets) in index.links.iter() {
            let entry = state.links.entry(source.to_string()).or_default();
            for (target, count) in targets {
                *entry.entry(target.clone()).or_insert(0) += count;
            }
        }
        for (path, tags) in index.tags {
            state.tags.entry(path).or_default().extend(tags);
        }
    }
}

impl Storage for MemoryVault {
    fn folder_exists(&self, path: &str) -> bool {
        path.is_empty() || self.state.borrow().folders.contains(path)
    }

    fn file_exists(&self, path: &str) -> bool {
        self.state.borrow().files.contains_key(path)
    }

    fn create_folder(&self, path: &str) -> Result<()> {
        if self.file_exists(path) {
            return Err(ArchivistError::Vault(format!("a file exists at {path}")));
        }
        self.insert_folder(path);
        Ok(())
    }

    fn delete_entry(&self, path: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.failing_deletes.contains(path) {
            return Err(ArchivistError::Vault(format!("delete refused: {path}")));
        }
        if state.files.remove(path).is_some() {
            state.links.remove(path);
            // Links into the deleted file no longer resolve.
            for targets in state.links.values_mut() {
                targets.remove(path);
            }
            state.tags.remove(path);
            return Ok(());
        }
        if state.folders.contains(path) {
            let prefix = format!("{path}/");
            let occupied = state.files.keys().any(|p| p.starts_with(&prefix))
                || state.folders.iter().any(|p| p.starts_with(&prefix));
            if occupied {
                return Err(ArchivistError::Vault(format!("folder not empty: {path}")));
            }
            state.folders.remove(path);
            return Ok(());
        }
        Err(ArchivistError::NotFound(path.to_string()))
    }

    fn copy_file(&self, src: &FileRef, dest: &str) -> Result<FileRef> {
        let content = {
            let state = self.state.borrow();
            if state.failing_copies.contains(&src.path) {
                return Err(ArchivistError::Vault(format!("copy refused: {}", src.path)));
            }
            if state.files.contains_key(dest) {
                return Err(ArchivistError::Vault(format!("destination already exists: {dest}")));
            }
            state
                .files
                .get(&src.path)
                .cloned()
                .ok_or_else(|| ArchivistError::NotFound(src.path.clone()))?
        };
        self.insert_file(dest, &content);

        let mut state = self.state.borrow_mut();
        if let Some(targets) = state.links.get(&src.path).cloned() {
            state.links.insert(dest.to_string(), targets);
        }
        if let Some(tags) = state.tags.get(&src.path).cloned() {
            state.tags.insert(dest.to_string(), tags);
        }
        Ok(FileRef::from_path(dest))
    }

    fn list_all_files(&self) -> Result<Vec<FileRef>> {
        Ok(self
            .state
            .borrow()
            .files
            .keys()
            .map(|p| FileRef::from_path(p))
            .collect())
    }

    fn file(&self, path: &str) -> Option<FileRef> {
        self.file_exists(path).then(|| FileRef::from_path(path))
    }

    fn read_file_text(&self, path: &str) -> Result<String> {
        self.content(path)
            .ok_or_else(|| ArchivistError::NotFound(path.to_string()))
    }

    fn create_document(&self, path: &str, content: &str) -> Result<FileRef> {
        if self.file_exists(path) {
            return Err(ArchivistError::Vault(format!("file already exists: {path}")));
        }
        self.insert_file(path, content);
        let file = FileRef::from_path(path);
        self.index_document(&file, content);
        Ok(file)
    }
}

impl LinkSource for MemoryVault {
    fn read_link_index(&self) -> Result<LinkIndex> {
        let state = self.state.borrow();
        let mut index = LinkIndex::new();
        for (source, targets) in &state.links {
            for (target, count) in targets {
                index.add(source, target, *count);
            }
        }
        Ok(index)
    }

    fn read_tags(&self, path: &str) -> Option<BTreeSet<String>> {
        self.state.borrow().tags.get(path).cloned()
    }
}

impl Workspace for MemoryVault {
    fn active_file(&self) -> Option<FileRef> {
        let active = self.state.borrow().active.clone()?;
        self.file(&active)
    }

    fn open_in_new_pane(&self, file: &FileRef) -> Result<()> {
        if !self.file_exists(&file.path) {
            return Err(ArchivistError::NotFound(file.path.clone()));
        }
        self.state.borrow_mut().opened.push(file.clone());
        Ok(())
    }
}

impl Notifier for MemoryVault {
    fn notify(&self, message: &str) {
        self.state.borrow_mut().notices.push(message.to_string());
    }
}
