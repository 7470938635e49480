//! File references — read-only handles onto documents stored in the vault.

use serde::{Deserialize, Serialize};

/// Whether a stored file is a text/diagram format that changes over time
/// or an opaque binary.
///
/// The classification is computed once at the host boundary and carried
/// on every [`FileRef`]; nothing downstream re-derives it from the
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Text and diagram formats. Archived copies get a date prefix and
    /// numbered collision suffixes.
    Mutable,
    /// Binary attachments. Archived without a date prefix; an existing
    /// archive copy is overwritten.
    Immutable,
}

/// Extensions treated as [`FileKind::Mutable`].
pub const MUTABLE_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "canvas", "excalidraw"];

impl FileKind {
    /// Classify a file by its extension (case-insensitive, without the dot).
    #[must_use]
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.to_ascii_lowercase();
        if MUTABLE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Mutable
        } else {
            Self::Immutable
        }
    }

    #[must_use]
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Mutable)
    }
}

/// A reference to a file in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRef {
    /// Vault-relative, slash-separated path (e.g. `Notes/Daily/today.md`).
    pub path: String,
    /// File name including the extension (e.g. `today.md`).
    pub name: String,
    /// File name without the extension (e.g. `today`).
    pub basename: String,
    /// Extension without the dot; empty when the file has none.
    pub extension: String,
    pub kind: FileKind,
}

impl FileRef {
    /// Build a reference from a vault-relative path, classifying it by extension.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.trim_start_matches('/').to_string();
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        let (basename, extension) = match name.rfind('.') {
            Some(idx) if idx > 0 => (name[..idx].to_string(), name[idx + 1..].to_string()),
            _ => (name.clone(), String::new()),
        };
        let kind = FileKind::from_extension(&extension);
        Self {
            path,
            name,
            basename,
            extension,
            kind,
        }
    }

    /// Folder containing this file; empty for files at the vault root.
    #[must_use]
    pub fn parent(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }

    #[must_use]
    pub fn is_mutable(&self) -> bool {
        self.kind.is_mutable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_splits_name_and_extension() {
        let file = FileRef::from_path("Notes/Daily/today.md");
        assert_eq!(file.name, "today.md");
        assert_eq!(file.basename, "today");
        assert_eq!(file.extension, "md");
        assert_eq!(file.parent(), "Notes/Daily");
        assert_eq!(file.kind, FileKind::Mutable);
    }

    #[test]
    fn binary_attachments_are_immutable() {
        let file = FileRef::from_path("Assets/photo.PNG");
        assert_eq!(file.kind, FileKind::Immutable);
        assert!(!file.is_mutable());
    }

    #[test]
    fn dotfiles_and_extensionless_names() {
        let file = FileRef::from_path("README");
        assert_eq!(file.basename, "README");
        assert_eq!(file.extension, "");
        assert_eq!(file.parent(), "");

        let file = FileRef::from_path("Notes/.hidden");
        assert_eq!(file.basename, ".hidden");
        assert_eq!(file.extension, "");
    }

    #[test]
    fn canvas_and_excalidraw_are_mutable() {
        assert!(FileKind::from_extension("canvas").is_mutable());
        assert!(FileKind::from_extension("excalidraw").is_mutable());
        assert!(!FileKind::from_extension("pdf").is_mutable());
    }
}
