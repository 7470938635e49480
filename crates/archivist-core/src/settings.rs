//! Persisted configuration record and its validation.
//!
//! The record is stored as TOML at `.archivist/config.toml` inside the vault:
//!
//! ```toml
//! archive_folder = "Archive"
//! included_folders = "Notes, Projects"
//! root_file = "Home.md"
//! exclude_mirrors = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::host::Storage;

/// Directory (inside the vault) holding archivist's own files.
pub const CONFIG_DIR: &str = ".archivist";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// The raw configuration record, as the user wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchivistSettings {
    /// Target folder for archived files and discovery reports.
    pub archive_folder: String,
    /// Comma-separated folder prefixes that define which files are in scope.
    pub included_folders: String,
    /// Root document for reachability tracking; empty selects orphan mode.
    pub root_file: String,
    /// Drop files tagged `#mirror` from discovery reports.
    pub exclude_mirrors: bool,
}

impl Default for ArchivistSettings {
    fn default() -> Self {
        Self {
            archive_folder: "Archive".to_string(),
            included_folders: String::new(),
            root_file: String::new(),
            exclude_mirrors: false,
        }
    }
}

/// Settings that passed validation against the current vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSettings {
    pub archive_folder: String,
    pub included_folders: Vec<String>,
    pub root_file: Option<String>,
    pub exclude_mirrors: bool,
}

impl ArchivistSettings {
    /// Load settings from a TOML file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| ConfigError::Read(format!("{}: {e}", path.display())))
    }

    /// Serialize settings to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Read(e.to_string()))
    }

    /// Validate every field against the vault. Nothing is applied unless all
    /// fields are valid.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self, storage: &(impl Storage + ?Sized)) -> Result<ValidatedSettings, ConfigError> {
        let archive_folder = normalize_folder(&self.archive_folder);
        if archive_folder.is_empty() {
            return Err(ConfigError::MissingArchiveFolder);
        }

        let included_folders = validate_folder_list(&self.included_folders, storage)?;

        let root = self.root_file.trim().trim_start_matches('/');
        let root_file = if root.is_empty() {
            None
        } else if storage.file_exists(root) {
            Some(root.to_string())
        } else {
            return Err(ConfigError::InvalidRootFile(root.to_string()));
        };

        Ok(ValidatedSettings {
            archive_folder,
            included_folders,
            root_file,
            exclude_mirrors: self.exclude_mirrors,
        })
    }
}

/// Parse a comma-separated folder list and check that every entry exists.
///
/// Entries are trimmed; an empty entry names the vault root. Fails on the
/// first folder that does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidFolder`] naming the first invalid entry.
pub fn validate_folder_list(
    raw: &str,
    storage: &(impl Storage + ?Sized),
) -> Result<Vec<String>, ConfigError> {
    let paths: Vec<String> = raw.split(',').map(normalize_folder).collect();
    if let Some(invalid) = paths.iter().find(|p| !storage.folder_exists(p)) {
        return Err(ConfigError::InvalidFolder(invalid.clone()));
    }
    Ok(paths)
}

fn normalize_folder(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::file::FileRef;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    struct Folders(BTreeSet<&'static str>, BTreeSet<&'static str>);

    impl Storage for Folders {
        fn folder_exists(&self, path: &str) -> bool {
            path.is_empty() || self.0.contains(path)
        }
        fn file_exists(&self, path: &str) -> bool {
            self.1.contains(path)
        }
        fn create_folder(&self, _: &str) -> Result<()> {
            unimplemented!()
        }
        fn delete_entry(&self, _: &str) -> Result<()> {
            unimplemented!()
        }
        fn copy_file(&self, _: &FileRef, _: &str) -> Result<FileRef> {
            unimplemented!()
        }
        fn list_all_files(&self) -> Result<Vec<FileRef>> {
            Ok(Vec::new())
        }
        fn file(&self, _: &str) -> Option<FileRef> {
            None
        }
        fn read_file_text(&self, _: &str) -> Result<String> {
            unimplemented!()
        }
        fn create_document(&self, _: &str, _: &str) -> Result<FileRef> {
            unimplemented!()
        }
    }

    fn vault() -> Folders {
        Folders(
            ["Notes", "Archive", "Projects/Active"].into_iter().collect(),
            ["Home.md"].into_iter().collect(),
        )
    }

    #[test]
    fn folder_list_accepts_existing_folders() {
        let folders = validate_folder_list("Notes, Archive", &vault()).unwrap();
        assert_eq!(folders, vec!["Notes", "Archive"]);
    }

    #[test]
    fn folder_list_names_first_invalid_entry() {
        let err = validate_folder_list("Notes, Nonexistent, Missing", &vault()).unwrap_err();
        match err {
            ConfigError::InvalidFolder(name) => assert_eq!(name, "Nonexistent"),
            other => panic!("expected InvalidFolder, got {other:?}"),
        }
    }

    #[test]
    fn empty_folder_list_covers_vault_root() {
        let folders = validate_folder_list("", &vault()).unwrap();
        assert_eq!(folders, vec![String::new()]);
    }

    proptest! {
        #[test]
        fn padding_around_entries_is_ignored(
            picks in prop::collection::vec(0usize..3, 1..5),
            pad in "[ /]{0,3}",
        ) {
            let names = ["Notes", "Archive", "Projects/Active"];
            let expected: Vec<String> = picks.iter().map(|&i| names[i].to_string()).collect();
            let raw = expected
                .iter()
                .map(|name| format!("{pad}{name}{pad}"))
                .collect::<Vec<_>>()
                .join(",");
            prop_assert_eq!(validate_folder_list(&raw, &vault()).unwrap(), expected);
        }
    }

    #[test]
    fn validate_rejects_missing_root_file() {
        let settings = ArchivistSettings {
            root_file: "Nowhere.md".to_string(),
            ..ArchivistSettings::default()
        };
        let err = settings.validate(&vault()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRootFile(ref p) if p == "Nowhere.md"));
    }

    #[test]
    fn validate_rejects_blank_archive_folder() {
        let settings = ArchivistSettings {
            archive_folder: "  ".to_string(),
            ..ArchivistSettings::default()
        };
        assert!(matches!(
            settings.validate(&vault()),
            Err(ConfigError::MissingArchiveFolder)
        ));
    }

    #[test]
    fn validate_produces_optional_root() {
        let settings = ArchivistSettings {
            included_folders: "Notes,Projects/Active/".to_string(),
            root_file: "Home.md".to_string(),
            exclude_mirrors: true,
            ..ArchivistSettings::default()
        };
        let validated = settings.validate(&vault()).unwrap();
        assert_eq!(validated.archive_folder, "Archive");
        assert_eq!(validated.included_folders, vec!["Notes", "Projects/Active"]);
        assert_eq!(validated.root_file.as_deref(), Some("Home.md"));
        assert!(validated.exclude_mirrors);
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ArchivistSettings::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings, ArchivistSettings::default());
    }

    #[test]
    fn load_reads_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "root_file = \"Home.md\"\nexclude_mirrors = true\n").unwrap();

        let settings = ArchivistSettings::load(&path).unwrap();
        assert_eq!(settings.archive_folder, "Archive");
        assert_eq!(settings.root_file, "Home.md");
        assert!(settings.exclude_mirrors);
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "archive_folder = [").unwrap();
        assert!(matches!(
            ArchivistSettings::load(&path),
            Err(ConfigError::Read(_))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let settings = ArchivistSettings {
            included_folders: "Notes".to_string(),
            ..ArchivistSettings::default()
        };
        let raw = settings.to_toml().unwrap();
        let back: ArchivistSettings = toml::from_str(&raw).unwrap();
        assert_eq!(back, settings);
    }
}
