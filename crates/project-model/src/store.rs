//! On-disk settings store.
//!
//! The store is opened once, handed by reference to every component that
//! reads or edits settings, and written back only through [`SettingsStore::commit`].

use std::path::{Path, PathBuf};

use crate::settings::IconSettings;

/// Loaded settings plus the file they belong to.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: IconSettings,
    dirty: bool,
}

impl SettingsStore {
    /// Load settings from `path`, or create the file with defaults.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Self::load(path);
        }

        let mut store = Self {
            path,
            settings: IconSettings::default(),
            dirty: true,
        };
        store.commit()?;
        tracing::info!(path = %store.path.display(), "Created icon settings");
        Ok(store)
    }

    /// Load an existing settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let json = std::fs::read_to_string(&path).map_err(|e| SettingsError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let mut settings: IconSettings =
            serde_json::from_str(&json).map_err(|e| SettingsError::ParseError {
                path: path.clone(),
                source: e,
            })?;

        let dropped = settings.dedupe();
        if dropped > 0 {
            tracing::warn!(
                path = %path.display(),
                dropped,
                "Dropped duplicate per-asset settings records"
            );
        }

        Ok(Self {
            path,
            settings,
            dirty: dropped > 0,
        })
    }

    /// Settings file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &IconSettings {
        &self.settings
    }

    /// Mutate settings; the change is persisted on the next commit.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut IconSettings) -> R) -> R {
        self.dirty = true;
        f(&mut self.settings)
    }

    /// Whether there are uncommitted changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write pending changes to disk. A clean store is left alone.
    pub fn commit(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            return Ok(());
        }
        self.write_to(&self.path)?;
        self.dirty = false;
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json =
            serde_json::to_string_pretty(&self.settings).map_err(|e| SettingsError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        std::fs::write(path, json).map_err(|e| SettingsError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors that can occur when reading or writing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}
