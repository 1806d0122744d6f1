//! Path management for keyseal
//!
//! The base directory holds `config.json` and `audit.log`. It resolves to the
//! platform config directory (`~/.config/keyseal` on Linux) unless a base
//! directory is given explicitly, as the `--home` flag and the tests do.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{KeysealError, KeysealResult};

/// Manages all paths used by keyseal
#[derive(Debug, Clone)]
pub struct KeysealPaths {
    /// Base directory for settings and the audit log
    base_dir: PathBuf,
}

impl KeysealPaths {
    /// Resolve the platform default base directory
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> KeysealResult<Self> {
        let dirs = ProjectDirs::from("", "", "keyseal").ok_or_else(|| {
            KeysealError::Config("Could not determine a home directory".to_string())
        })?;

        Ok(Self {
            base_dir: dirs.config_dir().to_path_buf(),
        })
    }

    /// Create KeysealPaths with a custom base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> KeysealResult<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| KeysealError::Io(format!("Failed to create base directory: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KeysealPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KeysealPaths::with_base_dir(temp_dir.path().join("nested").join("keyseal"));

        paths.ensure_directories().unwrap();
        assert!(paths.base_dir().is_dir());
    }
}
