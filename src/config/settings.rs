//! User settings for keyseal
//!
//! Controls output file extensions, the KDF iteration count, auditing, and
//! whether `encrypt` re-opens what it just wrote.

use serde::{Deserialize, Serialize};

use super::paths::KeysealPaths;
use crate::crypto::key_derivation::DEFAULT_KDF_ITERATIONS;
use crate::error::{KeysealError, KeysealResult};

/// User settings for keyseal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// PBKDF2 iteration count used when generating master keys
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Extension for encrypted files, without the dot
    #[serde(default = "default_encrypted_extension")]
    pub encrypted_extension: String,

    /// Extension for key files, without the dot
    #[serde(default = "default_key_extension")]
    pub key_extension: String,

    /// Whether operations are appended to the audit log
    #[serde(default = "default_true")]
    pub audit_enabled: bool,

    /// Whether `encrypt` opens the written files again to prove they decrypt
    #[serde(default = "default_true")]
    pub verify_after_encrypt: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

fn default_encrypted_extension() -> String {
    "enc".to_string()
}

fn default_key_extension() -> String {
    "key".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            kdf_iterations: default_kdf_iterations(),
            encrypted_extension: default_encrypted_extension(),
            key_extension: default_key_extension(),
            audit_enabled: true,
            verify_after_encrypt: true,
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &KeysealPaths) -> KeysealResult<Self> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| KeysealError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| KeysealError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &KeysealPaths) -> KeysealResult<()> {
        self.validate()?;
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| KeysealError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| KeysealError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings the crypto core or the file layout can't honor
    pub fn validate(&self) -> KeysealResult<()> {
        if self.kdf_iterations < DEFAULT_KDF_ITERATIONS {
            return Err(KeysealError::Config(format!(
                "kdf_iterations must be at least {}",
                DEFAULT_KDF_ITERATIONS
            )));
        }

        for (name, ext) in [
            ("encrypted_extension", &self.encrypted_extension),
            ("key_extension", &self.key_extension),
        ] {
            if ext.is_empty() || ext.contains(['/', '\\', '.']) {
                return Err(KeysealError::Config(format!(
                    "{} must be a bare extension, got '{}'",
                    name, ext
                )));
            }
        }

        if self.encrypted_extension == self.key_extension {
            return Err(KeysealError::Config(
                "encrypted_extension and key_extension must differ".to_string(),
            ));
        }

        Ok(())
    }
}
