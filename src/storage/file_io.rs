//! Key file and encrypted file persistence
//!
//! Key files hold the recoverable secret and are written owner-only. Encrypted
//! files hold a bare envelope and use normal permissions. Both are written to a
//! temp file first and then renamed into place.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::crypto::{Envelope, KdfSalt, MasterKey};
use crate::error::{KeysealError, KeysealResult};

const SALT_PREFIX: &str = "Salt: ";
const KEY_PREFIX: &str = "Key: ";

/// The contents of a key file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub salt: KdfSalt,
    pub key: MasterKey,
}

impl KeyRecord {
    pub fn new(salt: KdfSalt, key: MasterKey) -> Self {
        Self { salt, key }
    }

    /// Render the two-line key file text (no trailing newline)
    pub fn to_text(&self) -> Zeroizing<String> {
        Zeroizing::new(format!(
            "{}{}\n{}{}",
            SALT_PREFIX,
            self.salt.to_base64(),
            KEY_PREFIX,
            self.key.to_hex()
        ))
    }

    /// Parse key file text
    ///
    /// Line one carries the base64 salt, line two the hex key. The `Salt: ` and
    /// `Key: ` labels are stripped when present; anything after line two is
    /// ignored.
    pub fn parse(text: &str) -> KeysealResult<Self> {
        let mut lines = text.lines();
        let (salt_line, key_line) = match (lines.next(), lines.next()) {
            (Some(salt), Some(key)) => (salt, key),
            _ => {
                return Err(KeysealError::Format(
                    "key file must contain a salt line and a key line".to_string(),
                ))
            }
        };

        let salt_text = salt_line.strip_prefix(SALT_PREFIX).unwrap_or(salt_line);
        let key_text = key_line.strip_prefix(KEY_PREFIX).unwrap_or(key_line);

        let salt = KdfSalt::from_base64(salt_text)?;
        let key = MasterKey::from_hex(key_text)?;

        Ok(Self { salt, key })
    }
}

/// A fully written temp file waiting to be renamed over its target
///
/// Dropping it without calling `commit` removes the temp file and leaves the
/// target untouched.
#[must_use = "a staged file is discarded unless committed"]
#[derive(Debug)]
pub struct StagedFile {
    temp_path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// The path this file will occupy once committed
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the temp file into place
    pub fn commit(mut self) -> KeysealResult<()> {
        fs::rename(&self.temp_path, &self.target).map_err(|e| {
            KeysealError::Io(format!(
                "Failed to move {} into place: {}",
                self.target.display(),
                e
            ))
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}

/// Write `contents` to a fresh sibling temp file of `path`
///
/// The temp file gets a random name and is opened with `create_new`, so an
/// existing file or symlink is never written through. With `owner_only` set
/// it is created with mode 0o600 on Unix.
fn stage(path: &Path, contents: &[u8], owner_only: bool) -> KeysealResult<StagedFile> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            KeysealError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path)?;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if owner_only {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = owner_only;

    let mut file = options
        .open(&temp_path)
        .map_err(|e| KeysealError::Io(format!("Failed to create temp file: {}", e)))?;

    // From here on the temp file is ours to clean up
    let staged = StagedFile {
        temp_path,
        target: path.to_path_buf(),
        committed: false,
    };

    let written = file.write_all(contents).and_then(|()| file.sync_all());
    drop(file);
    written.map_err(|e| KeysealError::Io(format!("Failed to write data: {}", e)))?;

    Ok(staged)
}

fn temp_path_for(path: &Path) -> KeysealResult<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| KeysealError::Io(format!("Not a file path: {}", path.display())))?
        .to_os_string();
    name.push(format!(".{:08x}.tmp", rand::random::<u32>()));
    Ok(path.with_file_name(name))
}

fn read_text(path: &Path, what: &str) -> KeysealResult<String> {
    fs::read_to_string(path).map_err(|e| {
        KeysealError::Io(format!(
            "Failed to read {} {}: {}",
            what,
            path.display(),
            e
        ))
    })
}

/// Stage a key record with owner-only permissions without replacing `path`
pub fn stage_key_record<P: AsRef<Path>>(path: P, record: &KeyRecord) -> KeysealResult<StagedFile> {
    stage(path.as_ref(), record.to_text().as_bytes(), true)
}

/// Save a key record with owner-only permissions
pub fn save_key_record<P: AsRef<Path>>(path: P, record: &KeyRecord) -> KeysealResult<()> {
    let path = path.as_ref();
    stage_key_record(path, record)?.commit()?;
    tracing::debug!(path = %path.display(), "wrote key file");
    Ok(())
}

/// Load and parse a key file
pub fn load_key_record<P: AsRef<Path>>(path: P) -> KeysealResult<KeyRecord> {
    let text = Zeroizing::new(read_text(path.as_ref(), "key file")?);
    KeyRecord::parse(&text)
}

/// Stage an envelope without replacing `path`
pub fn stage_envelope<P: AsRef<Path>>(path: P, envelope: &Envelope) -> KeysealResult<StagedFile> {
    stage(path.as_ref(), envelope.as_str().as_bytes(), false)
}

/// Save an envelope as the sole contents of a file
pub fn save_envelope<P: AsRef<Path>>(path: P, envelope: &Envelope) -> KeysealResult<()> {
    let path = path.as_ref();
    stage_envelope(path, envelope)?.commit()?;
    tracing::debug!(path = %path.display(), "wrote encrypted file");
    Ok(())
}

/// Load envelope text, without surrounding whitespace
pub fn load_envelope<P: AsRef<Path>>(path: P) -> KeysealResult<String> {
    let text = read_text(path.as_ref(), "encrypted file")?;
    Ok(text.trim().to_string())
}
