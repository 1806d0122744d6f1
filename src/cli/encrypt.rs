//! `encrypt` command
//!
//! Generates a master key, seals the text, and writes `<name>.<enc ext>` and
//! `<name>.<key ext>` side by side. Existing output is only replaced with
//! `--force`, and nothing is replaced until both new files are fully written.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;

use super::CliContext;
use crate::audit::Operation;
use crate::crypto::{derive_master_key_with_iterations, open, seal, OsRandom, SecureString};
use crate::error::{KeysealError, KeysealResult};
use crate::storage::{load_envelope, load_key_record, stage_envelope, stage_key_record, KeyRecord};

/// Arguments for `keyseal encrypt`
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Text to encrypt (prompted for, hidden, when omitted)
    #[arg(short, long)]
    pub text: Option<String>,

    /// Base name for the output files (prompted for when omitted)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Directory to write the output files into
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Replace existing output files with the same name
    #[arg(short, long)]
    pub force: bool,
}

/// Where `encrypt` put its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptOutput {
    pub encrypted_file: PathBuf,
    pub key_file: PathBuf,
}

/// Handle `keyseal encrypt`
pub fn handle_encrypt_command(ctx: &CliContext, args: EncryptArgs) -> KeysealResult<EncryptOutput> {
    let text = match args.text {
        Some(text) => SecureString::new(text),
        None => prompt_text("Enter text to encrypt: ")?,
    };
    let name = match args.name {
        Some(name) => name,
        None => prompt_line("Enter filename for encrypted output (without extension): ")?,
    };
    validate_name(&name)?;

    let output = encrypt_to_files(ctx, &text, &name, &args.out_dir, args.force)?;

    println!("Encrypted data saved to: {}", output.encrypted_file.display());
    println!("Decryption key saved to: {}", output.key_file.display());

    if ctx.settings.verify_after_encrypt {
        verify_round_trip(&output, &text)?;
        println!("Verified: the encrypted file opens with its key file.");
    }

    Ok(output)
}

/// Derive a key, seal `text`, and write both files
///
/// Fails with `Validation` if either file already exists and `overwrite` is
/// off. Nothing is replaced unless both files were written out in full, and
/// the key file is moved into place first.
pub fn encrypt_to_files(
    ctx: &CliContext,
    text: &str,
    name: &str,
    out_dir: &Path,
    overwrite: bool,
) -> KeysealResult<EncryptOutput> {
    let settings = &ctx.settings;
    let encrypted_file = out_dir.join(format!("{}.{}", name, settings.encrypted_extension));
    let key_file = out_dir.join(format!("{}.{}", name, settings.key_extension));

    if !overwrite {
        if let Some(existing) = [&encrypted_file, &key_file].into_iter().find(|p| p.exists()) {
            return Err(KeysealError::Validation(format!(
                "{} already exists (use --force to replace it)",
                existing.display()
            )));
        }
    }

    let (key, salt) = derive_master_key_with_iterations(&OsRandom, settings.kdf_iterations)?;
    let envelope = seal(text, &key)?;

    let staged_key = stage_key_record(&key_file, &KeyRecord::new(salt, key))?;
    let staged_envelope = stage_envelope(&encrypted_file, &envelope)?;
    staged_key.commit()?;
    staged_envelope.commit()?;

    ctx.record(
        Operation::Sealed,
        name,
        Some(encrypted_file.display().to_string()),
    );
    ctx.record(
        Operation::KeyGenerated,
        name,
        Some(key_file.display().to_string()),
    );

    tracing::info!(
        encrypted = %encrypted_file.display(),
        key = %key_file.display(),
        "encrypted text"
    );

    Ok(EncryptOutput {
        encrypted_file,
        key_file,
    })
}

/// Read both files back and check they open to the original text
fn verify_round_trip(output: &EncryptOutput, expected: &str) -> KeysealResult<()> {
    let envelope = load_envelope(&output.encrypted_file)?;
    let record = load_key_record(&output.key_file)?;
    let opened = SecureString::new(open(&envelope, &record.key)?);

    if opened.as_str() != expected {
        return Err(KeysealError::Validation(format!(
            "{} does not open to the text that was encrypted",
            output.encrypted_file.display()
        )));
    }
    Ok(())
}

/// A base name must be a single non-empty path component
fn validate_name(name: &str) -> KeysealResult<()> {
    if name.trim().is_empty() {
        return Err(KeysealError::Validation(
            "output name cannot be empty".to_string(),
        ));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(KeysealError::Validation(format!(
            "output name '{}' must not contain path separators",
            name
        )));
    }
    Ok(())
}

fn prompt_text(prompt: &str) -> KeysealResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::from)
        .map_err(|e| KeysealError::Io(format!("Failed to read text: {}", e)))
}

fn prompt_line(prompt: &str) -> KeysealResult<String> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditLogger;
    use crate::config::{KeysealPaths, Settings};
    use std::fs;
    use tempfile::TempDir;

    fn test_context(home: &Path) -> CliContext {
        CliContext::new(
            KeysealPaths::with_base_dir(home.to_path_buf()),
            Settings::default(),
        )
    }

    #[test]
    fn test_encrypt_to_files() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = test_context(&temp_dir.path().join("home"));
        let out_dir = temp_dir.path().join("out");

        let output = encrypt_to_files(&ctx, "hello world", "notes", &out_dir, false).unwrap();

        assert_eq!(output.encrypted_file, out_dir.join("notes.enc"));
        assert_eq!(output.key_file, out_dir.join("notes.key"));
        verify_round_trip(&output, "hello world").unwrap();
    }

    #[test]
    fn test_encrypt_records_audit_entries() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = test_context(temp_dir.path());

        encrypt_to_files(&ctx, "x", "audited", temp_dir.path(), false).unwrap();

        let entries = AuditLogger::new(ctx.paths.audit_log()).read_all().unwrap();
        let operations: Vec<_> = entries.iter().map(|e| e.operation).collect();
        assert_eq!(operations, vec![Operation::Sealed, Operation::KeyGenerated]);
        assert!(entries.iter().all(|e| e.target == "audited"));
    }

    #[test]
    fn test_audit_disabled_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            audit_enabled: false,
            ..Settings::default()
        };
        let ctx = CliContext::new(
            KeysealPaths::with_base_dir(temp_dir.path().to_path_buf()),
            settings,
        );

        encrypt_to_files(&ctx, "x", "quiet", temp_dir.path(), false).unwrap();
        assert!(!ctx.paths.audit_log().exists());
    }

    #[test]
    fn test_custom_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            encrypted_extension: "sealed".to_string(),
            key_extension: "secret".to_string(),
            ..Settings::default()
        };
        let ctx = CliContext::new(
            KeysealPaths::with_base_dir(temp_dir.path().to_path_buf()),
            settings,
        );

        let output = encrypt_to_files(&ctx, "x", "notes", temp_dir.path(), false).unwrap();
        assert!(output.encrypted_file.ends_with("notes.sealed"));
        assert!(output.key_file.ends_with("notes.secret"));
    }

    #[test]
    fn test_verify_detects_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = test_context(temp_dir.path());
        let output = encrypt_to_files(&ctx, "original", "notes", temp_dir.path(), false).unwrap();

        let err = verify_round_trip(&output, "something else").unwrap_err();
        assert!(matches!(err, KeysealError::Validation(_)));
        assert!(!err.is_authentication());
    }

    fn audit_operations(ctx: &CliContext) -> Vec<Operation> {
        AuditLogger::new(ctx.paths.audit_log())
            .read_all()
            .unwrap()
            .iter()
            .map(|e| e.operation)
            .collect()
    }

    #[test]
    fn test_existing_output_is_kept_without_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = test_context(temp_dir.path());
        let first = encrypt_to_files(&ctx, "precious", "notes", temp_dir.path(), false).unwrap();

        let err = encrypt_to_files(&ctx, "other", "notes", temp_dir.path(), false).unwrap_err();
        assert!(matches!(err, KeysealError::Validation(_)));
        assert!(err.to_string().contains("already exists"));

        verify_round_trip(&first, "precious").unwrap();
        assert_eq!(
            audit_operations(&ctx),
            vec![Operation::Sealed, Operation::KeyGenerated]
        );
    }

    #[test]
    fn test_overwrite_replaces_both_files() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = test_context(temp_dir.path());
        encrypt_to_files(&ctx, "old", "notes", temp_dir.path(), false).unwrap();

        let second = encrypt_to_files(&ctx, "new", "notes", temp_dir.path(), true).unwrap();
        verify_round_trip(&second, "new").unwrap();
    }

    #[test]
    fn test_failed_key_write_keeps_previous_files() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = test_context(temp_dir.path());
        let first = encrypt_to_files(&ctx, "precious", "notes", temp_dir.path(), false).unwrap();
        let old_envelope = fs::read_to_string(&first.encrypted_file).unwrap();
        let old_key_text = fs::read_to_string(&first.key_file).unwrap();

        // A non-empty directory at the key path makes the key rename fail
        fs::remove_file(&first.key_file).unwrap();
        fs::create_dir(&first.key_file).unwrap();
        fs::write(first.key_file.join("keep"), "x").unwrap();

        let err = encrypt_to_files(&ctx, "replacement", "notes", temp_dir.path(), true).unwrap_err();
        assert!(matches!(err, KeysealError::Io(_)));

        assert_eq!(fs::read_to_string(&first.encrypted_file).unwrap(), old_envelope);
        let record = KeyRecord::parse(&old_key_text).unwrap();
        assert_eq!(open(&old_envelope, &record.key).unwrap(), "precious");

        assert_eq!(
            audit_operations(&ctx),
            vec![Operation::Sealed, Operation::KeyGenerated]
        );
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {:?}", leftovers);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("notes").is_ok());
        assert!(validate_name("my.notes").is_ok());
        assert!(matches!(
            validate_name("  ").unwrap_err(),
            KeysealError::Validation(_)
        ));
        assert!(validate_name("../escape").is_err());
        assert!(validate_name("..").is_err());
    }
}
