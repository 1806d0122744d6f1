//! `decrypt` command

use std::path::{Path, PathBuf};

use clap::Args;

use super::CliContext;
use crate::audit::Operation;
use crate::crypto::{open, SecureString};
use crate::error::KeysealResult;
use crate::storage::{load_envelope, load_key_record};

/// Arguments for `keyseal decrypt`
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Encrypted file written by `keyseal encrypt`
    pub encrypted_file: PathBuf,

    /// Key file paired with the encrypted file
    pub key_file: PathBuf,
}

/// Handle `keyseal decrypt`
pub fn handle_decrypt_command(ctx: &CliContext, args: DecryptArgs) -> KeysealResult<()> {
    let plaintext = decrypt_file(ctx, &args.encrypted_file, &args.key_file)?;

    println!("Decrypted text:");
    println!("{}", plaintext.as_str());
    Ok(())
}

/// Load an encrypted file and its key file and open the envelope
pub fn decrypt_file(
    ctx: &CliContext,
    encrypted_file: &Path,
    key_file: &Path,
) -> KeysealResult<SecureString> {
    let target = encrypted_file.display().to_string();
    let detail = Some(format!("key: {}", key_file.display()));

    let result = load_envelope(encrypted_file)
        .and_then(|envelope| {
            let record = load_key_record(key_file)?;
            open(&envelope, &record.key)
        })
        .map(SecureString::from);

    match &result {
        Ok(_) => {
            tracing::info!(file = %target, "decrypted file");
            ctx.record(Operation::Opened, &target, detail);
        }
        Err(e) => {
            tracing::warn!(file = %target, error = %e, "decryption failed");
            ctx.record(Operation::OpenFailed, &target, Some(e.to_string()));
        }
    }

    result
}
