//! CLI command handlers
//!
//! This module bridges clap argument parsing with the crypto core and the
//! storage layer. Prompting, file naming, and reporting live here.

pub mod decrypt;
pub mod encrypt;

pub use decrypt::{handle_decrypt_command, DecryptArgs};
pub use encrypt::{handle_encrypt_command, EncryptArgs};

use crate::audit::{AuditEntry, AuditLogger, Operation};
use crate::config::{KeysealPaths, Settings};

/// Everything a command handler needs besides its own arguments
pub struct CliContext {
    pub paths: KeysealPaths,
    pub settings: Settings,
    audit: Option<AuditLogger>,
}

impl CliContext {
    pub fn new(paths: KeysealPaths, settings: Settings) -> Self {
        let audit = settings
            .audit_enabled
            .then(|| AuditLogger::new(paths.audit_log()));
        Self {
            paths,
            settings,
            audit,
        }
    }

    /// Append an audit entry if auditing is on
    ///
    /// A failed audit write is logged and otherwise ignored; it never turns a
    /// completed operation into a failure.
    pub(crate) fn record(&self, operation: Operation, target: &str, detail: Option<String>) {
        if let Some(logger) = &self.audit {
            if let Err(e) = logger.log(&AuditEntry::new(operation, target, detail)) {
                tracing::warn!(error = %e, "failed to write audit entry");
            }
        }
    }
}
