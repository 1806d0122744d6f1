//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// A master key was generated and its key file written
    KeyGenerated,
    /// Plaintext was sealed into an encrypted file
    Sealed,
    /// An encrypted file was opened successfully
    Opened,
    /// Opening an encrypted file failed
    OpenFailed,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::KeyGenerated => write!(f, "KEY_GENERATED"),
            Operation::Sealed => write!(f, "SEALED"),
            Operation::Opened => write!(f, "OPENED"),
            Operation::OpenFailed => write!(f, "OPEN_FAILED"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    /// Name the files were derived from, or the file that was opened
    pub target: String,

    /// Free-form context such as file paths or the error kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditEntry {
    /// Create an entry stamped with the current time
    pub fn new(operation: Operation, target: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            target: target.into(),
            detail,
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.target
        );

        if let Some(detail) = &self.detail {
            output.push_str(&format!(" ({})", detail));
        }

        output
    }
}
