//! Audit logging for keyseal
//!
//! Records key generation, sealing, and opening in an append-only log.
//! Entries name the target and the files involved; key material and plaintext
//! never reach the log.
//!
//! # Example
//!
//! ```rust,ignore
//! use keyseal::audit::{AuditEntry, AuditLogger, Operation};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::new(Operation::Sealed, "notes", Some("notes.enc".into())))?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, Operation};
pub use logger::AuditLogger;
