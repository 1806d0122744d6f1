//! keyseal - seal short secrets with AES-256-GCM
//!
//! A master key is derived with PBKDF2-HMAC-SHA256 from random password
//! material, text is sealed into a base64 envelope, and the key is written to a
//! separate owner-only key file so the text can be recovered later.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `crypto`: Key derivation, envelope sealing/opening, random sources
//! - `storage`: Key file and encrypted file persistence
//! - `config`: Paths and user settings
//! - `audit`: Append-only audit log
//! - `cli`: Command handlers for the `keyseal` binary
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust
//! use keyseal::crypto::{generate_master_key, open, seal};
//!
//! let (key, _salt) = generate_master_key()?;
//! let envelope = seal("hello world", &key)?;
//! assert_eq!(open(envelope.as_str(), &key)?, "hello world");
//! # Ok::<(), keyseal::KeysealError>(())
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;

pub use error::{KeysealError, KeysealResult};
