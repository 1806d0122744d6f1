//! Cryptographic core for keyseal
//!
//! Provides PBKDF2-HMAC-SHA256 master key generation and AES-256-GCM
//! envelopes, with all randomness drawn through an injectable source.

pub mod encryption;
pub mod key_derivation;
pub mod random;
pub mod secure_memory;

pub use encryption::{open, open_bytes, seal, seal_with, Envelope, OperationSalt};
pub use key_derivation::{
    derive_master_key, derive_master_key_with_iterations, generate_master_key, KdfSalt, MasterKey,
};
pub use random::{OsRandom, RandomSource, ReplayRandom};
pub use secure_memory::SecureString;
