//! Master key generation using PBKDF2-HMAC-SHA256
//!
//! A master key is stretched from 32 bytes of random "password" material and a
//! random 16-byte salt. The password is thrown away after derivation; only the
//! key and the salt are kept, and both go into the key file.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{KeysealError, KeysealResult};

use super::random::{OsRandom, RandomSource};

/// Length of a master key in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Length of the KDF salt in bytes
pub const SALT_LEN: usize = 16;

/// Length of the random password material fed to the KDF
const PASSWORD_LEN: usize = 32;

/// Minimum and default PBKDF2 iteration count
pub const DEFAULT_KDF_ITERATIONS: u32 = 10_000;

/// A 256-bit AES key, wiped from memory on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_LEN]);

impl MasterKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a key from a slice, which must be exactly 32 bytes long
    pub fn from_slice(bytes: &[u8]) -> KeysealResult<Self> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            KeysealError::KeySetup(format!(
                "master key must be {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Parse a lowercase or uppercase hex string
    pub fn from_hex(text: &str) -> KeysealResult<Self> {
        let bytes = Zeroizing::new(
            hex::decode(text)
                .map_err(|e| KeysealError::Decode(format!("invalid key hex: {}", e)))?,
        );
        Self::from_slice(&bytes)
    }

    /// Lowercase hex encoding, as written to the key file
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// The salt the master key was derived with
///
/// Kept next to the key for reference only; it is never used by sealing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfSalt([u8; SALT_LEN]);

impl KdfSalt {
    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse standard padded base64, which must decode to 16 bytes
    pub fn from_base64(text: &str) -> KeysealResult<Self> {
        let bytes = STANDARD
            .decode(text)
            .map_err(|e| KeysealError::Decode(format!("invalid salt base64: {}", e)))?;
        let salt: [u8; SALT_LEN] = bytes.as_slice().try_into().map_err(|_| {
            KeysealError::Decode(format!(
                "salt must decode to {} bytes, got {}",
                SALT_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(salt))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

/// Derive a fresh master key using the OS random source
pub fn generate_master_key() -> KeysealResult<(MasterKey, KdfSalt)> {
    derive_master_key(&OsRandom)
}

/// Derive a fresh master key with the default iteration count
///
/// Draws 32 password bytes, then 16 salt bytes, from `source`.
pub fn derive_master_key(source: &dyn RandomSource) -> KeysealResult<(MasterKey, KdfSalt)> {
    derive_master_key_with_iterations(source, DEFAULT_KDF_ITERATIONS)
}

/// Derive a fresh master key with an explicit PBKDF2 iteration count
pub fn derive_master_key_with_iterations(
    source: &dyn RandomSource,
    iterations: u32,
) -> KeysealResult<(MasterKey, KdfSalt)> {
    if iterations < DEFAULT_KDF_ITERATIONS {
        return Err(KeysealError::Config(format!(
            "KDF iterations must be at least {}, got {}",
            DEFAULT_KDF_ITERATIONS, iterations
        )));
    }

    let mut password = Zeroizing::new([0u8; PASSWORD_LEN]);
    source.fill(&mut *password)?;

    let mut salt = [0u8; SALT_LEN];
    source.fill(&mut salt)?;

    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(&*password, &salt, iterations, &mut key);

    let master = MasterKey(key);
    key.zeroize();

    tracing::debug!(iterations, "derived master key");
    Ok((master, KdfSalt(salt)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::random::ReplayRandom;

    fn counting_source(len: u8) -> ReplayRandom {
        ReplayRandom::new((0..len).collect::<Vec<u8>>())
    }

    #[test]
    fn test_derive_golden_vector() {
        let (key, salt) = derive_master_key(&counting_source(48)).unwrap();

        assert_eq!(
            key.to_hex(),
            "d1061f8e58a9feae8137d1a4aa20aeda6e19240b18334aac096c985b671fce11"
        );
        assert_eq!(salt.to_base64(), "ICEiIyQlJicoKSorLC0uLw==");
    }

    #[test]
    fn test_generated_keys_differ() {
        let (key1, salt1) = generate_master_key().unwrap();
        let (key2, salt2) = generate_master_key().unwrap();
        assert_ne!(key1, key2);
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_random_failure_propagates() {
        // Enough for the password, not for the salt
        let err = derive_master_key(&counting_source(40)).unwrap_err();
        assert!(matches!(err, KeysealError::RandomSource(_)));
    }

    #[test]
    fn test_low_iteration_count_rejected() {
        let err = derive_master_key_with_iterations(&counting_source(48), 9_999).unwrap_err();
        assert!(matches!(err, KeysealError::Config(_)));
    }

    #[test]
    fn test_key_from_slice_wrong_length() {
        let err = MasterKey::from_slice(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, KeysealError::KeySetup(_)));
    }

    #[test]
    fn test_key_hex_round_trip() {
        let key = MasterKey::from_bytes([0xab; KEY_LEN]);
        let parsed = MasterKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn test_key_from_bad_hex() {
        let err = MasterKey::from_hex("zz").unwrap_err();
        assert!(matches!(err, KeysealError::Decode(_)));
    }

    #[test]
    fn test_salt_wrong_length() {
        let err = KdfSalt::from_base64("AAAA").unwrap_err();
        assert!(matches!(err, KeysealError::Decode(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = MasterKey::from_bytes([0x41; KEY_LEN]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("41"));
    }
}
