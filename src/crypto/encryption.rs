//! AES-256-GCM envelope sealing and opening
//!
//! An envelope is `nonce || AES-GCM(key, nonce, operation_salt || plaintext)`
//! encoded as standard padded base64. The operation salt is drawn fresh for
//! every seal and is unrelated to the [`KdfSalt`](super::KdfSalt) the key was
//! derived with.

use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{Aead, AeadCore, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::Zeroizing;

use crate::error::{KeysealError, KeysealResult};

use super::key_derivation::MasterKey;
use super::random::{OsRandom, RandomSource};

/// Nonce length required by the cipher (96 bits for AES-GCM)
pub const NONCE_LEN: usize = <Aes256Gcm as AeadCore>::NonceSize::USIZE;

/// Authentication tag length appended by the cipher
pub const TAG_LEN: usize = <Aes256Gcm as AeadCore>::TagSize::USIZE;

/// Length of the per-seal salt prepended to the plaintext
pub const OPERATION_SALT_LEN: usize = 16;

/// Random bytes mixed into the sealed payload ahead of the plaintext
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSalt([u8; OPERATION_SALT_LEN]);

impl OperationSalt {
    /// Draw a fresh salt from `source`
    pub fn generate(source: &dyn RandomSource) -> KeysealResult<Self> {
        let mut salt = [0u8; OPERATION_SALT_LEN];
        source.fill(&mut salt)?;
        Ok(Self(salt))
    }

    pub fn as_bytes(&self) -> &[u8; OPERATION_SALT_LEN] {
        &self.0
    }
}

/// A sealed, base64-encoded ciphertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope(String);

impl Envelope {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Envelope {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn build_cipher(key: &MasterKey) -> KeysealResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| KeysealError::KeySetup(format!("Failed to create cipher: {}", e)))
}

/// Seal `plaintext` under `key` using the OS random source
pub fn seal(plaintext: &str, key: &MasterKey) -> KeysealResult<Envelope> {
    seal_with(plaintext, key, &OsRandom)
}

/// Seal `plaintext` under `key`, drawing the operation salt and then the
/// nonce from `source`
pub fn seal_with(
    plaintext: &str,
    key: &MasterKey,
    source: &dyn RandomSource,
) -> KeysealResult<Envelope> {
    let salt = OperationSalt::generate(source)?;
    let cipher = build_cipher(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    source.fill(&mut nonce_bytes)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let mut payload = Zeroizing::new(Vec::with_capacity(OPERATION_SALT_LEN + plaintext.len()));
    payload.extend_from_slice(salt.as_bytes());
    payload.extend_from_slice(plaintext.as_bytes());

    let ciphertext = cipher
        .encrypt(nonce, payload.as_slice())
        .map_err(|e| KeysealError::KeySetup(format!("Encryption failed: {}", e)))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);

    tracing::debug!(
        plaintext_len = plaintext.len(),
        sealed_len = sealed.len(),
        "sealed envelope"
    );
    Ok(Envelope(STANDARD.encode(&sealed)))
}

/// Open an envelope and return the plaintext as UTF-8 text
pub fn open(envelope: &str, key: &MasterKey) -> KeysealResult<String> {
    let plaintext = open_bytes(envelope, key)?;
    String::from_utf8(plaintext)
        .map_err(|e| KeysealError::Decode(format!("Invalid UTF-8 in decrypted data: {}", e)))
}

/// Open an envelope and return the raw plaintext bytes
///
/// Nothing from the decrypted buffer is looked at until the tag has verified.
pub fn open_bytes(envelope: &str, key: &MasterKey) -> KeysealResult<Vec<u8>> {
    let sealed = STANDARD
        .decode(envelope)
        .map_err(|e| KeysealError::Decode(format!("Invalid envelope encoding: {}", e)))?;

    let cipher = build_cipher(key)?;

    if sealed.len() < NONCE_LEN {
        return Err(KeysealError::truncated("nonce", NONCE_LEN, sealed.len()));
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);

    let opened = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| KeysealError::Authentication)?,
    );

    if opened.len() < OPERATION_SALT_LEN {
        return Err(KeysealError::truncated(
            "operation salt",
            OPERATION_SALT_LEN,
            opened.len(),
        ));
    }

    Ok(opened[OPERATION_SALT_LEN..].to_vec())
}
