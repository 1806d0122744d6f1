//! Custom error types for keyseal
//!
//! Every failure in the crypto core maps to exactly one variant here. The file
//! and settings layers add `Io` and `Config` on top.

use thiserror::Error;

/// The main error type for keyseal operations
#[derive(Error, Debug)]
pub enum KeysealError {
    /// The secure random source could not produce bytes
    #[error("Random source error: {0}")]
    RandomSource(String),

    /// Key material has the wrong length or was rejected by the cipher
    #[error("Key setup error: {0}")]
    KeySetup(String),

    /// Base64 or hex text is malformed
    #[error("Decode error: {0}")]
    Decode(String),

    /// A key file is missing its expected structure
    #[error("Format error: {0}")]
    Format(String),

    /// A decoded buffer is shorter than a fixed-size field it must contain
    #[error("Truncated input: {field} needs {expected} bytes, got {actual}")]
    TruncatedInput {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Tag verification failed. Carries no detail on purpose: a wrong key and
    /// corrupted data must look the same from outside.
    #[error("decryption failed")]
    Authentication,

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input handed over by the command line layer
    #[error("Validation error: {0}")]
    Validation(String),
}

impl KeysealError {
    /// Create a truncated-input error for a named field
    pub fn truncated(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::TruncatedInput {
            field,
            expected,
            actual,
        }
    }

    /// Check if this is an authentication failure
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }

    /// Check if this is a truncated-input error
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }
}

impl From<std::io::Error> for KeysealError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KeysealError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for keyseal operations
pub type KeysealResult<T> = Result<T, KeysealError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_message_is_opaque() {
        let err = KeysealError::Authentication;
        assert_eq!(err.to_string(), "decryption failed");
        assert!(err.is_authentication());
    }

    #[test]
    fn test_truncated_display() {
        let err = KeysealError::truncated("nonce", 12, 3);
        assert_eq!(err.to_string(), "Truncated input: nonce needs 12 bytes, got 3");
        assert!(err.is_truncated());
        assert!(!err.is_authentication());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KeysealError = io_err.into();
        assert!(matches!(err, KeysealError::Io(_)));
    }
}
