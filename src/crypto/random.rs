//! Random byte sources
//!
//! Key generation and sealing draw all of their randomness through the
//! [`RandomSource`] trait, so production code reads from the operating system
//! while tests can replay a fixed byte script.

use std::sync::Mutex;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{KeysealError, KeysealResult};

/// A thread-safe source of cryptographically secure random bytes
pub trait RandomSource: Send + Sync {
    /// Fill `dest` completely or fail
    fn fill(&self, dest: &mut [u8]) -> KeysealResult<()>;
}

/// The operating system's CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> KeysealResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| KeysealError::RandomSource(format!("OS random source failed: {}", e)))
    }
}

/// Replays a fixed byte script, in order, across successive `fill` calls
///
/// Only meant for deterministic tests. Fails once the script runs out.
#[derive(Debug)]
pub struct ReplayRandom {
    script: Mutex<(Vec<u8>, usize)>,
}

impl ReplayRandom {
    /// Create a source that hands out `bytes` front to back
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            script: Mutex::new((bytes.into(), 0)),
        }
    }

    /// Number of bytes not yet handed out
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .map(|guard| guard.0.len() - guard.1)
            .unwrap_or(0)
    }
}

impl RandomSource for ReplayRandom {
    fn fill(&self, dest: &mut [u8]) -> KeysealResult<()> {
        let mut guard = self
            .script
            .lock()
            .map_err(|_| KeysealError::RandomSource("replay script lock poisoned".to_string()))?;
        let (bytes, pos) = &mut *guard;

        let end = *pos + dest.len();
        if end > bytes.len() {
            return Err(KeysealError::RandomSource(format!(
                "replay script exhausted: wanted {} bytes, {} left",
                dest.len(),
                bytes.len() - *pos
            )));
        }

        dest.copy_from_slice(&bytes[*pos..end]);
        *pos = end;
        Ok(())
    }
}
