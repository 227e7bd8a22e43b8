//! Key derivation: scrypt password → envelope key

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use zeroize::Zeroize;

use crate::{KEY_SIZE, SALT_SIZE};

/// A 256-bit key derived from a password for exactly one encode or decode call.
///
/// Zeroized on drop to prevent secrets lingering in memory.
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// scrypt cost parameters.
///
/// These are part of the envelope format: each format version owns one
/// constant set and they are never read from the envelope or from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptCost {
    /// log2 of the CPU/memory cost N
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelism
    pub p: u32,
}

/// Cost used by format version 1: N = 1024, r = 8, p = 1
pub const SCRYPT_COST_V1: ScryptCost = ScryptCost {
    log_n: 10,
    r: 8,
    p: 1,
};

#[derive(Debug, Error)]
#[error("scrypt: {0}")]
pub struct KdfError(String);

/// Derive a 256-bit key from a password and salt using scrypt.
pub fn derive_key(
    password: &SecretString,
    salt: &[u8; SALT_SIZE],
    cost: &ScryptCost,
) -> Result<DerivedKey, KdfError> {
    let params = scrypt::Params::new(cost.log_n, cost.r, cost.p, KEY_SIZE)
        .map_err(|e| KdfError(format!("invalid params: {e}")))?;

    let mut key = [0u8; KEY_SIZE];
    scrypt::scrypt(
        password.expose_secret().as_bytes(),
        salt,
        &params,
        &mut key,
    )
    .map_err(|e| KdfError(e.to_string()))?;

    Ok(DerivedKey::from_bytes(key))
}
