//! Envelope codec: password + bytes ↔ base64 envelope text
//!
//! Encode order is fixed: random block → scrypt → compress → seal → base64.
//! Decode runs the reverse, with version and length checks done before the
//! KDF so malformed input costs nothing.

use secrecy::SecretString;
use tracing::debug;

use pwseal_core::config::{CodecConfig, DEFAULT_MAX_DECOMPRESSED_BYTES};
use pwseal_core::{Alphabet, PwsealResult};

use crate::compress::{self, CompressionLevel};
use crate::envelope::{salt_from_nonce, Envelope, Flags, FormatVersion};
use crate::error::{DecodeError, EncodeError};
use crate::transport::TransportCodec;
use crate::{aead, kdf};

/// Stateless password envelope codec.
///
/// Holds only configuration, so one instance can be shared freely across
/// threads; every call draws its own randomness, key, and compression context.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeCodec {
    transport: TransportCodec,
    max_decompressed_bytes: u64,
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self {
            transport: TransportCodec::default(),
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}

impl EnvelopeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a codec from validated configuration.
    pub fn from_config(config: &CodecConfig) -> PwsealResult<Self> {
        config.validate()?;
        Ok(Self {
            transport: TransportCodec::new(config.alphabet),
            max_decompressed_bytes: config.max_decompressed_bytes,
        })
    }

    /// Use a different transport alphabet for subsequent calls on this codec.
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.transport = TransportCodec::new(alphabet);
        self
    }

    pub fn with_max_decompressed_bytes(mut self, max_bytes: u64) -> Self {
        self.max_decompressed_bytes = max_bytes;
        self
    }

    pub fn alphabet(&self) -> Alphabet {
        self.transport.alphabet()
    }

    pub fn max_decompressed_bytes(&self) -> u64 {
        self.max_decompressed_bytes
    }

    /// Seal `plaintext` under `password`, compressing first when `level` is
    /// given and compression actually shrinks the payload.
    pub fn encode(
        &self,
        password: &SecretString,
        plaintext: &[u8],
        level: Option<CompressionLevel>,
    ) -> Result<String, EncodeError> {
        let version = FormatVersion::CURRENT;

        let nonce = aead::generate_nonce_block()
            .map_err(|e| EncodeError::RandomnessUnavailable(e.to_string()))?;

        let key = kdf::derive_key(password, &salt_from_nonce(&nonce), &version.kdf_cost())
            .map_err(|e| EncodeError::KeyDerivationFailed(e.to_string()))?;

        // A compressed payload larger than our own decode limit could never be
        // opened again, so such inputs are stored uncompressed.
        let level = level.filter(|_| plaintext.len() as u64 <= self.max_decompressed_bytes);
        let (payload, compressed) = match level {
            Some(level) => compress::compress_if_smaller(plaintext, level)?,
            None => (plaintext.into(), false),
        };
        let flags = Flags::default().with_compressed(compressed);
        let header = [version.as_byte(), flags.bits()];

        let ciphertext = aead::seal(&key, &nonce, &header, &payload)
            .map_err(|e| EncodeError::Encryption(e.to_string()))?;

        let bytes = Envelope {
            version,
            flags,
            nonce,
            ciphertext: &ciphertext,
        }
        .to_bytes();
        debug!(
            version = version.as_byte(),
            compressed,
            plaintext_len = plaintext.len(),
            envelope_len = bytes.len(),
            "envelope sealed"
        );

        Ok(self.transport.encode(&bytes))
    }

    /// Open an envelope produced by [`encode`](Self::encode) with the same
    /// alphabet and return the original bytes.
    pub fn decode(&self, password: &SecretString, text: &str) -> Result<Vec<u8>, DecodeError> {
        let bytes = self.transport.decode(text)?;
        let envelope = Envelope::parse(&bytes)?;

        let key = kdf::derive_key(password, &envelope.salt(), &envelope.version.kdf_cost())
            .map_err(|e| DecodeError::KeyDerivationFailed(e.to_string()))?;

        let payload = aead::open(&key, &envelope.nonce, &envelope.header(), envelope.ciphertext)
            .map_err(|_| DecodeError::AuthenticationFailed)?;

        if envelope.flags.has_reserved_bits() {
            return Err(DecodeError::UnsupportedFormat {
                version: envelope.version.as_byte(),
                flags: envelope.flags.bits(),
            });
        }

        let plaintext = if envelope.flags.compressed() {
            compress::decompress(&payload, self.max_decompressed_bytes)?
        } else {
            payload
        };

        debug!(
            version = envelope.version.as_byte(),
            compressed = envelope.flags.compressed(),
            envelope_len = bytes.len(),
            plaintext_len = plaintext.len(),
            "envelope opened"
        );

        Ok(plaintext)
    }

    pub fn encrypt(&self, password: &SecretString, plaintext: &str) -> Result<String, EncodeError> {
        self.encode(password, plaintext.as_bytes(), None)
    }

    pub fn encrypt_bytes(
        &self,
        password: &SecretString,
        plaintext: &[u8],
    ) -> Result<String, EncodeError> {
        self.encode(password, plaintext, None)
    }

    /// `level` must be in `1..=19`; anything else is `InvalidParameter`.
    pub fn compress_and_encrypt(
        &self,
        password: &SecretString,
        plaintext: &str,
        level: i32,
    ) -> Result<String, EncodeError> {
        self.compress_and_encrypt_bytes(password, plaintext.as_bytes(), level)
    }

    pub fn compress_and_encrypt_bytes(
        &self,
        password: &SecretString,
        plaintext: &[u8],
        level: i32,
    ) -> Result<String, EncodeError> {
        let level = CompressionLevel::new(level)?;
        self.encode(password, plaintext, Some(level))
    }

    /// Decode and interpret the plaintext as UTF-8.
    pub fn decrypt(&self, password: &SecretString, text: &str) -> Result<String, DecodeError> {
        Ok(String::from_utf8(self.decode(password, text)?)?)
    }

    pub fn decrypt_bytes(
        &self,
        password: &SecretString,
        text: &str,
    ) -> Result<Vec<u8>, DecodeError> {
        self.decode(password, text)
    }
}

/// Encrypt a string with the default (standard alphabet) codec, no compression.
pub fn encrypt(password: &SecretString, plaintext: &str) -> Result<String, EncodeError> {
    EnvelopeCodec::default().encrypt(password, plaintext)
}

/// Encrypt bytes with the default codec, no compression.
pub fn encrypt_bytes(password: &SecretString, plaintext: &[u8]) -> Result<String, EncodeError> {
    EnvelopeCodec::default().encrypt_bytes(password, plaintext)
}

/// Compress (when it helps) and encrypt a string with the default codec.
pub fn compress_and_encrypt(
    password: &SecretString,
    plaintext: &str,
    level: i32,
) -> Result<String, EncodeError> {
    EnvelopeCodec::default().compress_and_encrypt(password, plaintext, level)
}

/// Compress (when it helps) and encrypt bytes with the default codec.
pub fn compress_and_encrypt_bytes(
    password: &SecretString,
    plaintext: &[u8],
    level: i32,
) -> Result<String, EncodeError> {
    EnvelopeCodec::default().compress_and_encrypt_bytes(password, plaintext, level)
}

/// Decrypt a standard-alphabet envelope into a string.
pub fn decrypt(password: &SecretString, text: &str) -> Result<String, DecodeError> {
    EnvelopeCodec::default().decrypt(password, text)
}

/// Decrypt a standard-alphabet envelope into bytes.
pub fn decrypt_bytes(password: &SecretString, text: &str) -> Result<Vec<u8>, DecodeError> {
    EnvelopeCodec::default().decrypt_bytes(password, text)
}
