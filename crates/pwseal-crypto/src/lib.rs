//! pwseal-crypto: password-sealed envelopes
//!
//! Pipeline: password → scrypt → (optional) zstd → XChaCha20-Poly1305 → base64
//!
//! Envelope layout (format version 1):
//! ```text
//! [1 byte: format version][1 byte: flags][24 bytes: salt+nonce block][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! salt  = first 8 bytes of the block (scrypt)
//! nonce = the whole block (XChaCha20-Poly1305)
//! AAD   = format version || flags
//! ```
//!
//! The header is authenticated but not encrypted, so neither the version nor
//! the compression flag can be changed without failing the tag check.

pub mod aead;
pub mod codec;
pub mod compress;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod transport;

pub use codec::{
    compress_and_encrypt, compress_and_encrypt_bytes, decrypt, decrypt_bytes, encrypt,
    encrypt_bytes, EnvelopeCodec,
};
pub use compress::{CompressionLevel, CompressionTier};
pub use envelope::{Envelope, Flags, FormatVersion};
pub use error::{DecodeError, EncodeError};
pub use kdf::{derive_key, DerivedKey};
pub use pwseal_core::Alphabet;
pub use transport::TransportCodec;

/// Size of a derived key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit), also the salt+nonce block size
pub const NONCE_SIZE: usize = 24;

/// Size of the scrypt salt, taken from the front of the nonce block
pub const SALT_SIZE: usize = 8;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of the authenticated header (format version + flags)
pub const HEADER_SIZE: usize = 2;
