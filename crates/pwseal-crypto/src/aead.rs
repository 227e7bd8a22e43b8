//! XChaCha20-Poly1305 sealing of the envelope payload
//!
//! The caller supplies the 24-byte nonce block (which doubles as the scrypt
//! salt source) and the envelope header as AAD. Output is
//! `[ciphertext][16-byte Poly1305 tag]`; the nonce is not prepended here
//! because the envelope layout places it between header and ciphertext.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::kdf::DerivedKey;
use crate::NONCE_SIZE;

/// Draw a fresh salt+nonce block from the OS CSPRNG.
///
/// Fallible rather than panicking: a missing entropy source surfaces as an error.
pub fn generate_nonce_block() -> Result<[u8; NONCE_SIZE], rand::Error> {
    let mut block = [0u8; NONCE_SIZE];
    OsRng.try_fill_bytes(&mut block)?;
    Ok(block)
}

/// Encrypt `plaintext` with XChaCha20-Poly1305, authenticating `aad` alongside it.
///
/// Returns: `[ciphertext][16-byte tag]`
pub fn seal(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, chacha20poly1305::Error> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher.encrypt(
        XNonce::from_slice(nonce),
        Payload {
            msg: plaintext,
            aad,
        },
    )
}

/// Decrypt and verify `[ciphertext][16-byte tag]`.
///
/// Fails on a wrong key, any modified byte of ciphertext or tag, a modified
/// `aad`, or input shorter than the tag.
pub fn open(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, chacha20poly1305::Error> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher.decrypt(
        XNonce::from_slice(nonce),
        Payload {
            msg: ciphertext,
            aad,
        },
    )
}
