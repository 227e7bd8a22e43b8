//! Binary envelope layout and header parsing
//!
//! ```text
//! offset 0    format version (1 byte)
//! offset 1    flags (1 byte, bit 0 = payload is zstd-compressed)
//! offset 2    salt+nonce block (24 bytes, salt = first 8 bytes)
//! offset 26   XChaCha20-Poly1305 ciphertext + tag
//! ```
//!
//! Parsing here never touches the key: version and length checks happen
//! before any scrypt work is spent on the input.

use crate::error::DecodeError;
use crate::kdf::{ScryptCost, SCRYPT_COST_V1};
use crate::{HEADER_SIZE, NONCE_SIZE, SALT_SIZE};

/// Smallest byte length that can hold a header and a nonce block
pub const MIN_ENVELOPE_SIZE: usize = HEADER_SIZE + NONCE_SIZE;

/// The scrypt salt is the leading `SALT_SIZE` bytes of the nonce block.
pub fn salt_from_nonce(nonce: &[u8; NONCE_SIZE]) -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&nonce[..SALT_SIZE]);
    salt
}

/// Envelope format versions this build can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FormatVersion {
    /// scrypt(N=1024, r=8, p=1) + XChaCha20-Poly1305 + optional zstd
    V1 = 1,
}

impl FormatVersion {
    /// Version written by the encoder
    pub const CURRENT: Self = Self::V1;

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// KDF cost bound to this version
    pub fn kdf_cost(self) -> ScryptCost {
        match self {
            Self::V1 => SCRYPT_COST_V1,
        }
    }
}

impl TryFrom<u8> for FormatVersion {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            1 => Ok(Self::V1),
            other => Err(other),
        }
    }
}

/// Envelope flag byte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags(u8);

impl Flags {
    pub const COMPRESSED: u8 = 0b0000_0001;
    /// Bits no writer of this version sets
    pub const RESERVED: u8 = !Self::COMPRESSED;

    pub fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn compressed(self) -> bool {
        self.0 & Self::COMPRESSED != 0
    }

    pub fn with_compressed(self, compressed: bool) -> Self {
        if compressed {
            Self(self.0 | Self::COMPRESSED)
        } else {
            Self(self.0 & !Self::COMPRESSED)
        }
    }

    pub fn has_reserved_bits(self) -> bool {
        self.0 & Self::RESERVED != 0
    }
}

/// A parsed (or about-to-be-serialized) envelope, borrowing its ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    pub version: FormatVersion,
    pub flags: Flags,
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// The authenticated header: `[version, flags]`, used as AEAD associated data.
    pub fn header(&self) -> [u8; HEADER_SIZE] {
        [self.version.as_byte(), self.flags.bits()]
    }

    /// scrypt salt: the leading bytes of the nonce block
    pub fn salt(&self) -> [u8; SALT_SIZE] {
        salt_from_nonce(&self.nonce)
    }

    /// Split raw envelope bytes into their parts.
    ///
    /// Fails with `Truncated` below the minimum size and with
    /// `UnsupportedFormat` for an unknown version byte.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        if bytes.len() < MIN_ENVELOPE_SIZE {
            return Err(DecodeError::Truncated {
                len: bytes.len(),
                min: MIN_ENVELOPE_SIZE,
            });
        }

        let version =
            FormatVersion::try_from(bytes[0]).map_err(|version| DecodeError::UnsupportedFormat {
                version,
                flags: bytes[1],
            })?;
        let flags = Flags::from_byte(bytes[1]);

        let (nonce_bytes, ciphertext) = bytes[HEADER_SIZE..].split_at(NONCE_SIZE);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            version,
            flags,
            nonce,
            ciphertext,
        })
    }

    /// Serialize as `header || nonce block || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_ENVELOPE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.header());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(self.ciphertext);
        out
    }
}
