use thiserror::Error;

/// Failures on the encrypt path. None of them leave partial output behind.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("compression failed: {0}")]
    Compression(String),

    #[error("encryption failed: {0}")]
    Encryption(String),
}

/// Failures on the decrypt path. None of them return partial plaintext.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed transport encoding: {0}")]
    MalformedTransport(#[from] base64::DecodeError),

    #[error("envelope truncated: {len} bytes (minimum {min})")]
    Truncated { len: usize, min: usize },

    #[error("unsupported envelope format: version {version}, flags {flags:#04x}")]
    UnsupportedFormat { version: u8, flags: u8 },

    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// Wrong password and tampered data are deliberately indistinguishable.
    #[error("authentication failed: wrong password or corrupted data")]
    AuthenticationFailed,

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

impl DecodeError {
    /// Whether asking the user for a different password could succeed.
    pub fn is_retryable_with_other_password(&self) -> bool {
        matches!(self, Self::AuthenticationFailed)
    }
}
