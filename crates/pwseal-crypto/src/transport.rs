//! Base64 text transport for envelope bytes

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::engine::GeneralPurpose;
use base64::Engine;
use pwseal_core::Alphabet;

use crate::error::DecodeError;

/// Reversible bytes ↔ text codec with a fixed alphabet.
///
/// Both alphabets are padded. The alphabet is not recorded in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportCodec {
    alphabet: Alphabet,
}

impl TransportCodec {
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet }
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    fn engine(&self) -> &'static GeneralPurpose {
        match self.alphabet {
            Alphabet::Standard => &STANDARD,
            Alphabet::UrlSafe => &URL_SAFE,
        }
    }

    pub fn encode(&self, data: &[u8]) -> String {
        self.engine().encode(data)
    }

    pub fn decode(&self, text: &str) -> Result<Vec<u8>, DecodeError> {
        Ok(self.engine().decode(text.trim())?)
    }
}
