//! Adaptive zstd compression for envelope payloads
//!
//! Callers pick an effort level on a 1-19 scale. It is bucketed into four
//! tiers, each pinned to one zstd level. Compressed output is only kept when
//! it is strictly smaller than the input, so incompressible data never pays
//! for the attempt.

use std::borrow::Cow;
use std::io::Read;

use pwseal_core::config::{MAX_COMPRESSION_LEVEL, MIN_COMPRESSION_LEVEL};

use crate::error::{DecodeError, EncodeError};

/// A validated compression effort in `1..=19`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub fn new(level: i32) -> Result<Self, EncodeError> {
        let valid = i32::from(MIN_COMPRESSION_LEVEL)..=i32::from(MAX_COMPRESSION_LEVEL);
        if !valid.contains(&level) {
            return Err(EncodeError::InvalidParameter(format!(
                "compression level must be between {MIN_COMPRESSION_LEVEL} and {MAX_COMPRESSION_LEVEL}, got {level}"
            )));
        }
        Ok(Self(level as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn tier(self) -> CompressionTier {
        match self.0 {
            0..=2 => CompressionTier::Fastest,
            3..=6 => CompressionTier::Default,
            7..=10 => CompressionTier::Better,
            _ => CompressionTier::Best,
        }
    }
}

impl TryFrom<i32> for CompressionLevel {
    type Error = EncodeError;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

/// Coarse quality buckets the public scale maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionTier {
    Fastest,
    Default,
    Better,
    Best,
}

impl CompressionTier {
    /// Native zstd level used for this tier
    pub fn zstd_level(self) -> i32 {
        match self {
            Self::Fastest => 1,
            Self::Default => 3,
            Self::Better => 7,
            Self::Best => 11,
        }
    }
}

/// Keep `compressed` only when it is strictly shorter than `original`.
///
/// Returns the payload to encrypt and whether it is the compressed form.
pub fn select_payload(original: &[u8], compressed: Vec<u8>) -> (Cow<'_, [u8]>, bool) {
    if compressed.len() < original.len() {
        (Cow::Owned(compressed), true)
    } else {
        (Cow::Borrowed(original), false)
    }
}

/// Compress `data` at `level`, falling back to the original bytes when that
/// does not make it smaller.
pub fn compress_if_smaller(
    data: &[u8],
    level: CompressionLevel,
) -> Result<(Cow<'_, [u8]>, bool), EncodeError> {
    let tier = level.tier();
    let compressed = zstd::encode_all(data, tier.zstd_level())
        .map_err(|e| EncodeError::Compression(format!("zstd compress: {e}")))?;

    tracing::trace!(
        level = level.get(),
        ?tier,
        original = data.len(),
        compressed = compressed.len(),
        "compression attempted"
    );

    Ok(select_payload(data, compressed))
}

/// Decompress a zstd payload, refusing to produce more than `max_bytes`.
///
/// Every call builds its own decoder; no decompression context is shared.
pub fn decompress(data: &[u8], max_bytes: u64) -> Result<Vec<u8>, DecodeError> {
    let decoder = zstd::stream::read::Decoder::new(data)
        .map_err(|e| DecodeError::DecompressionFailed(format!("zstd decoder: {e}")))?;

    let mut out = Vec::with_capacity(data.len().saturating_mul(2));
    decoder
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::DecompressionFailed(format!("zstd decompress: {e}")))?;

    if out.len() as u64 > max_bytes {
        return Err(DecodeError::DecompressionFailed(format!(
            "decompressed payload exceeds limit of {max_bytes} bytes"
        )));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn level(n: i32) -> CompressionLevel {
        CompressionLevel::new(n).unwrap()
    }

    #[test]
    fn test_level_bounds() {
        assert!(CompressionLevel::new(0).is_err());
        assert!(CompressionLevel::new(20).is_err());
        assert!(CompressionLevel::new(-3).is_err());
        assert_eq!(CompressionLevel::new(1).unwrap().get(), 1);
        assert_eq!(CompressionLevel::try_from(19).unwrap().get(), 19);
    }

    #[test]
    fn test_level_out_of_range_is_invalid_parameter() {
        let err = CompressionLevel::new(42).unwrap_err();
        assert!(matches!(err, EncodeError::InvalidParameter(_)));
    }

    #[test]
    fn test_tier_buckets() {
        assert_eq!(level(1).tier(), CompressionTier::Fastest);
        assert_eq!(level(2).tier(), CompressionTier::Fastest);
        assert_eq!(level(3).tier(), CompressionTier::Default);
        assert_eq!(level(6).tier(), CompressionTier::Default);
        assert_eq!(level(7).tier(), CompressionTier::Better);
        assert_eq!(level(10).tier(), CompressionTier::Better);
        assert_eq!(level(11).tier(), CompressionTier::Best);
        assert_eq!(level(19).tier(), CompressionTier::Best);
    }

    #[test]
    fn test_select_payload_prefers_strictly_smaller() {
        let original = b"abcdef";

        let (payload, compressed) = select_payload(original, b"abc".to_vec());
        assert!(compressed);
        assert_eq!(payload.as_ref(), b"abc");

        let (payload, compressed) = select_payload(original, b"abcdef".to_vec());
        assert!(!compressed, "equal length must keep the original");
        assert_eq!(payload.as_ref(), original);

        let (payload, compressed) = select_payload(original, b"abcdefgh".to_vec());
        assert!(!compressed);
        assert_eq!(payload.as_ref(), original);
    }

    #[test]
    fn test_redundant_data_is_compressed() {
        let data = "the quick brown fox ".repeat(100);
        let (payload, compressed) = compress_if_smaller(data.as_bytes(), level(19)).unwrap();

        assert!(compressed);
        assert!(payload.len() < data.len());
        assert_eq!(decompress(&payload, u64::MAX).unwrap(), data.as_bytes());
    }

    #[test]
    fn test_empty_input_is_not_compressed() {
        let (payload, compressed) = compress_if_smaller(b"", level(5)).unwrap();
        assert!(!compressed, "a zstd frame is never shorter than nothing");
        assert!(payload.is_empty());
    }

    #[test]
    fn test_decompress_enforces_limit() {
        let data = vec![0u8; 10_000];
        let (payload, compressed) = compress_if_smaller(&data, level(3)).unwrap();
        assert!(compressed);

        assert!(decompress(&payload, 10_000).is_ok());
        let err = decompress(&payload, 9_999).unwrap_err();
        assert!(matches!(err, DecodeError::DecompressionFailed(_)));
    }

    #[test]
    fn test_decompress_garbage_fails_closed() {
        let err = decompress(b"definitely not a zstd frame", u64::MAX).unwrap_err();
        assert!(matches!(err, DecodeError::DecompressionFailed(_)));
    }

    proptest! {
        #[test]
        fn compress_never_grows_payload(
            data in proptest::collection::vec(any::<u8>(), 0..=4096),
            lvl in 1i32..=19,
        ) {
            let (payload, compressed) = compress_if_smaller(&data, level(lvl)).unwrap();
            prop_assert!(payload.len() <= data.len());
            if compressed {
                prop_assert_eq!(decompress(&payload, u64::MAX).unwrap(), data);
            } else {
                prop_assert_eq!(payload.as_ref(), data.as_slice());
            }
        }
    }
}
