use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PwsealError, PwsealResult};

/// Lowest accepted compression effort
pub const MIN_COMPRESSION_LEVEL: u8 = 1;

/// Highest accepted compression effort
pub const MAX_COMPRESSION_LEVEL: u8 = 19;

/// Default cap on decompressed payload size (256 MiB)
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: u64 = 256 * 1024 * 1024;

/// Top-level configuration (loaded from pwseal.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PwsealConfig {
    pub codec: CodecConfig,
    pub logging: LoggingConfig,
}

impl PwsealConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> PwsealResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.codec.validate()?;
        Ok(config)
    }
}

/// Base64 alphabet used for the text form of an envelope.
///
/// Not recorded in the envelope: the reader has to know which one the writer used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alphabet {
    #[default]
    Standard,
    UrlSafe,
}

/// Envelope codec settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Transport alphabet (default: standard)
    pub alphabet: Alphabet,
    /// Default compression level for callers that do not pick one (1-19, unset = no compression)
    pub compression_level: Option<u8>,
    /// Upper bound on decompressed payload size in bytes
    pub max_decompressed_bytes: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::Standard,
            compression_level: None,
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}

impl CodecConfig {
    pub fn validate(&self) -> PwsealResult<()> {
        if let Some(level) = self.compression_level {
            if !(MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&level) {
                return Err(PwsealError::Config(format!(
                    "codec.compression_level must be between {MIN_COMPRESSION_LEVEL} and {MAX_COMPRESSION_LEVEL}, got {level}"
                )));
            }
        }
        if self.max_decompressed_bytes == 0 {
            return Err(PwsealError::Config(
                "codec.max_decompressed_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}
