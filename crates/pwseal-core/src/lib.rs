pub mod config;
pub mod error;

pub use config::{Alphabet, CodecConfig, LogFormat, LoggingConfig, PwsealConfig};
pub use error::{PwsealError, PwsealResult};
