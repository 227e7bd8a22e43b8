//! pwseal: password envelope CLI
//!
//! Commands:
//!   encrypt      - seal a file (or stdin) into a base64 envelope
//!   decrypt      - open an envelope back into the original bytes
//!   inspect      - show envelope header fields without a password
//!   config show  - display the effective configuration
//!
//! The password comes from PWSEAL_PASSWORD or an interactive prompt.
//! Logs go to stderr; stdout carries only envelope or plaintext data.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::{ExposeSecret, SecretString};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use pwseal_core::{Alphabet, LogFormat, PwsealConfig};
use pwseal_crypto::{CompressionLevel, Envelope, EnvelopeCodec, TransportCodec};

const PASSWORD_ENV: &str = "PWSEAL_PASSWORD";

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "pwseal",
    version,
    about = "Password-sealed, optionally compressed envelopes"
)]
struct Cli {
    /// Path to pwseal.toml configuration file
    #[arg(long, short = 'c', env = "PWSEAL_CONFIG", default_value = "pwseal.toml")]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, env = "PWSEAL_LOG")]
    log: Option<String>,

    /// Log format override
    #[arg(long, env = "PWSEAL_LOG_FORMAT")]
    log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum LogFormatArg {
    Json,
    Text,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Text => LogFormat::Text,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file or stdin into an envelope
    Encrypt {
        /// Input file (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Compression level 1-19 (overrides config; compression is kept only if it helps)
        #[arg(long, short = 'l', value_parser = clap::value_parser!(i32).range(1..=19))]
        level: Option<i32>,
        /// Disable compression even if the config sets a level
        #[arg(long, conflicts_with = "level")]
        no_compress: bool,
        /// Use the URL-safe base64 alphabet
        #[arg(long)]
        url_safe: bool,
    },

    /// Decrypt an envelope from a file or stdin
    Decrypt {
        /// Input file (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Envelope uses the URL-safe base64 alphabet
        #[arg(long)]
        url_safe: bool,
    },

    /// Show envelope header fields (no password needed)
    Inspect {
        /// Input file (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Envelope uses the URL-safe base64 alphabet
        #[arg(long)]
        url_safe: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
}

// ── Entry point ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = PwsealConfig::load(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;

    let level = cli.log.as_deref().unwrap_or(&config.logging.level);
    let format = cli
        .log_format
        .map(LogFormat::from)
        .unwrap_or(config.logging.format);
    init_logging(level, format);

    match cli.command {
        Commands::Encrypt {
            input,
            output,
            level,
            no_compress,
            url_safe,
        } => {
            let codec = build_codec(&config, url_safe)?;
            let level = resolve_level(level, no_compress, config.codec.compression_level)?;
            let plaintext = read_input(input.as_deref())?;
            let password = read_password(true)?;

            let envelope = codec
                .encode(&password, &plaintext, level)
                .context("encryption failed")?;
            info!(
                input_len = plaintext.len(),
                output_len = envelope.len(),
                "encrypted"
            );

            let mut text = envelope.into_bytes();
            text.push(b'\n');
            write_output(output.as_deref(), &text)
        }
        Commands::Decrypt {
            input,
            output,
            url_safe,
        } => {
            let codec = build_codec(&config, url_safe)?;
            let text = read_input_text(input.as_deref())?;
            let password = read_password(false)?;

            let plaintext = codec
                .decode(&password, &text)
                .context("decryption failed")?;
            info!(output_len = plaintext.len(), "decrypted");

            write_output(output.as_deref(), &plaintext)
        }
        Commands::Inspect { input, url_safe } => {
            let codec = build_codec(&config, url_safe)?;
            let text = read_input_text(input.as_deref())?;
            print!("{}", inspect(&TransportCodec::new(codec.alphabet()), &text)?);
            Ok(())
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            let rendered = toml::to_string_pretty(&config).context("serializing config")?;
            print!("{rendered}");
            Ok(())
        }
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────────

fn build_codec(config: &PwsealConfig, url_safe: bool) -> Result<EnvelopeCodec> {
    let codec = EnvelopeCodec::from_config(&config.codec).context("invalid codec config")?;
    Ok(if url_safe {
        codec.with_alphabet(Alphabet::UrlSafe)
    } else {
        codec
    })
}

/// Flag beats config; `--no-compress` beats both.
fn resolve_level(
    flag: Option<i32>,
    no_compress: bool,
    configured: Option<u8>,
) -> Result<Option<CompressionLevel>> {
    if no_compress {
        return Ok(None);
    }
    flag.or(configured.map(i32::from))
        .map(CompressionLevel::new)
        .transpose()
        .context("invalid compression level")
}

fn read_password(confirm: bool) -> Result<SecretString> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(password));
    }

    let password = SecretString::from(
        rpassword::prompt_password("Password: ").context("reading password")?,
    );
    if confirm {
        let again = SecretString::from(
            rpassword::prompt_password("Confirm password: ").context("reading password")?,
        );
        if password.expose_secret() != again.expose_secret() {
            anyhow::bail!("passwords do not match");
        }
    }
    Ok(password)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn read_input_text(path: Option<&Path>) -> Result<String> {
    let bytes = read_input(path)?;
    String::from_utf8(bytes).context("envelope is not valid UTF-8 text")
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, data).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data).context("writing stdout")?;
            stdout.flush().context("flushing stdout")
        }
    }
}

/// Render the header of an envelope without deriving any key.
fn inspect(transport: &TransportCodec, text: &str) -> Result<String> {
    let bytes = transport.decode(text).context("decoding envelope text")?;
    let envelope = Envelope::parse(&bytes).context("parsing envelope")?;

    Ok(format!(
        "format version: {}\ncompressed:     {}\nflags:          {:#04x}\nenvelope bytes: {}\nsealed bytes:   {}\n",
        envelope.version.as_byte(),
        envelope.flags.compressed(),
        envelope.flags.bits(),
        bytes.len(),
        envelope.ciphertext.len(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encrypt_args() {
        let cli = Cli::try_parse_from([
            "pwseal", "encrypt", "-i", "in.txt", "-o", "out.txt", "-l", "19", "--url-safe",
        ])
        .unwrap();

        match cli.command {
            Commands::Encrypt {
                input,
                output,
                level,
                no_compress,
                url_safe,
            } => {
                assert_eq!(input, Some(PathBuf::from("in.txt")));
                assert_eq!(output, Some(PathBuf::from("out.txt")));
                assert_eq!(level, Some(19));
                assert!(!no_compress);
                assert!(url_safe);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_level_out_of_range_rejected_by_parser() {
        assert!(Cli::try_parse_from(["pwseal", "encrypt", "-l", "0"]).is_err());
        assert!(Cli::try_parse_from(["pwseal", "encrypt", "-l", "20"]).is_err());
    }

    #[test]
    fn test_no_compress_conflicts_with_level() {
        assert!(Cli::try_parse_from(["pwseal", "encrypt", "-l", "3", "--no-compress"]).is_err());
    }

    #[test]
    fn test_resolve_level_precedence() {
        assert_eq!(resolve_level(None, false, None).unwrap(), None);
        assert_eq!(
            resolve_level(None, false, Some(5)).unwrap().map(CompressionLevel::get),
            Some(5)
        );
        assert_eq!(
            resolve_level(Some(12), false, Some(5))
                .unwrap()
                .map(CompressionLevel::get),
            Some(12)
        );
        assert_eq!(resolve_level(None, true, Some(5)).unwrap(), None);
        assert!(resolve_level(None, false, Some(42)).is_err());
    }

    #[test]
    fn test_build_codec_url_safe_override() {
        let config = PwsealConfig::default();
        assert_eq!(
            build_codec(&config, false).unwrap().alphabet(),
            Alphabet::Standard
        );
        assert_eq!(
            build_codec(&config, true).unwrap().alphabet(),
            Alphabet::UrlSafe
        );
    }

    #[test]
    fn test_file_roundtrip_through_helpers() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("plain.txt");
        let sealed = tmp.path().join("sealed.txt");
        let opened = tmp.path().join("opened.txt");
        let original = "one more time, one more time, one more time".repeat(20);
        std::fs::write(&src, &original).unwrap();

        let codec = build_codec(&PwsealConfig::default(), true).unwrap();
        let password = SecretString::from("file-password");

        let plaintext = read_input(Some(&src)).unwrap();
        let envelope = codec
            .encode(&password, &plaintext, resolve_level(Some(19), false, None).unwrap())
            .unwrap();
        write_output(Some(&sealed), format!("{envelope}\n").as_bytes()).unwrap();

        let text = read_input_text(Some(&sealed)).unwrap();
        let report = inspect(&TransportCodec::new(Alphabet::UrlSafe), &text).unwrap();
        assert!(report.contains("format version: 1"));
        assert!(report.contains("compressed:     true"));

        let decrypted = codec.decode(&password, &text).unwrap();
        write_output(Some(&opened), &decrypted).unwrap();
        assert_eq!(std::fs::read_to_string(&opened).unwrap(), original);
    }

    #[test]
    fn test_inspect_rejects_short_input() {
        let transport = TransportCodec::default();
        assert!(inspect(&transport, "AQA=").is_err());
    }
}
