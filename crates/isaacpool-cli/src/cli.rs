use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::logging::LogLevel;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Hexadecimal (lowercase)
    Hex,
    /// Raw binary bytes
    Raw,
    /// Base64 (standard, with padding)
    Base64,
}

#[derive(Debug, Args)]
pub struct StateArgs {
    /// State file to resume from and persist to
    #[arg(long = "state", default_value = "./.isaacrngstate")]
    pub state: String,

    /// 32-byte encryption key as 64 hex digits
    #[arg(long = "key-hex", conflicts_with = "key_file")]
    pub key_hex: Option<String>,

    /// File containing the raw 32-byte encryption key
    #[arg(long = "key-file")]
    pub key_file: Option<PathBuf>,
}

#[derive(Debug, Parser)]
#[command(name = "isaacpool")]
#[command(about = "Seeded ISAAC random pool with encrypted state persistence")]
#[command(version = isaacpool_core::VERSION)]
pub struct Cli {
    /// Log level
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate random bytes, seeding the pool first if no usable state exists
    Generate(GenerateArgs),
    /// Report state-file status, entropy strength, and the last seed summary
    Status(StatusArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Number of random bytes to generate
    #[arg(short = 'n', long = "bytes", default_value_t = 32)]
    pub bytes: usize,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Hex)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// Entropy mining multiplier (exponent of 2) used when seeding
    #[arg(short = 'm', long = "multiplier", default_value_t = 0)]
    pub multiplier: u32,

    /// Discard any saved state and reseed from fresh entropy
    #[arg(long)]
    pub reseed: bool,

    #[command(flatten)]
    pub state: StateArgs,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub state: StateArgs,
}

/// Resolve the key from `--key-hex` / `--key-file`; empty means no
/// encryption.
pub fn resolve_key(args: &StateArgs) -> Result<Vec<u8>, String> {
    if let Some(hex) = &args.key_hex {
        return parse_hex_key(hex);
    }
    if let Some(path) = &args.key_file {
        return std::fs::read(path).map_err(|e| format!("cannot read key file: {e}"));
    }
    Ok(Vec::new())
}

fn parse_hex_key(hex: &str) -> Result<Vec<u8>, String> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err("key hex must have an even number of digits".into());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("bad hex digits at offset {i}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_key_round_trip() {
        let key = parse_hex_key("00ff10a5").unwrap();
        assert_eq!(key, vec![0x00, 0xff, 0x10, 0xa5]);
    }

    #[test]
    fn parse_hex_key_rejects_odd_length() {
        assert!(parse_hex_key("abc").is_err());
    }

    #[test]
    fn parse_hex_key_rejects_non_hex() {
        assert!(parse_hex_key("zz").is_err());
    }

    #[test]
    fn empty_state_args_mean_no_key() {
        let args = StateArgs {
            state: "./.isaacrngstate".into(),
            key_hex: None,
            key_file: None,
        };
        assert!(resolve_key(&args).unwrap().is_empty());
    }
}
