//! Process configuration: CLI arguments via `structopt`, optionally layered
//! with a `toml` file on disk, following `components/bin`'s `*_file.rs` +
//! `structopt` convention.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use derive_more::From;
use log::LevelFilter;
use serde::Deserialize;
use structopt::StructOpt;

#[derive(Debug, From)]
pub enum ConfigError {
    IoError(io::Error),
    TomlError(toml::de::Error),
    InvalidLogLevel(String),
}

/// oracled: payment-route oracle process.
#[derive(Clone, Debug, StructOpt)]
#[structopt(name = "oracled")]
pub struct Args {
    /// Optional path to a TOML config file; CLI flags below override its
    /// contents when both are supplied.
    #[structopt(parse(from_os_str), long = "config", short = "c")]
    pub config_path: Option<PathBuf>,

    /// Path to the gossip snapshot this process serves from. Loading it is
    /// out of scope for this crate; the embedding process resolves it.
    #[structopt(parse(from_os_str), long = "gossip-store")]
    pub gossip_store_path: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace.
    #[structopt(long = "log-level", default_value = "info")]
    pub log_level: String,
}

/// Optional on-disk defaults, merged under CLI flags.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    gossip_store: Option<PathBuf>,
    log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gossip_store_path: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Config, ConfigError> {
        let file = match &args.config_path {
            Some(path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };

        let gossip_store_path = args.gossip_store_path.or(file.gossip_store);
        let log_level_str = if args.log_level != "info" {
            args.log_level
        } else {
            file.log_level.unwrap_or(args.log_level)
        };
        let log_level = parse_log_level(&log_level_str)?;

        Ok(Config { gossip_store_path, log_level })
    }
}

fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let data = fs::read_to_string(path)?;
    Ok(toml::from_str(&data)?)
}

fn parse_log_level(s: &str) -> Result<LevelFilter, ConfigError> {
    s.parse().map_err(|_| ConfigError::InvalidLogLevel(s.to_string()))
}
