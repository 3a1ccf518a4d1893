#[macro_use]
extern crate log;

use std::io;

use structopt::StructOpt;

use oracle::config::{Args, Config, ConfigError};

#[derive(Debug)]
enum OracledError {
    ConfigError(ConfigError),
}

impl From<ConfigError> for OracledError {
    fn from(e: ConfigError) -> Self {
        OracledError::ConfigError(e)
    }
}

fn run() -> Result<(), OracledError> {
    let args = Args::from_args();
    let config = Config::from_args(args)?;

    env_logger::Builder::new().filter_level(config.log_level).init();

    match config.gossip_store_path {
        Some(path) => info!("would load gossip store from {}", path.display()),
        None => warn!("no gossip store configured; run a command surface against an in-memory graph instead"),
    }

    // Wiring a real `GraphView`/`RouteFinder` pair to a JSON-RPC transport
    // is the embedding process's job (out of scope, see SPEC_FULL.md §1).
    io::Write::flush(&mut io::stdout()).ok();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("run() error: {:?}", e);
        std::process::exit(1);
    }
}
