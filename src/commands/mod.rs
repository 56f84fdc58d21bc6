// Command handlers module
pub mod config;
pub mod open;
pub mod show;
pub mod watch;

pub use config::handle_config_action;
pub use open::handle_open_command;
pub use show::handle_show_command;
pub use watch::handle_watch_command;

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use crate::cli::Cli;
use crate::config::Config;
use crate::store::StatusSource;

/// Load config from `--config` or the default path and apply global CLI
/// overrides. Overrides are never written back.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref().map(Path::new))?;
    if let Some(ref source) = cli.source {
        config.source.location = source.clone();
    }
    Ok(config)
}

pub fn build_source(config: &Config) -> Result<StatusSource> {
    StatusSource::from_location(
        &config.source.location,
        Duration::from_secs(config.source.request_timeout_secs),
    )
}
