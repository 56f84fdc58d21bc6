// vaxwatch: live vaccine provider availability board
use clap::Parser;
use std::path::Path;

use vaxwatch::cli::{Cli, Commands};
use vaxwatch::commands::watch::WatchArgs;
use vaxwatch::commands::{
    handle_config_action, handle_open_command, handle_show_command, handle_watch_command, resolve_config,
};
use vaxwatch::config::Config;
use vaxwatch::logging::{init_logging, LogTarget};

fn load_config_or_exit(cli: &Cli) -> Config {
    match resolve_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Bare `vaxwatch` opens the dashboard.
    let command = cli.command.clone().unwrap_or(Commands::Watch {
        interval_ms: None,
        alerts: false,
        no_watch_file: false,
    });

    let log_target = match command {
        Commands::Watch { .. } => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    let _log_guard = init_logging(log_target, cli.verbose);

    match command {
        Commands::Watch {
            interval_ms,
            alerts,
            no_watch_file,
        } => {
            let config = load_config_or_exit(&cli);
            handle_watch_command(
                config,
                WatchArgs {
                    interval_ms,
                    alerts,
                    no_watch_file,
                    fast: cli.fast,
                    debug: cli.debug,
                },
            )
            .await?;
        }
        Commands::Show => {
            let config = load_config_or_exit(&cli);
            let loaded = handle_show_command(&config, cli.debug, cli.json, cli.colored).await?;
            if !loaded {
                std::process::exit(1);
            }
        }
        Commands::Open { name } => {
            let config = load_config_or_exit(&cli);
            handle_open_command(&config, name, cli.debug, cli.json).await?;
        }
        Commands::Config { action } => {
            handle_config_action(action, cli.config.as_deref().map(Path::new), cli.json);
        }
    }

    Ok(())
}
