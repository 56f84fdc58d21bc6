use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "vaxwatch")]
#[command(about = "Live view of vaccine provider availability")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Override the status source (path to status.json or an http(s) URL)
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Show raw source data and the collector's test provider
    #[arg(long, global = true)]
    pub debug: bool,

    /// Refresh at the fast debug cadence
    #[arg(long, global = true)]
    pub fast: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON output format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable colorized table output
    #[arg(long, global = true)]
    pub colored: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize fresh configuration
    Init,
    /// Set configuration value
    Set {
        /// Configuration key (e.g., refresh.interval_ms)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Live status dashboard (default)
    Watch {
        /// Refresh interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Start with status-change alerts switched on
        #[arg(long)]
        alerts: bool,

        /// Don't refresh early when a local status file changes
        #[arg(long)]
        no_watch_file: bool,
    },

    /// Load the status once and print it
    Show,

    /// Open provider sites in the browser
    Open {
        /// Provider to open; all visible providers when omitted
        #[arg(long)]
        name: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["vaxwatch"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vaxwatch", "show", "--json", "--source", "https://x/status.json"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Show));
        assert!(cli.json);
        assert_eq!(cli.source.as_deref(), Some("https://x/status.json"));
    }

    #[test]
    fn test_watch_flags() {
        let cli = Cli::try_parse_from(["vaxwatch", "--fast", "watch", "--alerts", "--interval-ms", "2000"]).unwrap();
        assert!(cli.fast);
        assert_eq!(
            cli.command,
            Some(Commands::Watch {
                interval_ms: Some(2000),
                alerts: true,
                no_watch_file: false,
            })
        );
    }

    #[test]
    fn test_config_set() {
        let cli = Cli::try_parse_from(["vaxwatch", "config", "set", "refresh.interval_ms", "3000"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Set {
                    key: "refresh.interval_ms".into(),
                    value: "3000".into(),
                }
            })
        );
    }
}
