use std::time::Duration;

use crate::commands::build_source;
use crate::config::Config;
use crate::watch::{WatchMode, WatchOptions};

pub struct WatchArgs {
    pub interval_ms: Option<u64>,
    pub alerts: bool,
    pub no_watch_file: bool,
    pub fast: bool,
    pub debug: bool,
}

pub fn watch_options(config: &Config, args: &WatchArgs) -> WatchOptions {
    let mut options = WatchOptions::from_config(config, args.fast, args.debug);
    if let Some(ms) = args.interval_ms {
        options.interval = Duration::from_millis(ms.max(1));
    }
    if args.alerts {
        options.alerts_enabled = true;
    }
    if args.no_watch_file {
        options.watch_file = false;
    }
    options
}

pub async fn handle_watch_command(config: Config, args: WatchArgs) -> anyhow::Result<()> {
    let source = build_source(&config)?;
    let options = watch_options(&config, &args);

    tracing::info!(
        source = %source.location(),
        interval_ms = options.interval.as_millis() as u64,
        alerts = options.alerts_enabled,
        debug = options.debug,
        "starting watch mode"
    );

    let watch_mode = WatchMode::new(&config, source, options)?;
    watch_mode.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> WatchArgs {
        WatchArgs {
            interval_ms: None,
            alerts: false,
            no_watch_file: false,
            fast: false,
            debug: false,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        let options = watch_options(
            &config,
            &WatchArgs {
                interval_ms: Some(2500),
                alerts: true,
                no_watch_file: true,
                ..args()
            },
        );
        assert_eq!(options.interval, Duration::from_millis(2500));
        assert!(options.alerts_enabled);
        assert!(!options.watch_file);
    }

    #[test]
    fn test_defaults_come_from_config() {
        let mut config = Config::default();
        config.alerts.start_enabled = true;
        let options = watch_options(&config, &args());
        assert_eq!(options.interval, Duration::from_millis(5000));
        assert!(options.alerts_enabled);
        assert!(options.watch_file);
    }

    #[test]
    fn test_explicit_interval_beats_fast() {
        let config = Config::default();
        let options = watch_options(
            &config,
            &WatchArgs {
                interval_ms: Some(300),
                fast: true,
                ..args()
            },
        );
        assert_eq!(options.interval, Duration::from_millis(300));
    }
}
