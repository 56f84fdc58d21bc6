// Tracing setup. The dashboard owns the terminal, so watch mode logs to a
// rolling file; one-shot commands log to stderr.
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "vaxwatch=debug" } else { "vaxwatch=info" }
}

/// Daily-rotated log directory under the platform data dir.
pub fn logs_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("vaxwatch").join("logs"))
}

/// Install the global subscriber. Hold the returned guard until exit so the
/// background writer flushes.
pub fn init_logging(target: LogTarget, verbose: bool) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    if target == LogTarget::File {
        if let Some(log_dir) = logs_dir() {
            if std::fs::create_dir_all(&log_dir).is_ok() {
                let file_appender = RollingFileAppender::builder()
                    .rotation(Rotation::DAILY)
                    .max_log_files(5)
                    .filename_prefix("vaxwatch")
                    .filename_suffix("log")
                    .build(&log_dir)
                    .ok();

                if let Some(appender) = file_appender {
                    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                        .init();
                    return Some(guard);
                }
            }
        }

        // No writable log dir: stay silent rather than draw over the dashboard.
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::sink))
            .init();
        return None;
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "vaxwatch=info");
        assert_eq!(default_directive(true), "vaxwatch=debug");
        assert!(default_directive(true).parse::<tracing_subscriber::filter::Directive>().is_ok());
    }

    #[test]
    fn test_logs_dir_is_namespaced() {
        if let Some(dir) = logs_dir() {
            assert!(dir.ends_with("vaxwatch/logs"));
        }
    }
}
