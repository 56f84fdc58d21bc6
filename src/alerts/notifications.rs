use crate::alerts::tracker::AlertEvent;
use crate::config::AlertsConfig;
use anyhow::{Context, Result};
use notify_rust::{Notification, Timeout};
use std::sync::Arc;

/// Something that can make noise about a status change.
pub trait AlertSink: Send + Sync {
    fn name(&self) -> &'static str;
    fn play(&self, alert: &AlertEvent) -> Result<()>;
}

/// Desktop notification with a sound hint.
pub struct DesktopNotifier {
    sound_name: String,
}

impl DesktopNotifier {
    pub fn new(sound_name: impl Into<String>) -> Self {
        Self {
            sound_name: sound_name.into(),
        }
    }

    pub fn is_available() -> bool {
        #[cfg(target_os = "linux")]
        {
            std::env::var("DISPLAY").is_ok() || std::env::var("WAYLAND_DISPLAY").is_ok()
        }

        #[cfg(any(target_os = "macos", target_os = "windows"))]
        {
            true
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            false
        }
    }
}

impl AlertSink for DesktopNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn play(&self, alert: &AlertEvent) -> Result<()> {
        Notification::new()
            .summary(&alert.title())
            .body(&alert.message())
            .sound_name(&self.sound_name)
            .timeout(Timeout::Milliseconds(8000))
            .appname("vaxwatch")
            .icon("dialog-information")
            .show()
            .context("Failed to show desktop notification")?;
        Ok(())
    }
}

/// Fans alerts out to the configured sinks without blocking the caller.
#[derive(Clone)]
pub struct AlertPlayer {
    sinks: Arc<Vec<Box<dyn AlertSink>>>,
}

impl AlertPlayer {
    pub fn new(sinks: Vec<Box<dyn AlertSink>>) -> Self {
        Self {
            sinks: Arc::new(sinks),
        }
    }

    /// Desktop sinks only. The terminal bell is rung by the dashboard, which
    /// owns the terminal while watch mode runs.
    pub fn from_config(config: &AlertsConfig) -> Self {
        let mut sinks: Vec<Box<dyn AlertSink>> = Vec::new();
        if config.desktop {
            if DesktopNotifier::is_available() {
                sinks.push(Box::new(DesktopNotifier::new(config.sound_name.clone())));
            } else {
                tracing::warn!("desktop alerts requested but no notification service detected");
            }
        }
        Self::new(sinks)
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Play an alert on a blocking worker. Failures are logged and dropped.
    /// Must be called from inside a tokio runtime.
    pub fn fire(&self, alert: AlertEvent) -> tokio::task::JoinHandle<()> {
        let sinks = Arc::clone(&self.sinks);
        tokio::task::spawn_blocking(move || {
            tracing::info!(provider = %alert.name, current = ?alert.current, "status alert");
            for sink in sinks.iter() {
                if let Err(e) = sink.play(&alert) {
                    tracing::warn!(sink = sink.name(), error = %e, "alert playback failed");
                }
            }
        })
    }
}

impl std::fmt::Debug for AlertPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertPlayer")
            .field("sinks", &self.sink_names())
            .finish()
    }
}
