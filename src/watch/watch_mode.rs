// Live refresh loop and the terminal watch mode built on it
use anyhow::{Context, Result};
use chrono::Utc;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::alerts::AlertPlayer;
use crate::config::Config;
use crate::models::StatusSet;
use crate::store::{LoadError, StatusSource};
use crate::utils::RefreshClock;
use crate::watch::scheduler::{RefreshScheduler, TickDecision};
use crate::watch::session::{RefreshSession, TickOutcome};
use crate::watch::view::{RenderOptions, ViewSurface};
use crate::watch::{Dashboard, DashboardState, FileWatcher, SourceEvent, UserCommand};

type LoadResult = Result<StatusSet, LoadError>;

/// Runtime knobs resolved from config and command-line flags.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub interval: Duration,
    pub alerts_enabled: bool,
    pub debug: bool,
    pub watch_file: bool,
}

impl WatchOptions {
    pub fn from_config(config: &Config, fast: bool, debug: bool) -> Self {
        let interval_ms = if fast {
            config.refresh.fast_interval_ms
        } else {
            config.refresh.interval_ms
        };
        Self {
            interval: Duration::from_millis(interval_ms),
            alerts_enabled: config.alerts.start_enabled,
            debug,
            watch_file: config.refresh.watch_file,
        }
    }
}

/// Owns everything one viewing session needs: the source, the scheduler,
/// the session state and the alert player. Surface-agnostic.
pub struct RefreshLoop {
    source: StatusSource,
    scheduler: RefreshScheduler,
    session: RefreshSession,
    player: AlertPlayer,
}

impl RefreshLoop {
    pub fn new(
        source: StatusSource,
        interval: Duration,
        options: RenderOptions,
        alerts_enabled: bool,
        player: AlertPlayer,
    ) -> Self {
        Self {
            source,
            scheduler: RefreshScheduler::new(interval),
            session: RefreshSession::new(options, alerts_enabled),
            player,
        }
    }

    pub fn session(&self) -> &RefreshSession {
        &self.session
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Tick until `shutdown` resolves, then return its result.
    ///
    /// The first tick fires immediately. Ticks, manual refreshes and file
    /// nudges all go through the scheduler, so a slow source never has more
    /// than one load in flight.
    pub async fn run<S, F>(
        &mut self,
        surface: &mut S,
        mut commands: mpsc::UnboundedReceiver<UserCommand>,
        mut source_events: mpsc::UnboundedReceiver<SourceEvent>,
        shutdown: F,
    ) -> Result<()>
    where
        S: ViewSurface,
        F: Future<Output = Result<()>>,
    {
        let (load_tx, mut load_rx) = mpsc::unbounded_channel::<LoadResult>();
        let mut ticker = tokio::time::interval(self.scheduler.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(
            source = %self.source.location(),
            interval_ms = self.scheduler.interval().as_millis() as u64,
            "refresh loop started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.request_load(&load_tx, surface);
                }

                Some(result) = load_rx.recv() => {
                    self.scheduler.on_load_complete();
                    let outcome = self.session.complete(result, Utc::now());
                    if let Err(e) = self.publish(outcome, surface) {
                        tracing::debug!(error = %e, "surface rejected frame");
                    }
                }

                Some(command) = commands.recv() => {
                    match command {
                        UserCommand::ToggleAlerts => {
                            let enabled = self.session.toggle_alerts();
                            let _ = surface.alerts_toggled(enabled);
                        }
                        UserCommand::RefreshNow => self.request_load(&load_tx, surface),
                    }
                }

                Some(event) = source_events.recv() => {
                    match event {
                        SourceEvent::FileModified(path) | SourceEvent::FileCreated(path) => {
                            tracing::debug!(path = %path.display(), "status file changed");
                            self.request_load(&load_tx, surface);
                        }
                        SourceEvent::Error(err) => {
                            tracing::warn!(error = %err, "file watcher error");
                        }
                    }
                }

                result = &mut shutdown => {
                    tracing::info!(
                        loads = self.session.successful_loads(),
                        failures = self.session.failed_loads(),
                        skipped = self.scheduler.ticks_skipped(),
                        "refresh loop stopped"
                    );
                    return result;
                }
            }
        }
    }

    fn request_load<S: ViewSurface>(&mut self, load_tx: &mpsc::UnboundedSender<LoadResult>, surface: &mut S) {
        match self.scheduler.on_tick() {
            TickDecision::StartLoad => {
                let source = self.source.clone();
                let tx = load_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(source.load().await);
                });
            }
            TickDecision::Skip => {
                let _ = surface.load_skipped();
            }
        }
    }

    fn publish<S: ViewSurface>(&self, outcome: TickOutcome, surface: &mut S) -> Result<()> {
        for alert in outcome.alerts {
            surface.alert_fired(&alert)?;
            self.player.fire(alert);
        }
        surface.present(outcome.frame)
    }
}

pub struct WatchMode {
    refresh: RefreshLoop,
    dashboard_state: DashboardState,
    watch_path: Option<PathBuf>,
}

impl WatchMode {
    pub fn new(config: &Config, source: StatusSource, options: WatchOptions) -> Result<Self> {
        let clock = RefreshClock::new(&config.display.timezone, &config.display.time_format)?;
        let render_options = RenderOptions::new(&config.display.sentinel_name, options.debug);
        let player = AlertPlayer::from_config(&config.alerts);

        let watch_path = if options.watch_file {
            source.local_path().map(|p| p.to_path_buf())
        } else {
            None
        };

        let dashboard_state = DashboardState::new(
            config.display.site_title.clone(),
            options.interval,
            clock,
            options.alerts_enabled,
            options.debug,
        )
        .with_bell(config.alerts.bell);

        Ok(WatchMode {
            refresh: RefreshLoop::new(source, options.interval, render_options, options.alerts_enabled, player),
            dashboard_state,
            watch_path,
        })
    }

    pub async fn run(self) -> Result<()> {
        let WatchMode {
            mut refresh,
            dashboard_state,
            watch_path,
        } = self;

        let (mut dashboard_tx, dashboard_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (source_tx, source_rx) = mpsc::unbounded_channel();

        if let Some(path) = watch_path {
            if let Err(e) = start_file_watcher(path, source_tx) {
                tracing::warn!(error = %e, "file watching disabled, relying on the refresh timer");
            }
        }

        let mut dashboard = Dashboard::new(dashboard_state).context("Failed to start terminal dashboard")?;
        let dashboard_task = tokio::spawn(async move { dashboard.run(dashboard_rx, command_tx).await });

        let shutdown = async move {
            match dashboard_task.await {
                Ok(result) => result,
                Err(e) => Err(anyhow::anyhow!("Dashboard task panicked: {}", e)),
            }
        };

        refresh.run(&mut dashboard_tx, command_rx, source_rx, shutdown).await
    }
}

fn start_file_watcher(path: PathBuf, source_tx: mpsc::UnboundedSender<SourceEvent>) -> Result<()> {
    let (file_watcher, file_receiver) = FileWatcher::new(&path, source_tx.clone())?;

    tokio::spawn(async move {
        if let Err(e) = file_watcher.run_with_receiver(file_receiver).await {
            let _ = source_tx.send(SourceEvent::Error(format!("File watcher error: {}", e)));
        }
    });

    Ok(())
}
