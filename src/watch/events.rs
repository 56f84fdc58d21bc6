// Messages passed between the refresh loop, the dashboard and the file watcher
use crate::alerts::AlertEvent;
use crate::watch::view::{ViewFrame, ViewSurface};
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Refresh loop -> dashboard.
#[derive(Debug, Clone)]
pub enum DashboardMessage {
    Frame(ViewFrame),
    AlertsToggled(bool),
    AlertFired(AlertEvent),
    LoadSkipped,
}

/// Dashboard -> refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    ToggleAlerts,
    RefreshNow,
}

#[derive(Debug, Clone)]
pub enum SourceEvent {
    FileModified(PathBuf),
    FileCreated(PathBuf),
    Error(String),
}

impl SourceEvent {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            SourceEvent::FileModified(path) | SourceEvent::FileCreated(path) => Some(path),
            SourceEvent::Error(_) => None,
        }
    }
}

impl ViewSurface for mpsc::UnboundedSender<DashboardMessage> {
    fn present(&mut self, frame: ViewFrame) -> Result<()> {
        self.send(DashboardMessage::Frame(frame))
            .map_err(|_| anyhow!("dashboard closed"))
    }

    fn alert_fired(&mut self, alert: &AlertEvent) -> Result<()> {
        self.send(DashboardMessage::AlertFired(alert.clone()))
            .map_err(|_| anyhow!("dashboard closed"))
    }

    fn alerts_toggled(&mut self, enabled: bool) -> Result<()> {
        self.send(DashboardMessage::AlertsToggled(enabled))
            .map_err(|_| anyhow!("dashboard closed"))
    }

    fn load_skipped(&mut self) -> Result<()> {
        self.send(DashboardMessage::LoadSkipped)
            .map_err(|_| anyhow!("dashboard closed"))
    }
}
