// State that lives for one viewing session: alert memory, rendered view,
// and the last good status set
use chrono::{DateTime, Utc};

use crate::alerts::{AlertEvent, AlertTracker};
use crate::models::StatusSet;
use crate::store::LoadError;
use crate::watch::view::{render, Notice, RenderOptions, View, ViewFrame};

#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub frame: ViewFrame,
    pub alerts: Vec<AlertEvent>,
}

#[derive(Debug, Clone)]
pub struct RefreshSession {
    options: RenderOptions,
    tracker: AlertTracker,
    view: View,
    current: Option<StatusSet>,
    alerts_enabled: bool,
    successful_loads: u64,
    failed_loads: u64,
}

impl RefreshSession {
    pub fn new(options: RenderOptions, alerts_enabled: bool) -> Self {
        Self {
            options,
            tracker: AlertTracker::new(),
            view: View::new(),
            current: None,
            alerts_enabled,
            successful_loads: 0,
            failed_loads: 0,
        }
    }

    /// Run the render pipeline for a finished load.
    ///
    /// On success the tracker sees the visible records, the view is diffed and
    /// any notice is cleared. On failure the view keeps showing the previous
    /// set and only the notice changes.
    pub fn complete(&mut self, result: Result<StatusSet, LoadError>, now: DateTime<Utc>) -> TickOutcome {
        match result {
            Ok(set) => {
                let alerts = self
                    .tracker
                    .observe(set.visible(&self.options.visibility), self.alerts_enabled);
                let updates = self.view.apply(render(&set, &self.options), now);
                self.view.set_notice(None);
                self.current = Some(set);
                self.successful_loads += 1;

                if !updates.is_empty() {
                    tracing::info!(changes = updates.len(), alerts = alerts.len(), "view updated");
                }

                TickOutcome {
                    frame: ViewFrame {
                        updates,
                        last_refreshed: self.view.last_refreshed(),
                        notice: None,
                    },
                    alerts,
                }
            }
            Err(e) => {
                self.failed_loads += 1;
                tracing::warn!(kind = e.kind(), error = %e, "status load failed, keeping last view");

                let notice = if self.current.is_none() {
                    Notice::NotWorking(e.to_string())
                } else {
                    Notice::Stale(e.to_string())
                };
                self.view.set_notice(Some(notice.clone()));

                TickOutcome {
                    frame: ViewFrame {
                        updates: Vec::new(),
                        last_refreshed: self.view.last_refreshed(),
                        notice: Some(notice),
                    },
                    alerts: Vec::new(),
                }
            }
        }
    }

    pub fn alerts_enabled(&self) -> bool {
        self.alerts_enabled
    }

    /// Flip the alert toggle. Nothing fires from the toggle itself.
    pub fn toggle_alerts(&mut self) -> bool {
        self.alerts_enabled = !self.alerts_enabled;
        tracing::info!(enabled = self.alerts_enabled, "alerts toggled");
        self.alerts_enabled
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn successful_loads(&self) -> u64 {
        self.successful_loads
    }

    pub fn failed_loads(&self) -> u64 {
        self.failed_loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StatusRecord, DEFAULT_SENTINEL_NAME};
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_612_200_000 + secs, 0).unwrap()
    }

    fn acme(status: &str) -> StatusSet {
        StatusSet::from_records(vec![StatusRecord::new("Acme", Some(status), "https://a")])
    }

    fn unavailable() -> LoadError {
        LoadError::SourceUnavailable {
            location: "status.json".to_string(),
            reason: "No such file or directory".to_string(),
        }
    }

    #[test]
    fn test_first_failure_shows_not_working() {
        let mut session = RefreshSession::new(RenderOptions::default(), true);
        let outcome = session.complete(Err(unavailable()), t(0));

        assert!(outcome.frame.updates.is_empty());
        assert!(matches!(outcome.frame.notice, Some(Notice::NotWorking(_))));
        assert_eq!(
            session.view().notice().unwrap().message(),
            "Sorry, the site's not working."
        );
    }

    #[test]
    fn test_failure_after_success_keeps_view() {
        let mut session = RefreshSession::new(RenderOptions::default(), true);
        session.complete(Ok(acme("maybe")), t(0));
        let before = session.view().snapshot();

        let outcome = session.complete(Err(unavailable()), t(5));
        assert!(outcome.frame.updates.is_empty());
        assert!(matches!(outcome.frame.notice, Some(Notice::Stale(_))));
        assert_eq!(session.view().snapshot(), before);
        assert_eq!(session.view().last_refreshed(), Some(t(0)));

        // Recovery clears the notice.
        let outcome = session.complete(Ok(acme("maybe")), t(10));
        assert!(outcome.frame.notice.is_none());
        assert!(session.view().notice().is_none());
    }

    #[test]
    fn test_toggle_alone_fires_nothing() {
        let mut session = RefreshSession::new(RenderOptions::default(), false);
        session.complete(Ok(acme("probably")), t(0));

        session.toggle_alerts();
        let outcome = session.complete(Ok(acme("probably")), t(5));
        assert!(outcome.alerts.is_empty());
    }

    #[test]
    fn test_transition_alerts_when_enabled() {
        let mut session = RefreshSession::new(RenderOptions::default(), true);
        session.complete(Ok(acme("probably not")), t(0));
        let outcome = session.complete(Ok(acme("probably")), t(5));
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].name, "Acme");
    }

    #[test]
    fn test_hidden_sentinel_is_not_tracked() {
        let mut session = RefreshSession::new(RenderOptions::new(DEFAULT_SENTINEL_NAME, false), true);
        let sentinel = |status: &str| {
            StatusSet::from_records(vec![StatusRecord::new(DEFAULT_SENTINEL_NAME, Some(status), "https://t")])
        };

        session.complete(Ok(sentinel("probably not")), t(0));
        let outcome = session.complete(Ok(sentinel("probably")), t(5));
        assert!(outcome.alerts.is_empty());
        assert_eq!(session.view().card_count(), 0);
    }
}
