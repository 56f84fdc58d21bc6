// Per-provider status transition tracking for audible alerts
use serde::Serialize;
use std::collections::HashMap;

use crate::models::tier::STATUS_PROBABLY_NOT;
use crate::models::StatusRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertEvent {
    pub name: String,
    pub previous: Option<String>,
    pub current: Option<String>,
    pub url: String,
}

impl AlertEvent {
    pub fn title(&self) -> String {
        format!("{} changed", self.name)
    }

    pub fn message(&self) -> String {
        format!(
            "{} went from '{}' to '{}'. {}",
            self.name,
            self.previous.as_deref().unwrap_or("unknown"),
            self.current.as_deref().unwrap_or("unknown"),
            self.url
        )
    }
}

/// Which status transitions raise an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertRule {
    /// The page's long-standing rule: any change away from the previous
    /// status fires unless the new status is "probably not". A move from
    /// "probably" down to "maybe" therefore alerts as well.
    #[default]
    AnyChangeExceptUnavailable,
}

impl AlertRule {
    pub fn fires(&self, previous: Option<&str>, current: Option<&str>) -> bool {
        match self {
            AlertRule::AnyChangeExceptUnavailable => {
                previous != current && current != Some(STATUS_PROBABLY_NOT)
            }
        }
    }
}

/// Returns true when an observed status should raise an alert. First
/// observations (no previous entry) never alert.
pub fn should_alert(previous: Option<&Option<String>>, current: Option<&str>, enabled: bool) -> bool {
    let Some(previous) = previous else {
        return false;
    };
    enabled && AlertRule::default().fires(previous.as_deref(), current)
}

/// Last observed status per provider name, for the lifetime of a session.
#[derive(Debug, Clone, Default)]
pub struct AlertTracker {
    last_seen: HashMap<String, Option<String>>,
}

impl AlertTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare a fresh batch of records against the last observed statuses.
    ///
    /// The stored status is updated for every record whether or not an alert
    /// fires, so enabling alerts later never replays old transitions.
    pub fn observe<'a, I>(&mut self, records: I, alerts_enabled: bool) -> Vec<AlertEvent>
    where
        I: IntoIterator<Item = &'a StatusRecord>,
    {
        let mut events = Vec::new();

        for record in records {
            let current = record.status.as_deref();
            let previous = self.last_seen.get(&record.name);

            if should_alert(previous, current, alerts_enabled) {
                events.push(AlertEvent {
                    name: record.name.clone(),
                    previous: previous.cloned().flatten(),
                    current: record.status.clone(),
                    url: record.open_url().to_string(),
                });
            }

            self.last_seen
                .insert(record.name.clone(), record.status.clone());
        }

        events
    }

    /// `None` when the name has never been observed.
    pub fn last_status(&self, name: &str) -> Option<Option<&str>> {
        self.last_seen.get(name).map(|s| s.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, status: Option<&str>) -> StatusRecord {
        StatusRecord::new(name, status, format!("https://{}", name.to_lowercase()))
    }

    #[test]
    fn test_first_observation_never_alerts() {
        let mut tracker = AlertTracker::new();
        let events = tracker.observe(&[record("Acme", Some("probably"))], true);
        assert!(events.is_empty());
        assert_eq!(tracker.last_status("Acme"), Some(Some("probably")));
    }

    #[test]
    fn test_transition_fires_exactly_once() {
        let mut tracker = AlertTracker::new();
        tracker.observe(&[record("Acme", Some("probably not"))], true);

        let events = tracker.observe(&[record("Acme", Some("probably"))], true);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Acme");
        assert_eq!(events[0].previous.as_deref(), Some("probably not"));
        assert_eq!(events[0].current.as_deref(), Some("probably"));
        assert_eq!(events[0].url, "https://acme");

        let again = tracker.observe(&[record("Acme", Some("probably"))], true);
        assert!(again.is_empty());
    }

    #[test]
    fn test_same_status_does_not_alert() {
        let mut tracker = AlertTracker::new();
        tracker.observe(&[record("Acme", Some("maybe"))], true);
        assert!(tracker.observe(&[record("Acme", Some("maybe"))], true).is_empty());
    }

    #[test]
    fn test_change_to_probably_not_does_not_alert() {
        let mut tracker = AlertTracker::new();
        tracker.observe(&[record("Acme", Some("probably"))], true);
        assert!(tracker
            .observe(&[record("Acme", Some("probably not"))], true)
            .is_empty());
        assert_eq!(tracker.last_status("Acme"), Some(Some("probably not")));
    }

    #[test]
    fn test_downgrade_to_maybe_still_alerts() {
        let mut tracker = AlertTracker::new();
        tracker.observe(&[record("Acme", Some("probably"))], true);
        let events = tracker.observe(&[record("Acme", Some("maybe"))], true);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_disabled_toggle_still_records_status() {
        let mut tracker = AlertTracker::new();
        tracker.observe(&[record("Acme", Some("probably not"))], false);
        assert!(tracker.observe(&[record("Acme", Some("probably"))], false).is_empty());

        // The transition was consumed while alerts were off.
        assert!(tracker.observe(&[record("Acme", Some("probably"))], true).is_empty());
    }

    #[test]
    fn test_missing_status_transitions() {
        let mut tracker = AlertTracker::new();
        tracker.observe(&[record("Acme", None)], true);
        assert_eq!(tracker.observe(&[record("Acme", Some("maybe"))], true).len(), 1);
        assert_eq!(tracker.observe(&[record("Acme", None)], true).len(), 1);
    }

    #[test]
    fn test_should_alert_rule() {
        let probably_not = Some("probably not".to_string());
        assert!(should_alert(Some(&probably_not), Some("maybe"), true));
        assert!(!should_alert(Some(&probably_not), Some("maybe"), false));
        assert!(!should_alert(None, Some("probably"), true));
        assert!(!should_alert(Some(&probably_not), Some("probably not"), true));
    }

    #[test]
    fn test_rule_treats_missing_status_as_a_value() {
        let rule = AlertRule::AnyChangeExceptUnavailable;
        assert!(rule.fires(None, Some("maybe")));
        assert!(rule.fires(Some("maybe"), None));
        assert!(!rule.fires(None, None));
        assert!(!rule.fires(Some("maybe"), Some("probably not")));
    }
}
