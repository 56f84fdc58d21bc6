pub mod notifications;
pub mod tracker;

pub use notifications::{AlertPlayer, AlertSink, DesktopNotifier};
pub use tracker::{should_alert, AlertEvent, AlertRule, AlertTracker};
