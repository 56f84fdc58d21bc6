use anyhow::Result;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use chrono_tz::Tz;
use std::str::FromStr;
use std::time::Duration;

/// Formats refresh timestamps in the deployment's local timezone.
#[derive(Debug, Clone)]
pub struct RefreshClock {
    timezone: Tz,
    format: String,
}

impl RefreshClock {
    pub fn new(timezone_str: &str, format: &str) -> Result<Self> {
        let timezone = Tz::from_str(timezone_str)
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", timezone_str, e))?;
        validate_time_format(format)?;

        Ok(Self {
            timezone,
            format: format.to_string(),
        })
    }

    pub fn utc() -> Self {
        Self {
            timezone: Tz::UTC,
            format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }

    /// Falls back to RFC 3339 if the format cannot be rendered.
    pub fn format(&self, at: &DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.timezone);
        let mut out = String::new();
        if write!(out, "{}", local.format(&self.format)).is_err() {
            return local.to_rfc3339();
        }
        out
    }
}

/// Rejects empty formats and unknown strftime specifiers such as `%Q`.
pub fn validate_time_format(format: &str) -> Result<()> {
    if format.trim().is_empty() {
        anyhow::bail!("Time format must not be empty");
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        anyhow::bail!("Invalid time format '{}'", format);
    }
    Ok(())
}

/// Human phrasing of a refresh interval: "second", "5 seconds", "2 minutes".
pub fn describe_cadence(interval: Duration) -> String {
    let millis = interval.as_millis();
    if millis % 1000 != 0 {
        return format!("{} milliseconds", millis);
    }

    let secs = interval.as_secs();
    match secs {
        1 => "second".to_string(),
        60 => "minute".to_string(),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_refresh_clock_uses_timezone() {
        let clock = RefreshClock::new("America/Chicago", "%d-%b-%Y %I:%M:%S %p").unwrap();
        let at = Utc.with_ymd_and_hms(2021, 2, 1, 18, 30, 5).unwrap();
        assert_eq!(clock.format(&at), "01-Feb-2021 12:30:05 PM");
    }

    #[test]
    fn test_invalid_timezone() {
        assert!(RefreshClock::new("Not/AZone", "%H").is_err());
    }

    #[test]
    fn test_invalid_time_format_is_rejected() {
        assert!(validate_time_format("%d-%b-%Y %I:%M:%S %p").is_ok());
        assert!(validate_time_format("%Q").is_err());
        assert!(validate_time_format("  ").is_err());
        assert!(RefreshClock::new("UTC", "%Q").is_err());
    }

    #[test]
    fn test_describe_cadence() {
        assert_eq!(describe_cadence(Duration::from_secs(1)), "second");
        assert_eq!(describe_cadence(Duration::from_secs(5)), "5 seconds");
        assert_eq!(describe_cadence(Duration::from_secs(60)), "minute");
        assert_eq!(describe_cadence(Duration::from_secs(300)), "5 minutes");
        assert_eq!(describe_cadence(Duration::from_secs(90)), "90 seconds");
        assert_eq!(describe_cadence(Duration::from_millis(1500)), "1500 milliseconds");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m 5s");
    }
}
