// Utility functions module
pub mod date_format;

pub use date_format::{describe_cadence, format_duration, validate_time_format, RefreshClock};
