// Configuration module
pub mod settings;

pub use settings::{AlertsConfig, Config, DisplayConfig, RefreshConfig, SourceConfig};
