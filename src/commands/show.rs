use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::commands::build_source;
use crate::config::Config;
use crate::output::provider_table;
use crate::utils::RefreshClock;
use crate::watch::{ProviderCard, RefreshSession, RenderOptions};

/// One-shot rendering of the current status, for scripts and terminals
/// without a dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ShowReport {
    pub title: String,
    pub last_refresh: Option<String>,
    pub providers: Vec<ProviderCard>,
    pub open_all: Vec<String>,
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl ShowReport {
    pub fn is_ok(&self) -> bool {
        self.notice.is_none()
    }
}

pub async fn load_report(config: &Config, debug: bool) -> Result<ShowReport> {
    let source = build_source(config)?;
    let clock = RefreshClock::new(&config.display.timezone, &config.display.time_format)?;
    let mut session = RefreshSession::new(RenderOptions::new(&config.display.sentinel_name, debug), false);

    let outcome = session.complete(source.load().await, Utc::now());
    let snapshot = session.view().snapshot();

    Ok(ShowReport {
        title: config.display.site_title.clone(),
        last_refresh: outcome.frame.last_refreshed.map(|at| clock.format(&at)),
        providers: snapshot.cards,
        open_all: snapshot.open_all,
        notice: outcome.frame.notice.map(|n| n.message()),
        raw: snapshot.raw,
    })
}

pub fn format_report(report: &ShowReport, json: bool, colored: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(report).context("Failed to serialize report to JSON");
    }

    let mut out = String::new();
    out.push_str(&report.title);
    out.push('\n');

    if let Some(ref notice) = report.notice {
        out.push_str(notice);
        out.push('\n');
        return Ok(out);
    }

    if let Some(ref at) = report.last_refresh {
        out.push_str(&format!("Last page refresh: {}\n", at));
    }
    out.push('\n');
    out.push_str(&provider_table(&report.providers, colored));
    out.push('\n');

    if let Some(ref raw) = report.raw {
        out.push_str("\nRaw status:\n");
        out.push_str(raw);
        out.push('\n');
    }

    Ok(out)
}

/// Print the current status. Returns false when the source could not be
/// loaded so the caller can exit non-zero.
pub async fn handle_show_command(config: &Config, debug: bool, json: bool, colored: bool) -> Result<bool> {
    let report = load_report(config, debug).await?;
    print!("{}", format_report(&report, json, colored)?);
    Ok(report.is_ok())
}
