// Loads the collector's status document from disk or over HTTP
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::models::{StatusRecord, StatusSet};

#[derive(Debug, Error)]
pub enum LoadError {
    /// The file or URL could not be read at all.
    #[error("status source unavailable ({location}): {reason}")]
    SourceUnavailable { location: String, reason: String },

    /// The source was read but is not a status document.
    #[error("malformed status data ({location}): {reason}")]
    MalformedData { location: String, reason: String },
}

impl LoadError {
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::SourceUnavailable { .. } => "source_unavailable",
            LoadError::MalformedData { .. } => "malformed_data",
        }
    }
}

/// Where the status document lives. Each `load` re-reads the source; nothing
/// is cached between calls.
#[derive(Debug, Clone)]
pub enum StatusSource {
    File(PathBuf),
    Http { url: String, client: reqwest::Client },
}

impl StatusSource {
    /// `http://` and `https://` locations are fetched over the network,
    /// anything else is treated as a local path.
    pub fn from_location(location: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let client = reqwest::Client::builder()
                .timeout(request_timeout)
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
            Ok(StatusSource::Http {
                url: location.to_string(),
                client,
            })
        } else {
            Ok(StatusSource::File(expand_home(location)))
        }
    }

    pub fn location(&self) -> String {
        match self {
            StatusSource::File(path) => path.display().to_string(),
            StatusSource::Http { url, .. } => url.clone(),
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            StatusSource::File(path) => Some(path),
            StatusSource::Http { .. } => None,
        }
    }

    pub async fn load(&self) -> Result<StatusSet, LoadError> {
        let location = self.location();
        let text = match self {
            StatusSource::File(path) => read_file(path, &location).await?,
            StatusSource::Http { url, client } => fetch_url(client, url, &location).await?,
        };

        let set = parse_status_document(&text).map_err(|reason| LoadError::MalformedData {
            location: location.clone(),
            reason,
        })?;

        tracing::debug!(source = %location, records = set.len(), "loaded status document");
        Ok(set.with_raw(text))
    }
}

async fn read_file(path: &Path, location: &str) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            LoadError::MalformedData {
                location: location.to_string(),
                reason: format!("not valid UTF-8: {}", e),
            }
        } else {
            LoadError::SourceUnavailable {
                location: location.to_string(),
                reason: e.to_string(),
            }
        }
    })
}

async fn fetch_url(client: &reqwest::Client, url: &str, location: &str) -> Result<String, LoadError> {
    let unavailable = |e: reqwest::Error| LoadError::SourceUnavailable {
        location: location.to_string(),
        reason: e.to_string(),
    };

    let response = client
        .get(url)
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .await
        .map_err(unavailable)?
        .error_for_status()
        .map_err(unavailable)?;

    response.text().await.map_err(unavailable)
}

fn expand_home(location: &str) -> PathBuf {
    if let Some(rest) = location.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    PathBuf::from(location)
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    update_time: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    display_website: Option<String>,
}

impl RawEntry {
    fn into_record(self, name: String) -> StatusRecord {
        // Non-string statuses are kept verbatim so they classify as unknown.
        let status = match self.status {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        StatusRecord {
            name,
            status,
            update_time: self.update_time,
            website: self.website.unwrap_or_default(),
            display_website: self.display_website,
        }
    }
}

/// Parse a status document into a `StatusSet`.
///
/// Two shapes are accepted: an object keyed by provider name, and the array of
/// provider objects (each carrying `name`) that the collector writes. Entries
/// that are not objects, have mistyped fields, or lack a name or URL are
/// skipped with a warning; only a bad top level fails the document.
pub fn parse_status_document(text: &str) -> Result<StatusSet, String> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| format!("invalid JSON: {}", e))?;

    let mut records = Vec::new();
    match document {
        Value::Object(map) => {
            for (name, entry) in map {
                match serde_json::from_value::<RawEntry>(entry) {
                    Ok(raw) => records.push(raw.into_record(name)),
                    Err(e) => tracing::warn!(name = %name, error = %e, "skipping malformed status entry"),
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                let mut raw: RawEntry = match serde_json::from_value(item) {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!(index, error = %e, "skipping malformed status entry");
                        continue;
                    }
                };
                match raw.name.take() {
                    Some(name) => records.push(raw.into_record(name)),
                    None => tracing::warn!(index, "skipping status entry without a name"),
                }
            }
        }
        other => {
            return Err(format!(
                "expected an object or array of providers, found {}",
                json_type_name(&other)
            ));
        }
    }

    let mut set = StatusSet::new();
    for record in records {
        if !record.is_valid() {
            tracing::warn!(name = %record.name, "skipping status entry without a name or website");
            continue;
        }
        set.insert(record);
    }
    Ok(set)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
