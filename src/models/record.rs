// Provider status records as written by the collector
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::tier::{classify, Classification};

/// Name of the collector's self-test provider.
pub const DEFAULT_SENTINEL_NAME: &str = "Test Site";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub name: String,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub website: String,
    pub display_website: Option<String>,
}

impl StatusRecord {
    pub fn new(name: impl Into<String>, status: Option<&str>, website: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.map(str::to_string),
            update_time: None,
            website: website.into(),
            display_website: None,
        }
    }

    pub fn with_update_time(mut self, update_time: impl Into<String>) -> Self {
        self.update_time = Some(update_time.into());
        self
    }

    pub fn with_display_website(mut self, url: impl Into<String>) -> Self {
        self.display_website = Some(url.into());
        self
    }

    pub fn classification(&self) -> Classification {
        classify(self.status.as_deref())
    }

    /// Label shown to the user; a missing status reads as "unknown".
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }

    /// Timestamp of the last check, ignoring empty strings.
    pub fn update_time(&self) -> Option<&str> {
        self.update_time.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// URL used for display and open actions: `display_website` wins when set.
    pub fn open_url(&self) -> &str {
        match self.display_website.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => &self.website,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.open_url().trim().is_empty()
    }
}

/// Every provider record from one load, ordered by name.
///
/// Inserting a name that already exists replaces the earlier record, so a
/// source with duplicate names resolves to the last entry in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSet {
    records: BTreeMap<String, StatusRecord>,
    raw: Option<String>,
}

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = StatusRecord>,
    {
        let mut set = Self::new();
        for record in records {
            set.insert(record);
        }
        set
    }

    pub fn insert(&mut self, record: StatusRecord) -> Option<StatusRecord> {
        self.records.insert(record.name.clone(), record)
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Source text the set was parsed from, kept for the debug view.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&StatusRecord> {
        self.records.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn visible<'a>(
        &'a self,
        visibility: &'a Visibility,
    ) -> impl Iterator<Item = &'a StatusRecord> + 'a {
        self.records.values().filter(move |r| visibility.is_visible(r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decides which records reach the view. The sentinel provider only shows up
/// in debug mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub sentinel_name: String,
    pub include_sentinel: bool,
}

impl Visibility {
    pub fn new(sentinel_name: impl Into<String>, include_sentinel: bool) -> Self {
        Self {
            sentinel_name: sentinel_name.into(),
            include_sentinel,
        }
    }

    pub fn is_visible(&self, record: &StatusRecord) -> bool {
        self.include_sentinel || record.name != self.sentinel_name
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL_NAME, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tier::Tier;

    #[test]
    fn test_iteration_is_sorted_by_name() {
        let set = StatusSet::from_records(vec![
            StatusRecord::new("Walgreens", Some("maybe"), "https://w"),
            StatusRecord::new("Acme", Some("probably"), "https://a"),
            StatusRecord::new("HEB", None, "https://h"),
        ]);

        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["Acme", "HEB", "Walgreens"]);
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let set = StatusSet::from_records(vec![
            StatusRecord::new("Acme", Some("probably not"), "https://first"),
            StatusRecord::new("Acme", Some("probably"), "https://second"),
        ]);

        assert_eq!(set.len(), 1);
        let acme = set.get("Acme").unwrap();
        assert_eq!(acme.website, "https://second");
        assert_eq!(acme.classification().tier, Tier::Available);
    }

    #[test]
    fn test_open_url_prefers_display_website() {
        let record = StatusRecord::new("Acme", Some("maybe"), "https://api.acme")
            .with_display_website("https://acme.example/book");
        assert_eq!(record.open_url(), "https://acme.example/book");

        let blank = StatusRecord::new("Acme", Some("maybe"), "https://api.acme")
            .with_display_website("");
        assert_eq!(blank.open_url(), "https://api.acme");
    }

    #[test]
    fn test_empty_update_time_is_absent() {
        let record = StatusRecord::new("Acme", None, "https://a").with_update_time("");
        assert_eq!(record.update_time(), None);
        assert_eq!(record.status_label(), "unknown");
    }

    #[test]
    fn test_validity() {
        assert!(StatusRecord::new("Acme", None, "https://a").is_valid());
        assert!(!StatusRecord::new("", None, "https://a").is_valid());
        assert!(!StatusRecord::new("Acme", None, "").is_valid());
        assert!(StatusRecord::new("Acme", None, "")
            .with_display_website("https://d")
            .is_valid());
    }

    #[test]
    fn test_sentinel_visibility() {
        let set = StatusSet::from_records(vec![
            StatusRecord::new("Acme", Some("probably"), "https://a"),
            StatusRecord::new(DEFAULT_SENTINEL_NAME, Some("maybe"), "https://test"),
        ]);

        let hidden = Visibility::default();
        assert_eq!(set.visible(&hidden).count(), 1);

        let debug = Visibility::new(DEFAULT_SENTINEL_NAME, true);
        assert_eq!(set.visible(&debug).count(), 2);
    }
}
