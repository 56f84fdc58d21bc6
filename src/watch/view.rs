// Projection of a StatusSet into what the dashboard shows
//
// `render` is pure. `View` keeps the last applied projection and turns a new
// one into the minimal list of updates a surface has to apply.
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::alerts::AlertEvent;
use crate::models::{ColorToken, StatusRecord, StatusSet, Tier, Visibility};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderCard {
    pub name: String,
    pub status_line: String,
    /// "as of ..." or an empty placeholder line so every card has the same height.
    pub time_line: String,
    pub tier: Tier,
    pub color: ColorToken,
    pub open_url: String,
}

impl ProviderCard {
    pub fn from_record(record: &StatusRecord) -> Self {
        let classification = record.classification();
        let time_line = match record.update_time() {
            Some(time) => format!("as of {}", time),
            None => String::new(),
        };

        Self {
            name: record.name.clone(),
            status_line: format!("slots {} available", record.status_label()),
            time_line,
            tier: classification.tier,
            color: classification.color,
            open_url: record.open_url().to_string(),
        }
    }

    pub fn lines(&self) -> [&str; 3] {
        [
            self.name.as_str(),
            self.status_line.as_str(),
            self.time_line.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub cards: Vec<ProviderCard>,
    /// Resolved URL of every visible card, in display order.
    pub open_all: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub visibility: Visibility,
    pub show_raw: bool,
}

impl RenderOptions {
    /// Debug mode reveals the raw document and the sentinel provider.
    pub fn new(sentinel_name: &str, debug: bool) -> Self {
        Self {
            visibility: Visibility::new(sentinel_name, debug),
            show_raw: debug,
        }
    }
}

pub fn render(set: &StatusSet, options: &RenderOptions) -> ViewModel {
    let cards: Vec<ProviderCard> = set
        .visible(&options.visibility)
        .map(ProviderCard::from_record)
        .collect();
    let open_all = cards.iter().map(|c| c.open_url.clone()).collect();
    let raw = if options.show_raw {
        set.raw().map(str::to_string)
    } else {
        None
    };

    ViewModel {
        cards,
        open_all,
        raw,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    Insert(ProviderCard),
    Update(ProviderCard),
    Remove(String),
    OpenAllChanged(Vec<String>),
    RawChanged(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// No load has ever succeeded.
    NotWorking(String),
    /// The latest load failed; older data is still on screen.
    Stale(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::NotWorking(_) => "Sorry, the site's not working.".to_string(),
            Notice::Stale(reason) => format!("Last refresh failed: {}", reason),
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Notice::NotWorking(reason) | Notice::Stale(reason) => reason,
        }
    }
}

/// What a surface receives after each completed refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFrame {
    pub updates: Vec<ViewUpdate>,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub notice: Option<Notice>,
}

/// Anything that can display view frames: the terminal dashboard, a channel
/// to it, or a recorder in tests.
pub trait ViewSurface {
    fn present(&mut self, frame: ViewFrame) -> Result<()>;

    fn alert_fired(&mut self, _alert: &AlertEvent) -> Result<()> {
        Ok(())
    }

    fn alerts_toggled(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    fn load_skipped(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct View {
    cards: BTreeMap<String, ProviderCard>,
    open_all: Vec<String>,
    raw: Option<String>,
    last_refreshed: Option<DateTime<Utc>>,
    notice: Option<Notice>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates needed to turn the current view into `next`. Empty when nothing
    /// visible would change.
    pub fn diff(&self, next: &ViewModel) -> Vec<ViewUpdate> {
        let mut updates = Vec::new();

        for card in &next.cards {
            match self.cards.get(&card.name) {
                None => updates.push(ViewUpdate::Insert(card.clone())),
                Some(existing) if existing != card => updates.push(ViewUpdate::Update(card.clone())),
                Some(_) => {}
            }
        }

        for name in self.cards.keys() {
            if !next.cards.iter().any(|c| &c.name == name) {
                updates.push(ViewUpdate::Remove(name.clone()));
            }
        }

        if self.open_all != next.open_all {
            updates.push(ViewUpdate::OpenAllChanged(next.open_all.clone()));
        }
        if self.raw != next.raw {
            updates.push(ViewUpdate::RawChanged(next.raw.clone()));
        }

        updates
    }

    /// Diff against `next`, apply the result and stamp the refresh time.
    pub fn apply(&mut self, next: ViewModel, now: DateTime<Utc>) -> Vec<ViewUpdate> {
        let updates = self.diff(&next);
        self.apply_updates(&updates);
        self.last_refreshed = Some(now);
        updates
    }

    pub fn apply_updates(&mut self, updates: &[ViewUpdate]) {
        for update in updates {
            match update {
                ViewUpdate::Insert(card) | ViewUpdate::Update(card) => {
                    self.cards.insert(card.name.clone(), card.clone());
                }
                ViewUpdate::Remove(name) => {
                    self.cards.remove(name);
                }
                ViewUpdate::OpenAllChanged(urls) => self.open_all = urls.clone(),
                ViewUpdate::RawChanged(raw) => self.raw = raw.clone(),
            }
        }
    }

    /// Apply a frame produced by another `View` (the dashboard's mirror).
    pub fn apply_frame(&mut self, frame: &ViewFrame) {
        self.apply_updates(&frame.updates);
        if frame.last_refreshed.is_some() {
            self.last_refreshed = frame.last_refreshed;
        }
        self.notice = frame.notice.clone();
    }

    pub fn cards(&self) -> impl Iterator<Item = &ProviderCard> {
        self.cards.values()
    }

    pub fn card(&self, name: &str) -> Option<&ProviderCard> {
        self.cards.get(name)
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn open_all(&self) -> &[String] {
        &self.open_all
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Option<Notice>) {
        self.notice = notice;
    }

    /// Current contents as a `ViewModel`, in display order.
    pub fn snapshot(&self) -> ViewModel {
        ViewModel {
            cards: self.cards.values().cloned().collect(),
            open_all: self.open_all.clone(),
            raw: self.raw.clone(),
        }
    }
}

impl ViewSurface for View {
    fn present(&mut self, frame: ViewFrame) -> Result<()> {
        self.apply_frame(&frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_SENTINEL_NAME;
    use crate::store::parse_status_document;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_612_200_000 + secs, 0).unwrap()
    }

    fn set(json: &str) -> StatusSet {
        parse_status_document(json).unwrap()
    }

    #[test]
    fn test_probably_without_timestamp() {
        let model = render(
            &set(r#"{"Acme":{"status":"probably","website":"https://a"}}"#),
            &RenderOptions::default(),
        );

        assert_eq!(model.cards.len(), 1);
        let card = &model.cards[0];
        assert_eq!(card.color.family(), "green");
        assert!(card.status_line.contains("probably"));
        assert_eq!(card.time_line, "");
        assert!(!card.lines().iter().any(|l| l.starts_with("as of")));
    }

    #[test]
    fn test_timestamp_rendered_verbatim() {
        let model = render(
            &set(r#"{"Acme":{"status":"maybe","website":"https://a","update_time":"01-Feb-2021 10:15:00 AM"}}"#),
            &RenderOptions::default(),
        );
        assert_eq!(model.cards[0].time_line, "as of 01-Feb-2021 10:15:00 AM");
    }

    #[test]
    fn test_display_website_drives_open_actions() {
        let model = render(
            &set(r#"{"Acme":{"status":"maybe","website":"https://api.acme","display_website":"https://acme.example"}}"#),
            &RenderOptions::default(),
        );
        assert_eq!(model.cards[0].open_url, "https://acme.example");
        assert_eq!(model.open_all, vec!["https://acme.example".to_string()]);
    }

    #[test]
    fn test_sentinel_hidden_unless_debug() {
        let data = set(
            r#"{"Test Site":{"status":"probably","website":"https://t"},"Acme":{"status":"maybe","website":"https://a"}}"#,
        );

        let normal = render(&data, &RenderOptions::new(DEFAULT_SENTINEL_NAME, false));
        assert!(normal.cards.iter().all(|c| c.name != "Test Site"));
        assert_eq!(normal.open_all, vec!["https://a".to_string()]);
        assert!(normal.raw.is_none());

        let debug = render(&data, &RenderOptions::new(DEFAULT_SENTINEL_NAME, true));
        assert!(debug.cards.iter().any(|c| c.name == "Test Site"));
        assert!(debug.raw.is_some());
    }

    #[test]
    fn test_cards_sorted_regardless_of_input_order() {
        let model = render(
            &set(r#"[{"name":"Zeta","website":"https://z"},{"name":"Alpha","website":"https://a"},{"name":"Mid","website":"https://m"}]"#),
            &RenderOptions::default(),
        );
        let names: Vec<&str> = model.cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_unknown_status_card() {
        let model = render(
            &set(r#"{"Acme":{"status":"closed for lunch","website":"https://a"},"Beta":{"website":"https://b"}}"#),
            &RenderOptions::default(),
        );
        assert!(model.cards.iter().all(|c| c.tier == Tier::Unknown && c.color == ColorToken::Gray));
        assert_eq!(model.cards[1].status_line, "slots unknown available");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let data = set(r#"{"Acme":{"status":"probably","website":"https://a"},"Beta":{"status":"maybe","website":"https://b"}}"#);
        let options = RenderOptions::default();
        let mut view = View::new();

        let first = view.apply(render(&data, &options), t(0));
        assert_eq!(first.len(), 3); // two inserts and the open-all list

        let before = view.snapshot();
        let second = view.apply(render(&data, &options), t(5));
        assert!(second.is_empty());
        assert_eq!(view.snapshot(), before);
        assert_eq!(view.last_refreshed(), Some(t(5)));
    }

    #[test]
    fn test_diff_only_touches_changed_cards() {
        let options = RenderOptions::default();
        let mut view = View::new();
        view.apply(
            render(&set(r#"{"Acme":{"status":"probably not","website":"https://a"},"Beta":{"status":"maybe","website":"https://b"}}"#), &options),
            t(0),
        );

        let updates = view.apply(
            render(&set(r#"{"Acme":{"status":"probably","website":"https://a"},"Gamma":{"status":"maybe","website":"https://g"}}"#), &options),
            t(5),
        );

        assert!(updates.iter().any(|u| matches!(u, ViewUpdate::Update(c) if c.name == "Acme")));
        assert!(updates.iter().any(|u| matches!(u, ViewUpdate::Insert(c) if c.name == "Gamma")));
        assert!(updates.contains(&ViewUpdate::Remove("Beta".to_string())));
        assert!(updates.iter().any(|u| matches!(u, ViewUpdate::OpenAllChanged(_))));
        assert_eq!(view.card("Acme").unwrap().color, ColorToken::LightGreen);
        assert!(view.card("Beta").is_none());
    }

    #[test]
    fn test_mirror_view_tracks_source_view() {
        let options = RenderOptions::new(DEFAULT_SENTINEL_NAME, true);
        let mut source = View::new();
        let mut mirror = View::new();

        for json in [
            r#"{"Acme":{"status":"maybe","website":"https://a"}}"#,
            r#"{"Acme":{"status":"probably","website":"https://a"},"Beta":{"website":"https://b"}}"#,
            r#"{"Beta":{"website":"https://b"}}"#,
        ] {
            let updates = source.apply(render(&set(json), &options), t(0));
            mirror
                .present(ViewFrame {
                    updates,
                    last_refreshed: source.last_refreshed(),
                    notice: None,
                })
                .unwrap();
            assert_eq!(mirror.snapshot(), source.snapshot());
        }
    }

    #[test]
    fn test_render_does_not_mutate_set() {
        let data = set(r#"{"Acme":{"status":"probably","website":"https://a"}}"#);
        let copy = data.clone();
        let _ = render(&data, &RenderOptions::new(DEFAULT_SENTINEL_NAME, true));
        assert_eq!(data, copy);
    }
}
