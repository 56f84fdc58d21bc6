use serde::Serialize;
use tabled::settings::object::{Cell, Rows};
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

use crate::models::Tier;
use crate::watch::ProviderCard;

/// Row for the provider status table
#[derive(Tabled, Serialize, Debug)]
pub struct ProviderRow {
    #[tabled(rename = "Provider")]
    pub provider: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Tier")]
    pub tier: String,
    #[tabled(rename = "As Of")]
    pub as_of: String,
    #[tabled(rename = "Website")]
    pub website: String,
}

impl ProviderRow {
    pub fn from_card(card: &ProviderCard) -> Self {
        Self {
            provider: card.name.clone(),
            status: card.status_line.clone(),
            tier: format!("{} {}", card.tier.to_symbol(), card.tier.label()),
            as_of: card
                .time_line
                .strip_prefix("as of ")
                .unwrap_or(&card.time_line)
                .to_string(),
            website: card.open_url.clone(),
        }
    }
}

fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Available => Color::FG_GREEN,
        Tier::Unavailable => Color::FG_RED,
        Tier::Uncertain => Color::FG_YELLOW,
        Tier::Unknown => Color::FG_BRIGHT_BLACK,
    }
}

/// Render provider cards as a table, optionally coloring each tier cell.
pub fn provider_table<'a, I>(cards: I, colored: bool) -> String
where
    I: IntoIterator<Item = &'a ProviderCard>,
{
    let cards: Vec<&ProviderCard> = cards.into_iter().collect();
    if cards.is_empty() {
        return "No providers reported.".to_string();
    }

    let rows: Vec<ProviderRow> = cards.iter().map(|c| ProviderRow::from_card(c)).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());

    if colored {
        table.with(Modify::new(Rows::first()).with(Color::BOLD));
        for (i, card) in cards.iter().enumerate() {
            let color = tier_color(card.tier);
            table.with(Modify::new(Cell::new(i + 1, 1)).with(color.clone()));
            table.with(Modify::new(Cell::new(i + 1, 2)).with(color));
        }
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusRecord;

    fn card(name: &str, status: Option<&str>, time: Option<&str>) -> ProviderCard {
        let mut record = StatusRecord::new(name, status, format!("https://{}.example", name.to_lowercase()));
        if let Some(t) = time {
            record = record.with_update_time(t);
        }
        ProviderCard::from_record(&record)
    }

    #[test]
    fn test_row_from_card() {
        let row = ProviderRow::from_card(&card("Acme", Some("probably"), Some("12:00")));
        assert_eq!(row.provider, "Acme");
        assert_eq!(row.status, "slots probably available");
        assert_eq!(row.tier, "✓ AVAILABLE");
        assert_eq!(row.as_of, "12:00");
        assert_eq!(row.website, "https://acme.example");
    }

    #[test]
    fn test_table_contains_every_provider() {
        let cards = vec![card("Acme", Some("maybe"), None), card("Zed", None, None)];
        let table = provider_table(&cards, false);
        assert!(table.contains("Provider"));
        assert!(table.contains("slots maybe available"));
        assert!(table.contains("slots unknown available"));
        assert!(table.contains("Zed"));
    }

    #[test]
    fn test_colored_table_has_escape_codes() {
        let cards = vec![card("Acme", Some("probably"), None)];
        assert!(provider_table(&cards, true).contains("\u{1b}["));
        assert!(!provider_table(&cards, false).contains("\u{1b}["));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(provider_table(&Vec::<ProviderCard>::new(), false), "No providers reported.");
    }
}
