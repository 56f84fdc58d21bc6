// Status classification: raw collector label -> availability tier and color
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const STATUS_PROBABLY: &str = "probably";
pub const STATUS_PROBABLY_NOT: &str = "probably not";
pub const STATUS_MAYBE: &str = "maybe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Available,
    Unavailable,
    Uncertain,
    Unknown,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Available => "AVAILABLE",
            Tier::Unavailable => "UNAVAILABLE",
            Tier::Uncertain => "UNCERTAIN",
            Tier::Unknown => "UNKNOWN",
        }
    }

    pub fn to_symbol(&self) -> &'static str {
        match self {
            Tier::Available => "✓",
            Tier::Unavailable => "✗",
            Tier::Uncertain => "?",
            Tier::Unknown => "·",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Background treatment for a provider card. Names follow the CSS colors the
/// status page has always used so the JSON view stays recognizable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    LightGreen,
    LightCoral,
    Khaki,
    Gray,
}

impl ColorToken {
    pub fn css_name(&self) -> &'static str {
        match self {
            ColorToken::LightGreen => "lightgreen",
            ColorToken::LightCoral => "lightcoral",
            ColorToken::Khaki => "khaki",
            ColorToken::Gray => "gray",
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            ColorToken::LightGreen => "green",
            ColorToken::LightCoral => "red",
            ColorToken::Khaki => "yellow",
            ColorToken::Gray => "gray",
        }
    }

    pub fn to_color(&self) -> Color {
        match self {
            ColorToken::LightGreen => Color::Rgb(144, 238, 144),
            ColorToken::LightCoral => Color::Rgb(240, 128, 128),
            ColorToken::Khaki => Color::Rgb(240, 230, 140),
            ColorToken::Gray => Color::Rgb(128, 128, 128),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: Tier,
    pub color: ColorToken,
}

/// Map a raw status label to its tier and color.
///
/// Matching is exact and case-sensitive. Anything that is not one of the
/// three known labels, including a missing status, is `Tier::Unknown`.
pub fn classify(status: Option<&str>) -> Classification {
    match status {
        Some(STATUS_PROBABLY) => Classification {
            tier: Tier::Available,
            color: ColorToken::LightGreen,
        },
        Some(STATUS_PROBABLY_NOT) => Classification {
            tier: Tier::Unavailable,
            color: ColorToken::LightCoral,
        },
        Some(STATUS_MAYBE) => Classification {
            tier: Tier::Uncertain,
            color: ColorToken::Khaki,
        },
        _ => Classification {
            tier: Tier::Unknown,
            color: ColorToken::Gray,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(classify(Some("probably")).tier, Tier::Available);
        assert_eq!(classify(Some("probably")).color.family(), "green");
        assert_eq!(classify(Some("probably not")).tier, Tier::Unavailable);
        assert_eq!(classify(Some("probably not")).color.family(), "red");
        assert_eq!(classify(Some("maybe")).tier, Tier::Uncertain);
        assert_eq!(classify(Some("maybe")).color.family(), "yellow");
    }

    #[test]
    fn test_unknown_labels_resolve_to_gray() {
        for label in ["", "Probably", "PROBABLY NOT", "probably  not", " maybe", "yes", "🤷"] {
            let c = classify(Some(label));
            assert_eq!(c.tier, Tier::Unknown, "label {:?}", label);
            assert_eq!(c.color, ColorToken::Gray);
        }
        assert_eq!(classify(None).tier, Tier::Unknown);
    }

    #[test]
    fn test_css_names() {
        assert_eq!(ColorToken::LightGreen.css_name(), "lightgreen");
        assert_eq!(ColorToken::LightCoral.css_name(), "lightcoral");
        assert_eq!(ColorToken::Khaki.css_name(), "khaki");
        assert_eq!(ColorToken::Gray.css_name(), "gray");
    }

    #[test]
    fn test_serialized_tier() {
        let json = serde_json::to_string(&Tier::Uncertain).unwrap();
        assert_eq!(json, "\"UNCERTAIN\"");
    }
}
