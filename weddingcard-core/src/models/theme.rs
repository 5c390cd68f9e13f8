use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Visual theme a wedding page is rendered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Classic,
    Modern,
    Boho,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Classic, Theme::Modern, Theme::Boho];
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Classic => write!(f, "classic"),
            Theme::Modern => write!(f, "modern"),
            Theme::Boho => write!(f, "boho"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Ok(Theme::Classic),
            "modern" => Ok(Theme::Modern),
            "boho" => Ok(Theme::Boho),
            _ => Err(format!(
                "Invalid theme '{}'. Valid options: classic, modern, boho",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_default_is_classic() {
        assert_eq!(Theme::default(), Theme::Classic);
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!(Theme::from_str("classic").unwrap(), Theme::Classic);
        assert_eq!(Theme::from_str("MODERN").unwrap(), Theme::Modern);
        assert_eq!(Theme::from_str(" Boho ").unwrap(), Theme::Boho);
    }

    #[test]
    fn test_theme_from_str_invalid() {
        let err = Theme::from_str("rustic").unwrap_err();
        assert!(err.contains("rustic"));
        assert!(Theme::from_str("").is_err());
    }

    #[test]
    fn test_theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Boho).unwrap(), "\"boho\"");
        let parsed: Theme = serde_json::from_str("\"modern\"").unwrap();
        assert_eq!(parsed, Theme::Modern);
    }
}
