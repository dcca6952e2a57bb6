use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Palette a label may be drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
}

impl LabelColor {
    pub const ALL: [LabelColor; 7] = [
        LabelColor::Red,
        LabelColor::Orange,
        LabelColor::Yellow,
        LabelColor::Green,
        LabelColor::Blue,
        LabelColor::Purple,
        LabelColor::Pink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LabelColor::Red => "red",
            LabelColor::Orange => "orange",
            LabelColor::Yellow => "yellow",
            LabelColor::Green => "green",
            LabelColor::Blue => "blue",
            LabelColor::Purple => "purple",
            LabelColor::Pink => "pink",
        }
    }
}

impl fmt::Display for LabelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LabelColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        LabelColor::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown color '{}' (expected: red, orange, yellow, green, blue, purple, pink)",
                    s.trim()
                )
            })
    }
}

/// A shared tag attached to tasks by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub color: LabelColor,
}

/// Fields accepted when creating a label. A fixed `id` is used by seeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLabel {
    pub id: Option<String>,
    pub name: String,
    pub color: LabelColor,
}

/// Labels created on first run: (id, name, color)
pub const DEFAULT_LABELS: [(&str, &str, LabelColor); 5] = [
    ("bug", "Bug", LabelColor::Red),
    ("feature", "Feature", LabelColor::Blue),
    ("design", "Design", LabelColor::Purple),
    ("docs", "Docs", LabelColor::Yellow),
    ("urgent", "Urgent", LabelColor::Orange),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parse_is_case_insensitive() {
        assert_eq!("Purple".parse::<LabelColor>().unwrap(), LabelColor::Purple);
        assert!("teal".parse::<LabelColor>().is_err());
    }

    #[test]
    fn default_label_ids_are_unique() {
        let mut ids: Vec<&str> = DEFAULT_LABELS.iter().map(|(id, _, _)| *id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), DEFAULT_LABELS.len());
    }
}
