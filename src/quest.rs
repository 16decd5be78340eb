//! Quest types - the records behind the editor form and the map
//!
//! Three plain data records, all mutated only through [`crate::QuestStore`]:
//! - `Quest`: the authoritative, current state of a quest
//! - `QuestVersion`: an immutable snapshot taken on every save
//! - `QuestLocation`: a typed marker placed on a quest's map

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Quest difficulty - the fixed set accepted by the `quests` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Epic,
}

impl Difficulty {
    /// Get the string representation stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Epic => "Epic",
        }
    }

    /// Get all difficulties, easiest first
    pub fn all() -> &'static [Difficulty] {
        &[
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Epic,
        ]
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "epic" => Ok(Difficulty::Epic),
            _ => Err(Error::Parse(format!("Unknown difficulty: {}", s))),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map marker kinds.
///
/// The map editor offered one button per marker, each drawn in its own
/// color; the colors are still accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    /// Green marker
    City,
    /// Red marker
    Dungeon,
    /// Yellow marker
    Tavern,
}

impl MarkerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerType::City => "city",
            MarkerType::Dungeon => "dungeon",
            MarkerType::Tavern => "tavern",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            MarkerType::City => "green",
            MarkerType::Dungeon => "red",
            MarkerType::Tavern => "yellow",
        }
    }

    pub fn all() -> &'static [MarkerType] {
        &[MarkerType::City, MarkerType::Dungeon, MarkerType::Tavern]
    }
}

impl FromStr for MarkerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "city" | "green" => Ok(MarkerType::City),
            "dungeon" | "lair" | "red" => Ok(MarkerType::Dungeon),
            "tavern" | "yellow" => Ok(MarkerType::Tavern),
            _ => Err(Error::Parse(format!("Unknown marker type: {}", s))),
        }
    }
}

impl std::fmt::Display for MarkerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The editable fields of a quest, as held by the editor form.
///
/// This is what gets handed to the store on every save; the identifier
/// lives in the editing [`crate::Session`], not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestFields {
    pub title: String,
    pub difficulty: Difficulty,
    pub reward: i64,
    pub description: String,
    /// ISO-8601 timestamp
    pub deadline: String,
}

impl QuestFields {
    pub fn new(
        title: impl Into<String>,
        difficulty: Difficulty,
        reward: i64,
        description: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            difficulty,
            reward,
            description: description.into(),
            deadline: deadline.into(),
        }
    }

    /// The state of a freshly opened editor: empty title, lowest reward,
    /// deadline set to the current local time.
    pub fn draft_default() -> Self {
        let now = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        Self::new("", Difficulty::Easy, crate::validation::MIN_REWARD, "", now)
    }

    /// Number of whitespace-separated words in the description
    pub fn word_count(&self) -> usize {
        self.description.split_whitespace().count()
    }

    /// Number of characters in the description
    pub fn char_count(&self) -> usize {
        self.description.chars().count()
    }
}

/// A quest row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: i64,
    pub title: String,
    pub difficulty: Difficulty,
    pub reward: i64,
    pub description: String,
    pub deadline: String,
    /// Set by the database on first insert, never updated
    pub created_at: String,
}

impl Quest {
    /// Current field values, detached from the identifier
    pub fn fields(&self) -> QuestFields {
        QuestFields {
            title: self.title.clone(),
            difficulty: self.difficulty,
            reward: self.reward,
            description: self.description.clone(),
            deadline: self.deadline.clone(),
        }
    }

    /// Flat key-value snapshot consumed by document templates.
    pub fn template_context(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut ctx = serde_json::Map::new();
        ctx.insert("id".into(), self.id.into());
        ctx.insert("title".into(), self.title.clone().into());
        ctx.insert("difficulty".into(), self.difficulty.as_str().into());
        ctx.insert("reward".into(), self.reward.into());
        ctx.insert("description".into(), self.description.clone().into());
        ctx.insert("deadline".into(), self.deadline.clone().into());
        ctx
    }
}

/// An immutable snapshot of a quest, appended on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestVersion {
    pub id: i64,
    pub quest_id: i64,
    pub title: String,
    pub difficulty: Difficulty,
    pub reward: i64,
    pub description: String,
    pub created_at: String,
}

/// A marker placed on a quest's map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestLocation {
    pub id: i64,
    pub quest_id: i64,
    pub x: f64,
    pub y: f64,
    pub marker: MarkerType,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" Epic ".parse::<Difficulty>().unwrap(), Difficulty::Epic);
        assert!("legendary".parse::<Difficulty>().is_err());

        for d in Difficulty::all() {
            assert_eq!(d.as_str().parse::<Difficulty>().unwrap(), *d);
        }
    }

    #[test]
    fn test_marker_accepts_colors() {
        assert_eq!("green".parse::<MarkerType>().unwrap(), MarkerType::City);
        assert_eq!("red".parse::<MarkerType>().unwrap(), MarkerType::Dungeon);
        assert_eq!("Tavern".parse::<MarkerType>().unwrap(), MarkerType::Tavern);
        assert!("castle".parse::<MarkerType>().is_err());
    }

    #[test]
    fn test_description_counters() {
        let fields = QuestFields::new("t", Difficulty::Easy, 10, "  slay the\n dragon  ", "");
        assert_eq!(fields.word_count(), 3);
        assert_eq!(fields.char_count(), 20);
    }

    #[test]
    fn test_template_context() {
        let quest = Quest {
            id: 7,
            title: "Dragon's Lair".into(),
            difficulty: Difficulty::Hard,
            reward: 500,
            description: "Slay it".into(),
            deadline: "2025-01-01T00:00:00".into(),
            created_at: "2024-12-01 10:00:00".into(),
        };

        let ctx = quest.template_context();
        assert_eq!(ctx["id"], 7);
        assert_eq!(ctx["difficulty"], "Hard");
        assert_eq!(ctx["reward"], 500);
        assert!(!ctx.contains_key("created_at"));
    }
}
