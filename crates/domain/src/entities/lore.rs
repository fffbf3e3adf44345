//! Lore entry entity - world-building and narrative records
//!
//! Lore entries are tagged, categorized text records that can cross-reference
//! each other by id. References are not validated; a related entry may have
//! been deleted since the link was made.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::LoreEntryId;

/// Category of lore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoreCategory {
    /// Past events (wars, treaties, disasters)
    History,
    /// Myths, legends, folklore
    Mythology,
    /// Faiths, pantheons, prophecies
    Religion,
    /// Lands, seas, natural phenomena
    Geography,
    /// Factions, alliances, power structures
    Politics,
    /// Customs, languages, daily life
    Culture,
    /// Magic systems and arcane knowledge
    Arcana,
    /// Unknown category (for forward compatibility)
    #[serde(other)]
    Other,
}

impl LoreCategory {
    pub fn all() -> &'static [LoreCategory] {
        &[
            LoreCategory::History,
            LoreCategory::Mythology,
            LoreCategory::Religion,
            LoreCategory::Geography,
            LoreCategory::Politics,
            LoreCategory::Culture,
            LoreCategory::Arcana,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LoreCategory::History => "History",
            LoreCategory::Mythology => "Mythology",
            LoreCategory::Religion => "Religion",
            LoreCategory::Geography => "Geography",
            LoreCategory::Politics => "Politics",
            LoreCategory::Culture => "Culture",
            LoreCategory::Arcana => "Arcana",
            LoreCategory::Other => "Other",
        }
    }

    /// String representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            LoreCategory::History => "history",
            LoreCategory::Mythology => "mythology",
            LoreCategory::Religion => "religion",
            LoreCategory::Geography => "geography",
            LoreCategory::Politics => "politics",
            LoreCategory::Culture => "culture",
            LoreCategory::Arcana => "arcana",
            LoreCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for LoreCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for LoreCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "history" => Ok(LoreCategory::History),
            "mythology" | "myth" => Ok(LoreCategory::Mythology),
            "religion" => Ok(LoreCategory::Religion),
            "geography" => Ok(LoreCategory::Geography),
            "politics" => Ok(LoreCategory::Politics),
            "culture" => Ok(LoreCategory::Culture),
            "arcana" => Ok(LoreCategory::Arcana),
            "other" => Ok(LoreCategory::Other),
            _ => Err(DomainError::parse(format!(
                "Invalid lore category '{}'. Valid categories: history, mythology, religion, geography, politics, culture, arcana, other",
                s
            ))),
        }
    }
}

/// A narrative or world-building text record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoreEntry {
    pub id: LoreEntryId,
    /// Title of the entry (e.g., "The Fall of House Valeren")
    pub title: String,
    /// The actual lore text
    pub content: String,
    pub category: LoreCategory,
    /// Tags for filtering/searching
    pub tags: Vec<String>,
    /// Ids of related lore entries
    pub related_entries: Vec<LoreEntryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoreEntry {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: LoreCategory,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LoreEntryId::new(),
            title: title.into(),
            content: content.into(),
            category,
            tags: Vec::new(),
            related_entries: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_related_entries(mut self, related_entries: Vec<LoreEntryId>) -> Self {
        self.related_entries = related_entries;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Link another entry, ignoring duplicates and self-references
    pub fn add_related(&mut self, other: LoreEntryId) {
        if other != self.id && !self.related_entries.contains(&other) {
            self.related_entries.push(other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_lore_entry_creation() {
        let now = fixed_time();
        let entry = LoreEntry::new(
            "The Great War",
            "Five hundred years ago, the kingdoms of men united against the rising darkness.",
            LoreCategory::History,
            now,
        )
        .with_tags(vec!["war".to_string(), "undead".to_string()]);

        assert_eq!(entry.title, "The Great War");
        assert_eq!(entry.category, LoreCategory::History);
        assert!(entry.has_tag("WAR"));
        assert!(!entry.has_tag("heroes"));
    }

    #[test]
    fn test_add_related_skips_self_and_duplicates() {
        let now = fixed_time();
        let mut entry = LoreEntry::new("A", "", LoreCategory::Mythology, now);
        let other = LoreEntryId::new();

        entry.add_related(other);
        entry.add_related(other);
        entry.add_related(entry.id);

        assert_eq!(entry.related_entries, vec![other]);
    }

    #[test]
    fn test_lore_category_from_str() {
        assert_eq!(
            "history".parse::<LoreCategory>().unwrap(),
            LoreCategory::History
        );
        assert_eq!(
            "MYTH".parse::<LoreCategory>().unwrap(),
            LoreCategory::Mythology
        );
        assert!("cooking".parse::<LoreCategory>().is_err());
    }
}
