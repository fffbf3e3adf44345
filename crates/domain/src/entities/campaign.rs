//! Campaign entity - a named container for an ongoing game.
//!
//! A campaign carries the narrative metadata a game master tracks between
//! sessions: the roster of player characters, quest lists, and free-form
//! notes. Quest entries are plain strings (names or ids), not references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::CampaignId;

/// A tabletop campaign with narrative metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub description: String,
    /// The world or region the campaign takes place in
    pub setting: String,
    /// Names or ids of player characters
    pub player_characters: Vec<String>,
    /// Names or ids of active quests
    pub active_quests: Vec<String>,
    /// Names or ids of completed quests
    pub completed_quests: Vec<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        setting: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CampaignId::new(),
            name: name.into(),
            description: description.into(),
            setting: setting.into(),
            player_characters: Vec::new(),
            active_quests: Vec::new(),
            completed_quests: Vec::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_player_characters(mut self, player_characters: Vec<String>) -> Self {
        self.player_characters = player_characters;
        self
    }

    pub fn with_active_quests(mut self, active_quests: Vec<String>) -> Self {
        self.active_quests = active_quests;
        self
    }

    pub fn with_completed_quests(mut self, completed_quests: Vec<String>) -> Self {
        self.completed_quests = completed_quests;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Move a quest from the active list to the completed list.
    ///
    /// Returns false if the quest is not currently active.
    pub fn complete_quest(&mut self, quest: &str) -> bool {
        match self.active_quests.iter().position(|q| q == quest) {
            Some(index) => {
                let quest = self.active_quests.remove(index);
                self.completed_quests.push(quest);
                true
            }
            None => false,
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
    fn test_campaign_creation() {
        let now = fixed_time();
        let campaign = Campaign::new(
            "The Shadow of Malachar",
            "The descendants of the Lich King seek to resurrect their master.",
            "The Kingdom of Aldoria",
            now,
        )
        .with_player_characters(vec!["Thorne Ironheart".to_string()])
        .with_active_quests(vec!["The Awakening Darkness".to_string()])
        .with_notes("Players are currently in Ravenhollow.");

        assert_eq!(campaign.name, "The Shadow of Malachar");
        assert_eq!(campaign.player_characters.len(), 1);
        assert_eq!(campaign.active_quests.len(), 1);
        assert!(campaign.completed_quests.is_empty());
        assert_eq!(campaign.created_at, campaign.updated_at);
    }

    #[test]
    fn test_complete_quest_moves_between_lists() {
        let now = fixed_time();
        let mut campaign = Campaign::new("Test", "", "", now)
            .with_active_quests(vec!["Find the blacksmith".to_string()]);

        assert!(campaign.complete_quest("Find the blacksmith"));
        assert!(campaign.active_quests.is_empty());
        assert_eq!(campaign.completed_quests, vec!["Find the blacksmith"]);

        // Completing a quest twice is a no-op
        assert!(!campaign.complete_quest("Find the blacksmith"));
        assert_eq!(campaign.completed_quests.len(), 1);
    }
}
