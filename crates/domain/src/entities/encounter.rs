//! Encounter entity - combat scenarios with initiative tracking
//!
//! An encounter is an ordered roster of participants. Initiative order is
//! derived on demand (descending initiative, stable for ties) rather than
//! stored, so edits to participants never leave a stale ordering behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{EncounterId, ParticipantId};

/// Encounter difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum EncounterDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Deadly,
}

impl EncounterDifficulty {
    pub fn all() -> &'static [EncounterDifficulty] {
        &[
            EncounterDifficulty::Easy,
            EncounterDifficulty::Medium,
            EncounterDifficulty::Hard,
            EncounterDifficulty::Deadly,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EncounterDifficulty::Easy => "Easy",
            EncounterDifficulty::Medium => "Medium",
            EncounterDifficulty::Hard => "Hard",
            EncounterDifficulty::Deadly => "Deadly",
        }
    }

    /// String representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            EncounterDifficulty::Easy => "easy",
            EncounterDifficulty::Medium => "medium",
            EncounterDifficulty::Hard => "hard",
            EncounterDifficulty::Deadly => "deadly",
        }
    }
}

impl std::str::FromStr for EncounterDifficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(EncounterDifficulty::Easy),
            "medium" => Ok(EncounterDifficulty::Medium),
            "hard" => Ok(EncounterDifficulty::Hard),
            "deadly" => Ok(EncounterDifficulty::Deadly),
            _ => Err(DomainError::parse(format!(
                "Invalid difficulty '{}'. Valid difficulties: easy, medium, hard, deadly",
                s
            ))),
        }
    }
}

impl std::fmt::Display for EncounterDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which side a participant fights on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticipantType {
    PlayerCharacter,
    Ally,
    Enemy,
}

impl ParticipantType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ParticipantType::PlayerCharacter => "Player Character",
            ParticipantType::Ally => "Ally",
            ParticipantType::Enemy => "Enemy",
        }
    }

    /// String representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantType::PlayerCharacter => "player_character",
            ParticipantType::Ally => "ally",
            ParticipantType::Enemy => "enemy",
        }
    }
}

impl std::str::FromStr for ParticipantType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player_character" | "pc" => Ok(ParticipantType::PlayerCharacter),
            "ally" => Ok(ParticipantType::Ally),
            "enemy" => Ok(ParticipantType::Enemy),
            _ => Err(DomainError::parse(format!(
                "Invalid participant type '{}'. Valid types: player_character, ally, enemy",
                s
            ))),
        }
    }
}

/// A combatant in an encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterParticipant {
    pub id: ParticipantId,
    pub name: String,
    pub participant_type: ParticipantType,
    pub initiative: i32,
    pub armor_class: i32,
    pub hit_points: i32,
    pub max_hit_points: i32,
    /// Active conditions ("Poisoned", "Stunned", ...)
    pub conditions: Vec<String>,
    pub notes: String,
}

impl EncounterParticipant {
    pub fn new(name: impl Into<String>, participant_type: ParticipantType) -> Self {
        Self {
            id: ParticipantId::new(),
            name: name.into(),
            participant_type,
            initiative: 0,
            armor_class: 10,
            hit_points: 10,
            max_hit_points: 10,
            conditions: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    pub fn with_hit_points(mut self, hit_points: i32, max_hit_points: i32) -> Self {
        self.hit_points = hit_points;
        self.max_hit_points = max_hit_points;
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<String>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Reduce hit points, never below zero
    pub fn apply_damage(&mut self, amount: i32) {
        self.hit_points = (self.hit_points - amount.max(0)).max(0);
    }

    /// Restore hit points, never above the maximum
    pub fn heal(&mut self, amount: i32) {
        self.hit_points = (self.hit_points + amount.max(0)).min(self.max_hit_points);
    }

    pub fn is_down(&self) -> bool {
        self.hit_points == 0
    }
}

/// A combat scenario with ordered participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: EncounterId,
    pub name: String,
    pub description: String,
    /// Location name or id where the encounter takes place
    pub location: String,
    pub difficulty: EncounterDifficulty,
    pub participants: Vec<EncounterParticipant>,
    /// XP, treasure, quest items
    pub rewards: Vec<String>,
    pub notes: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Encounter {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EncounterId::new(),
            name: name.into(),
            description: description.into(),
            location: location.into(),
            difficulty: EncounterDifficulty::Medium,
            participants: Vec::new(),
            rewards: Vec::new(),
            notes: String::new(),
            is_active: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_difficulty(mut self, difficulty: EncounterDifficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_participants(mut self, participants: Vec<EncounterParticipant>) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_rewards(mut self, rewards: Vec<String>) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn add_participant(&mut self, participant: EncounterParticipant) {
        self.participants.push(participant);
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&EncounterParticipant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut EncounterParticipant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    pub fn remove_participant(&mut self, id: ParticipantId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != id);
        self.participants.len() != before
    }

    /// Participants in initiative order: highest first, ties keep roster order.
    pub fn initiative_order(&self) -> Vec<&EncounterParticipant> {
        let mut ordered: Vec<&EncounterParticipant> = self.participants.iter().collect();
        ordered.sort_by_key(|p| std::cmp::Reverse(p.initiative));
        ordered
    }

    /// Participants still standing (hit points above zero)
    pub fn standing_participants(&self) -> Vec<&EncounterParticipant> {
        self.participants.iter().filter(|p| !p.is_down()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn ambush() -> Encounter {
        Encounter::new(
            "Bandit Ambush",
            "Bandits ambush the party on the road.",
            "Forest Road",
            fixed_time(),
        )
        .with_difficulty(EncounterDifficulty::Easy)
        .with_participants(vec![
            EncounterParticipant::new("Thorne Ironheart", ParticipantType::PlayerCharacter)
                .with_initiative(15)
                .with_hit_points(45, 45),
            EncounterParticipant::new("Bandit Leader", ParticipantType::Enemy)
                .with_initiative(16)
                .with_hit_points(32, 32),
            EncounterParticipant::new("Bandit 1", ParticipantType::Enemy)
                .with_initiative(12)
                .with_hit_points(11, 11),
            EncounterParticipant::new("Bandit 2", ParticipantType::Enemy)
                .with_initiative(12)
                .with_hit_points(11, 11),
        ])
    }

    #[test]
    fn test_initiative_order_descending_stable() {
        let encounter = ambush();
        let order: Vec<&str> = encounter
            .initiative_order()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        // Ties (the two bandits at 12) keep roster order
        assert_eq!(
            order,
            vec!["Bandit Leader", "Thorne Ironheart", "Bandit 1", "Bandit 2"]
        );
    }

    #[test]
    fn test_participant_damage_and_standing() {
        let mut encounter = ambush();
        let bandit_id = encounter.participants[2].id;

        encounter
            .participant_mut(bandit_id)
            .expect("bandit exists")
            .apply_damage(20);

        let bandit = encounter.participant(bandit_id).expect("bandit exists");
        assert_eq!(bandit.hit_points, 0);
        assert!(bandit.is_down());
        assert_eq!(encounter.standing_participants().len(), 3);
    }

    #[test]
    fn test_remove_participant() {
        let mut encounter = ambush();
        let id = encounter.participants[0].id;
        assert!(encounter.remove_participant(id));
        assert!(!encounter.remove_participant(id));
        assert_eq!(encounter.participants.len(), 3);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!(
            "deadly".parse::<EncounterDifficulty>().unwrap(),
            EncounterDifficulty::Deadly
        );
        assert!("impossible".parse::<EncounterDifficulty>().is_err());
    }
}
