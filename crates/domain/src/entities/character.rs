//! Character entity - player characters, NPCs, and monsters
//!
//! A character record carries the D&D attributes a game master needs at the
//! table: ability scores, hit points, proficiencies, inventory, and optional
//! spellcasting. Derived numbers (modifiers, save DCs) are computed through
//! the `dnd5e` rules module rather than stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dnd5e;
use crate::error::DomainError;
use crate::ids::CharacterId;

/// The kind of entity a character record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CharacterType {
    PlayerCharacter,
    NonPlayerCharacter,
    Monster,
}

impl CharacterType {
    pub fn all() -> &'static [CharacterType] {
        &[
            CharacterType::PlayerCharacter,
            CharacterType::NonPlayerCharacter,
            CharacterType::Monster,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CharacterType::PlayerCharacter => "Player Character",
            CharacterType::NonPlayerCharacter => "NPC",
            CharacterType::Monster => "Monster",
        }
    }

    /// String representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterType::PlayerCharacter => "player_character",
            CharacterType::NonPlayerCharacter => "non_player_character",
            CharacterType::Monster => "monster",
        }
    }
}

impl std::str::FromStr for CharacterType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player_character" | "pc" => Ok(CharacterType::PlayerCharacter),
            "non_player_character" | "npc" => Ok(CharacterType::NonPlayerCharacter),
            "monster" => Ok(CharacterType::Monster),
            _ => Err(DomainError::parse(format!(
                "Invalid character type '{}'. Valid types: player_character, non_player_character, monster",
                s
            ))),
        }
    }
}

impl std::fmt::Display for CharacterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The six D&D ability scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn all() -> &'static [Ability] {
        &[
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }

    /// Conventional three-letter abbreviation (STR, DEX, ...)
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }
}

impl std::str::FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" | "str" => Ok(Ability::Strength),
            "dexterity" | "dex" => Ok(Ability::Dexterity),
            "constitution" | "con" => Ok(Ability::Constitution),
            "intelligence" | "int" => Ok(Ability::Intelligence),
            "wisdom" | "wis" => Ok(Ability::Wisdom),
            "charisma" | "cha" => Ok(Ability::Charisma),
            _ => Err(DomainError::parse(format!("Invalid ability '{}'", s))),
        }
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The six ability scores of a character.
///
/// Scores are bounded by convention (3..=20 for most characters), not
/// enforcement; the record stores whatever the GM enters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AbilityScores {
    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set_score(&mut self, ability: Ability, score: i32) {
        match ability {
            Ability::Strength => self.strength = score,
            Ability::Dexterity => self.dexterity = score,
            Ability::Constitution => self.constitution = score,
            Ability::Intelligence => self.intelligence = score,
            Ability::Wisdom => self.wisdom = score,
            Ability::Charisma => self.charisma = score,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        dnd5e::ability_modifier(self.score(ability))
    }
}

/// The nine-point alignment grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    LawfulGood,
    NeutralGood,
    ChaoticGood,
    LawfulNeutral,
    TrueNeutral,
    ChaoticNeutral,
    LawfulEvil,
    NeutralEvil,
    ChaoticEvil,
}

impl Alignment {
    pub fn all() -> &'static [Alignment] {
        &[
            Alignment::LawfulGood,
            Alignment::NeutralGood,
            Alignment::ChaoticGood,
            Alignment::LawfulNeutral,
            Alignment::TrueNeutral,
            Alignment::ChaoticNeutral,
            Alignment::LawfulEvil,
            Alignment::NeutralEvil,
            Alignment::ChaoticEvil,
        ]
    }

    /// String representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::LawfulGood => "lawful_good",
            Alignment::NeutralGood => "neutral_good",
            Alignment::ChaoticGood => "chaotic_good",
            Alignment::LawfulNeutral => "lawful_neutral",
            Alignment::TrueNeutral => "true_neutral",
            Alignment::ChaoticNeutral => "chaotic_neutral",
            Alignment::LawfulEvil => "lawful_evil",
            Alignment::NeutralEvil => "neutral_evil",
            Alignment::ChaoticEvil => "chaotic_evil",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Alignment::LawfulGood => "Lawful Good",
            Alignment::NeutralGood => "Neutral Good",
            Alignment::ChaoticGood => "Chaotic Good",
            Alignment::LawfulNeutral => "Lawful Neutral",
            Alignment::TrueNeutral => "True Neutral",
            Alignment::ChaoticNeutral => "Chaotic Neutral",
            Alignment::LawfulEvil => "Lawful Evil",
            Alignment::NeutralEvil => "Neutral Evil",
            Alignment::ChaoticEvil => "Chaotic Evil",
        }
    }
}

impl std::str::FromStr for Alignment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "lawful_good" => Ok(Alignment::LawfulGood),
            "neutral_good" => Ok(Alignment::NeutralGood),
            "chaotic_good" => Ok(Alignment::ChaoticGood),
            "lawful_neutral" => Ok(Alignment::LawfulNeutral),
            "true_neutral" | "neutral" => Ok(Alignment::TrueNeutral),
            "chaotic_neutral" => Ok(Alignment::ChaoticNeutral),
            "lawful_evil" => Ok(Alignment::LawfulEvil),
            "neutral_evil" => Ok(Alignment::NeutralEvil),
            "chaotic_evil" => Ok(Alignment::ChaoticEvil),
            _ => Err(DomainError::parse(format!("Invalid alignment '{}'", s))),
        }
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Spellcasting details for casters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spellcasting {
    /// Ability used for spell save DC and attack rolls
    pub casting_ability: Ability,
    /// Names of known or prepared spells
    pub known_spells: Vec<String>,
    /// Spell slots per spell level (index 0 = level 1 slots)
    pub slots_per_level: Vec<u8>,
}

impl Spellcasting {
    pub fn new(casting_ability: Ability) -> Self {
        Self {
            casting_ability,
            known_spells: Vec::new(),
            slots_per_level: Vec::new(),
        }
    }

    pub fn with_known_spells(mut self, known_spells: Vec<String>) -> Self {
        self.known_spells = known_spells;
        self
    }

    pub fn with_slots(mut self, slots_per_level: Vec<u8>) -> Self {
        self.slots_per_level = slots_per_level;
        self
    }
}

/// A player character, NPC, or monster record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub character_type: CharacterType,
    pub race: String,
    /// Class name; empty for most monsters
    pub class_name: String,
    pub subclass: String,
    pub level: i32,
    pub experience_points: i32,
    pub ability_scores: AbilityScores,
    pub hit_points: i32,
    pub max_hit_points: i32,
    pub armor_class: i32,
    pub background: String,
    pub alignment: Alignment,
    pub description: String,
    /// Skill, save, and tool proficiencies
    pub proficiencies: Vec<String>,
    /// Carried items, free-form
    pub inventory: Vec<String>,
    /// Class features, racial traits, and monster abilities
    pub features: Vec<String>,
    pub spellcasting: Option<Spellcasting>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        character_type: CharacterType,
        race: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            character_type,
            race: race.into(),
            class_name: String::new(),
            subclass: String::new(),
            level: 1,
            experience_points: 0,
            ability_scores: AbilityScores::default(),
            hit_points: 10,
            max_hit_points: 10,
            armor_class: 10,
            background: String::new(),
            alignment: Alignment::TrueNeutral,
            description: String::new(),
            proficiencies: Vec::new(),
            inventory: Vec::new(),
            features: Vec::new(),
            spellcasting: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_class(mut self, class_name: impl Into<String>, subclass: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self.subclass = subclass.into();
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn with_ability_scores(mut self, scores: AbilityScores) -> Self {
        self.ability_scores = scores;
        self
    }

    pub fn with_hit_points(mut self, hit_points: i32, max_hit_points: i32) -> Self {
        self.hit_points = hit_points;
        self.max_hit_points = max_hit_points;
        self
    }

    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_proficiencies(mut self, proficiencies: Vec<String>) -> Self {
        self.proficiencies = proficiencies;
        self
    }

    pub fn with_inventory(mut self, inventory: Vec<String>) -> Self {
        self.inventory = inventory;
        self
    }

    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = features;
        self
    }

    pub fn with_spellcasting(mut self, spellcasting: Spellcasting) -> Self {
        self.spellcasting = Some(spellcasting);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Modifier for one of the six abilities
    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        self.ability_scores.modifier(ability)
    }

    /// Proficiency bonus derived from level
    pub fn proficiency_bonus(&self) -> i32 {
        dnd5e::proficiency_bonus(self.level)
    }

    /// Spell save DC, if the character is a caster
    pub fn spell_save_dc(&self) -> Option<i32> {
        self.spellcasting.as_ref().map(|sc| {
            dnd5e::spell_save_dc(self.ability_scores.score(sc.casting_ability), self.level)
        })
    }

    /// Spell attack bonus, if the character is a caster
    pub fn spell_attack_bonus(&self) -> Option<i32> {
        self.spellcasting.as_ref().map(|sc| {
            dnd5e::spell_attack_bonus(self.ability_scores.score(sc.casting_ability), self.level)
        })
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

    /// Add experience points and re-derive level from the XP table.
    ///
    /// Returns the new level.
    pub fn add_experience(&mut self, amount: i32) -> i32 {
        self.experience_points += amount.max(0);
        self.level = dnd5e::level_from_xp(self.experience_points);
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn fighter() -> Character {
        Character::new(
            "Thorne Ironheart",
            CharacterType::PlayerCharacter,
            "Dwarf",
            fixed_time(),
        )
        .with_class("Fighter", "Champion")
        .with_level(5)
        .with_ability_scores(AbilityScores::new(16, 12, 18, 10, 14, 8))
        .with_hit_points(45, 45)
        .with_armor_class(18)
        .with_alignment(Alignment::LawfulGood)
    }

    #[test]
    fn test_character_defaults() {
        let character = Character::new("Goblin", CharacterType::Monster, "Goblin", fixed_time());
        assert_eq!(character.level, 1);
        assert_eq!(character.hit_points, 10);
        assert_eq!(character.ability_scores, AbilityScores::default());
        assert_eq!(character.alignment, Alignment::TrueNeutral);
        assert!(character.spellcasting.is_none());
    }

    #[test]
    fn test_ability_modifiers() {
        let character = fighter();
        assert_eq!(character.ability_modifier(Ability::Strength), 3);
        assert_eq!(character.ability_modifier(Ability::Constitution), 4);
        assert_eq!(character.ability_modifier(Ability::Charisma), -1);
        assert_eq!(character.proficiency_bonus(), 3);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut character = fighter();
        character.apply_damage(50);
        assert_eq!(character.hit_points, 0);
        assert!(character.is_down());

        // Negative damage is ignored, not healing in disguise
        character.apply_damage(-5);
        assert_eq!(character.hit_points, 0);
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut character = fighter();
        character.apply_damage(20);
        character.heal(100);
        assert_eq!(character.hit_points, 45);
        assert!(!character.is_down());
    }

    #[test]
    fn test_spellcasting_derived_values() {
        let wizard = Character::new(
            "Elara Nightshade",
            CharacterType::NonPlayerCharacter,
            "Elf",
            fixed_time(),
        )
        .with_class("Wizard", "")
        .with_level(7)
        .with_ability_scores(AbilityScores::new(8, 14, 12, 18, 16, 14))
        .with_spellcasting(
            Spellcasting::new(Ability::Intelligence)
                .with_known_spells(vec!["Fireball".to_string(), "Shield".to_string()])
                .with_slots(vec![4, 3, 3, 1]),
        );

        assert_eq!(wizard.spell_save_dc(), Some(15));
        assert_eq!(wizard.spell_attack_bonus(), Some(7));

        let fighter = fighter();
        assert_eq!(fighter.spell_save_dc(), None);
    }

    #[test]
    fn test_add_experience_levels_up() {
        let mut character = fighter();
        character.experience_points = 6400;
        assert_eq!(character.add_experience(100), 5);
        assert_eq!(character.add_experience(7500), 6);
        assert_eq!(character.experience_points, 14000);
    }

    #[test]
    fn test_character_serde_round_trip() {
        let wizard = Character::new(
            "Elara Nightshade",
            CharacterType::NonPlayerCharacter,
            "Elf",
            fixed_time(),
        )
        .with_spellcasting(Spellcasting::new(Ability::Intelligence).with_slots(vec![4, 3]));

        let json = serde_json::to_string(&wizard).unwrap();
        // Field names follow the camelCase wire convention
        assert!(json.contains("\"characterType\":\"nonPlayerCharacter\""));
        assert!(json.contains("\"castingAbility\":\"intelligence\""));

        let decoded: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, wizard);
    }

    #[test]
    fn test_character_type_from_str() {
        assert_eq!(
            "npc".parse::<CharacterType>().unwrap(),
            CharacterType::NonPlayerCharacter
        );
        assert_eq!(
            "MONSTER".parse::<CharacterType>().unwrap(),
            CharacterType::Monster
        );
        assert!("dragon".parse::<CharacterType>().is_err());
    }

    #[test]
    fn test_alignment_from_str() {
        assert_eq!(
            "Lawful Good".parse::<Alignment>().unwrap(),
            Alignment::LawfulGood
        );
        assert_eq!(
            "chaotic_evil".parse::<Alignment>().unwrap(),
            Alignment::ChaoticEvil
        );
        assert_eq!("neutral".parse::<Alignment>().unwrap(), Alignment::TrueNeutral);
        assert!("good".parse::<Alignment>().is_err());
    }
}
