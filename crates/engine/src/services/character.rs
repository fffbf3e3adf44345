//! Character service: PCs, NPCs, and monsters.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use worldweaver_domain::{
    AbilityScores, Alignment, Character, CharacterId, CharacterType, Spellcasting,
};

use crate::infrastructure::ports::{CharacterRepo, ClockPort};

use super::{fts_query, ServiceError};

/// Data for creating a character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCharacterData {
    pub name: String,
    pub character_type: CharacterType,
    pub race: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub subclass: Option<String>,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub experience_points: Option<i32>,
    #[serde(default)]
    pub ability_scores: Option<AbilityScores>,
    #[serde(default)]
    pub hit_points: Option<i32>,
    #[serde(default)]
    pub max_hit_points: Option<i32>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub alignment: Option<Alignment>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub proficiencies: Option<Vec<String>>,
    #[serde(default)]
    pub inventory: Option<Vec<String>>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub spellcasting: Option<Spellcasting>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateCharacterData {
    /// Minimal creation data; everything else keeps entity defaults.
    pub fn new(
        name: impl Into<String>,
        character_type: CharacterType,
        race: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            character_type,
            race: race.into(),
            class_name: None,
            subclass: None,
            level: None,
            experience_points: None,
            ability_scores: None,
            hit_points: None,
            max_hit_points: None,
            armor_class: None,
            background: None,
            alignment: None,
            description: None,
            proficiencies: None,
            inventory: None,
            features: None,
            spellcasting: None,
            notes: None,
        }
    }
}

/// Data for updating a character; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCharacterData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub character_type: Option<CharacterType>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub subclass: Option<String>,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub experience_points: Option<i32>,
    #[serde(default)]
    pub ability_scores: Option<AbilityScores>,
    #[serde(default)]
    pub hit_points: Option<i32>,
    #[serde(default)]
    pub max_hit_points: Option<i32>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub alignment: Option<Alignment>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub proficiencies: Option<Vec<String>>,
    #[serde(default)]
    pub inventory: Option<Vec<String>>,
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub spellcasting: Option<Spellcasting>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Service for handling character information across the application.
pub struct CharacterService {
    repo: Arc<dyn CharacterRepo>,
    clock: Arc<dyn ClockPort>,
    characters: RwLock<Vec<Character>>,
    snapshot: watch::Sender<Vec<Character>>,
}

impl CharacterService {
    pub fn new(repo: Arc<dyn CharacterRepo>, clock: Arc<dyn ClockPort>) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            repo,
            clock,
            characters: RwLock::new(Vec::new()),
            snapshot,
        }
    }

    /// Hydrate the in-memory list from the database.
    pub async fn load(&self) {
        match self.repo.list_all().await {
            Ok(characters) => {
                *self.characters.write().await = characters;
            }
            Err(e) => {
                tracing::error!("Error loading characters from database: {}", e);
            }
        }
        self.publish().await;
    }

    /// Adds a new character and returns its id.
    pub async fn add_character(
        &self,
        data: CreateCharacterData,
    ) -> Result<CharacterId, ServiceError> {
        if data.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Character name cannot be empty".to_string(),
            ));
        }

        let mut character =
            Character::new(data.name, data.character_type, data.race, self.clock.now());

        if let Some(class_name) = data.class_name {
            character.class_name = class_name;
        }
        if let Some(subclass) = data.subclass {
            character.subclass = subclass;
        }
        if let Some(level) = data.level {
            character.level = level;
        }
        if let Some(experience_points) = data.experience_points {
            character.experience_points = experience_points;
        }
        if let Some(ability_scores) = data.ability_scores {
            character.ability_scores = ability_scores;
        }
        // Max hit points alone implies full health
        if let Some(max) = data.max_hit_points {
            character.max_hit_points = max;
            character.hit_points = data.hit_points.unwrap_or(max);
        } else if let Some(hit_points) = data.hit_points {
            character.hit_points = hit_points;
        }
        if let Some(armor_class) = data.armor_class {
            character.armor_class = armor_class;
        }
        if let Some(background) = data.background {
            character.background = background;
        }
        if let Some(alignment) = data.alignment {
            character.alignment = alignment;
        }
        if let Some(description) = data.description {
            character.description = description;
        }
        if let Some(proficiencies) = data.proficiencies {
            character.proficiencies = proficiencies;
        }
        if let Some(inventory) = data.inventory {
            character.inventory = inventory;
        }
        if let Some(features) = data.features {
            character.features = features;
        }
        if let Some(spellcasting) = data.spellcasting {
            character.spellcasting = Some(spellcasting);
        }
        if let Some(notes) = data.notes {
            character.notes = notes;
        }

        let id = character.id;
        self.characters.write().await.push(character.clone());
        self.persist(&character).await;
        self.publish().await;
        Ok(id)
    }

    /// Updates an existing character, field by field.
    pub async fn update_character(
        &self,
        id: CharacterId,
        data: UpdateCharacterData,
    ) -> Result<Character, ServiceError> {
        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "Character name cannot be empty".to_string(),
                ));
            }
        }

        let updated = {
            let mut characters = self.characters.write().await;
            let character = characters
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(ServiceError::NotFound)?;

            if let Some(name) = data.name {
                character.name = name;
            }
            if let Some(character_type) = data.character_type {
                character.character_type = character_type;
            }
            if let Some(race) = data.race {
                character.race = race;
            }
            if let Some(class_name) = data.class_name {
                character.class_name = class_name;
            }
            if let Some(subclass) = data.subclass {
                character.subclass = subclass;
            }
            if let Some(level) = data.level {
                character.level = level;
            }
            if let Some(experience_points) = data.experience_points {
                character.experience_points = experience_points;
            }
            if let Some(ability_scores) = data.ability_scores {
                character.ability_scores = ability_scores;
            }
            if let Some(max_hit_points) = data.max_hit_points {
                character.max_hit_points = max_hit_points;
            }
            if let Some(hit_points) = data.hit_points {
                // Hit points never go negative
                character.hit_points = hit_points.max(0);
            }
            if let Some(armor_class) = data.armor_class {
                character.armor_class = armor_class;
            }
            if let Some(background) = data.background {
                character.background = background;
            }
            if let Some(alignment) = data.alignment {
                character.alignment = alignment;
            }
            if let Some(description) = data.description {
                character.description = description;
            }
            if let Some(proficiencies) = data.proficiencies {
                character.proficiencies = proficiencies;
            }
            if let Some(inventory) = data.inventory {
                character.inventory = inventory;
            }
            if let Some(features) = data.features {
                character.features = features;
            }
            if let Some(spellcasting) = data.spellcasting {
                character.spellcasting = Some(spellcasting);
            }
            if let Some(notes) = data.notes {
                character.notes = notes;
            }
            character.updated_at = self.clock.now();
            character.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Remove a character's spellcasting block entirely.
    ///
    /// `update_character` can only overwrite spellcasting, not clear it.
    pub async fn clear_spellcasting(&self, id: CharacterId) -> Result<Character, ServiceError> {
        let updated = {
            let mut characters = self.characters.write().await;
            let character = characters
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(ServiceError::NotFound)?;
            character.spellcasting = None;
            character.updated_at = self.clock.now();
            character.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Apply damage to a character, clamped at zero hit points.
    pub async fn damage_character(
        &self,
        id: CharacterId,
        amount: i32,
    ) -> Result<Character, ServiceError> {
        self.adjust_hit_points(id, |c| c.apply_damage(amount)).await
    }

    /// Heal a character, clamped at max hit points.
    pub async fn heal_character(
        &self,
        id: CharacterId,
        amount: i32,
    ) -> Result<Character, ServiceError> {
        self.adjust_hit_points(id, |c| c.heal(amount)).await
    }

    async fn adjust_hit_points(
        &self,
        id: CharacterId,
        adjust: impl FnOnce(&mut Character),
    ) -> Result<Character, ServiceError> {
        let updated = {
            let mut characters = self.characters.write().await;
            let character = characters
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(ServiceError::NotFound)?;
            adjust(character);
            character.updated_at = self.clock.now();
            character.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Removes a character. Unknown ids are a silent no-op.
    pub async fn remove_character(&self, id: CharacterId) {
        self.characters.write().await.retain(|c| c.id != id);
        if let Err(e) = self.repo.delete(id).await {
            tracing::error!("Error removing character from database: {}", e);
        }
        self.publish().await;
    }

    /// Searches characters: FTS, then LIKE, then the in-memory list.
    pub async fn search_characters(&self, query: &str) -> Vec<Character> {
        let fts = fts_query(query);
        if !fts.is_empty() {
            match self.repo.search_fts(&fts).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching characters in database: {}", e),
            }
            match self.repo.search_like(query).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching characters with LIKE: {}", e),
            }
        }

        let needle = query.to_lowercase();
        self.characters
            .read()
            .await
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle)
                    || c.notes.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Snapshot of all characters.
    pub async fn characters(&self) -> Vec<Character> {
        self.characters.read().await.clone()
    }

    pub async fn get(&self, id: CharacterId) -> Option<Character> {
        self.characters.read().await.iter().find(|c| c.id == id).cloned()
    }

    pub async fn characters_by_type(&self, character_type: CharacterType) -> Vec<Character> {
        self.characters
            .read()
            .await
            .iter()
            .filter(|c| c.character_type == character_type)
            .cloned()
            .collect()
    }

    pub async fn player_characters(&self) -> Vec<Character> {
        self.characters_by_type(CharacterType::PlayerCharacter).await
    }

    pub async fn non_player_characters(&self) -> Vec<Character> {
        self.characters_by_type(CharacterType::NonPlayerCharacter).await
    }

    pub async fn monsters(&self) -> Vec<Character> {
        self.characters_by_type(CharacterType::Monster).await
    }

    /// Observe list changes; the receiver holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Character>> {
        self.snapshot.subscribe()
    }

    async fn persist(&self, character: &Character) {
        if let Err(e) = self.repo.save(character).await {
            tracing::error!("Error saving character to database: {}", e);
        }
    }

    async fn publish(&self) {
        let snapshot = self.characters.read().await.clone();
        self.snapshot.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockCharacterRepo;
    use worldweaver_domain::Ability;

    fn fixed_clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap()))
    }

    fn saving_repo() -> MockCharacterRepo {
        let mut repo = MockCharacterRepo::new();
        repo.expect_save().returning(|_| Ok(()));
        repo
    }

    #[tokio::test]
    async fn add_character_defaults_hit_points_to_max() {
        let service = CharacterService::new(Arc::new(saving_repo()), fixed_clock());
        let id = service
            .add_character(CreateCharacterData {
                max_hit_points: Some(45),
                ..CreateCharacterData::new(
                    "Thorne Ironheart",
                    CharacterType::PlayerCharacter,
                    "Dwarf",
                )
            })
            .await
            .expect("created");

        let character = service.get(id).await.expect("exists");
        assert_eq!(character.hit_points, 45);
        assert_eq!(character.max_hit_points, 45);
    }

    #[tokio::test]
    async fn update_character_leaves_other_fields_unchanged() {
        let service = CharacterService::new(Arc::new(saving_repo()), fixed_clock());
        let id = service
            .add_character(CreateCharacterData {
                level: Some(5),
                class_name: Some("Fighter".to_string()),
                ..CreateCharacterData::new(
                    "Thorne Ironheart",
                    CharacterType::PlayerCharacter,
                    "Dwarf",
                )
            })
            .await
            .expect("created");

        let updated = service
            .update_character(
                id,
                UpdateCharacterData {
                    hit_points: Some(30),
                    ..Default::default()
                },
            )
            .await
            .expect("updated");

        assert_eq!(updated.hit_points, 30);
        assert_eq!(updated.level, 5);
        assert_eq!(updated.class_name, "Fighter");
    }

    #[tokio::test]
    async fn update_negative_hit_points_clamps_to_zero() {
        let service = CharacterService::new(Arc::new(saving_repo()), fixed_clock());
        let id = service
            .add_character(CreateCharacterData::new(
                "Goblin",
                CharacterType::Monster,
                "Goblin",
            ))
            .await
            .expect("created");

        let updated = service
            .update_character(
                id,
                UpdateCharacterData {
                    hit_points: Some(-7),
                    ..Default::default()
                },
            )
            .await
            .expect("updated");
        assert_eq!(updated.hit_points, 0);
    }

    #[tokio::test]
    async fn damage_and_heal_respect_clamps() {
        let service = CharacterService::new(Arc::new(saving_repo()), fixed_clock());
        let id = service
            .add_character(CreateCharacterData {
                max_hit_points: Some(20),
                ..CreateCharacterData::new("Bandit", CharacterType::Monster, "Human")
            })
            .await
            .expect("created");

        let damaged = service.damage_character(id, 50).await.expect("damaged");
        assert_eq!(damaged.hit_points, 0);
        assert!(damaged.is_down());

        let healed = service.heal_character(id, 100).await.expect("healed");
        assert_eq!(healed.hit_points, 20);
    }

    #[tokio::test]
    async fn clear_spellcasting_removes_the_block() {
        let service = CharacterService::new(Arc::new(saving_repo()), fixed_clock());
        let id = service
            .add_character(CreateCharacterData {
                spellcasting: Some(Spellcasting::new(Ability::Intelligence)),
                ..CreateCharacterData::new("Elara", CharacterType::NonPlayerCharacter, "Elf")
            })
            .await
            .expect("created");

        let cleared = service.clear_spellcasting(id).await.expect("cleared");
        assert!(cleared.spellcasting.is_none());
    }

    #[tokio::test]
    async fn type_filters_partition_the_roster() {
        let service = CharacterService::new(Arc::new(saving_repo()), fixed_clock());
        for (name, character_type) in [
            ("Thorne", CharacterType::PlayerCharacter),
            ("Elara", CharacterType::NonPlayerCharacter),
            ("Grommash", CharacterType::Monster),
            ("Skeleton", CharacterType::Monster),
        ] {
            service
                .add_character(CreateCharacterData::new(name, character_type, "x"))
                .await
                .expect("created");
        }

        assert_eq!(service.player_characters().await.len(), 1);
        assert_eq!(service.non_player_characters().await.len(), 1);
        assert_eq!(service.monsters().await.len(), 2);
    }

    #[tokio::test]
    async fn remove_character_forgets_it() {
        let mut repo = saving_repo();
        repo.expect_delete().times(1).returning(|_| Ok(()));

        let service = CharacterService::new(Arc::new(repo), fixed_clock());
        let id = service
            .add_character(CreateCharacterData::new(
                "Doomed",
                CharacterType::Monster,
                "Rat",
            ))
            .await
            .expect("created");

        service.remove_character(id).await;
        assert!(service.get(id).await.is_none());
    }
}
