//! Encounter service: combat scenarios and initiative tracking.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use worldweaver_domain::{
    Encounter, EncounterDifficulty, EncounterId, EncounterParticipant, ParticipantId,
};

use crate::infrastructure::ports::{ClockPort, EncounterRepo};

use super::{fts_query, ServiceError};

/// Data for creating an encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEncounterData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub difficulty: EncounterDifficulty,
    #[serde(default)]
    pub participants: Vec<EncounterParticipant>,
    #[serde(default)]
    pub rewards: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_active: bool,
}

impl CreateEncounterData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            location: String::new(),
            difficulty: EncounterDifficulty::Medium,
            participants: Vec::new(),
            rewards: Vec::new(),
            notes: String::new(),
            is_active: false,
        }
    }
}

/// Data for updating an encounter; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEncounterData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub difficulty: Option<EncounterDifficulty>,
    #[serde(default)]
    pub participants: Option<Vec<EncounterParticipant>>,
    #[serde(default)]
    pub rewards: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Data for updating a single participant; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateParticipantData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub initiative: Option<i32>,
    #[serde(default)]
    pub armor_class: Option<i32>,
    #[serde(default)]
    pub hit_points: Option<i32>,
    #[serde(default)]
    pub max_hit_points: Option<i32>,
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Service for handling combat encounters across the application.
pub struct EncounterService {
    repo: Arc<dyn EncounterRepo>,
    clock: Arc<dyn ClockPort>,
    encounters: RwLock<Vec<Encounter>>,
    snapshot: watch::Sender<Vec<Encounter>>,
}

impl EncounterService {
    pub fn new(repo: Arc<dyn EncounterRepo>, clock: Arc<dyn ClockPort>) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            repo,
            clock,
            encounters: RwLock::new(Vec::new()),
            snapshot,
        }
    }

    /// Hydrate the in-memory list from the database.
    pub async fn load(&self) {
        match self.repo.list_all().await {
            Ok(encounters) => {
                *self.encounters.write().await = encounters;
            }
            Err(e) => {
                tracing::error!("Error loading encounters from database: {}", e);
            }
        }
        self.publish().await;
    }

    /// Adds a new encounter and returns its id.
    pub async fn add_encounter(
        &self,
        data: CreateEncounterData,
    ) -> Result<EncounterId, ServiceError> {
        if data.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Encounter name cannot be empty".to_string(),
            ));
        }

        let mut encounter = Encounter::new(
            data.name,
            data.description,
            data.location,
            self.clock.now(),
        )
        .with_difficulty(data.difficulty)
        .with_participants(data.participants)
        .with_rewards(data.rewards)
        .with_notes(data.notes);
        encounter.is_active = data.is_active;

        let id = encounter.id;
        self.encounters.write().await.push(encounter.clone());
        self.persist(&encounter).await;
        self.publish().await;
        Ok(id)
    }

    /// Updates an existing encounter, field by field.
    pub async fn update_encounter(
        &self,
        id: EncounterId,
        data: UpdateEncounterData,
    ) -> Result<Encounter, ServiceError> {
        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "Encounter name cannot be empty".to_string(),
                ));
            }
        }

        let updated = {
            let mut encounters = self.encounters.write().await;
            let encounter = encounters
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(ServiceError::NotFound)?;

            if let Some(name) = data.name {
                encounter.name = name;
            }
            if let Some(description) = data.description {
                encounter.description = description;
            }
            if let Some(location) = data.location {
                encounter.location = location;
            }
            if let Some(difficulty) = data.difficulty {
                encounter.difficulty = difficulty;
            }
            if let Some(participants) = data.participants {
                encounter.participants = participants;
            }
            if let Some(rewards) = data.rewards {
                encounter.rewards = rewards;
            }
            if let Some(notes) = data.notes {
                encounter.notes = notes;
            }
            if let Some(is_active) = data.is_active {
                encounter.is_active = is_active;
            }
            encounter.updated_at = self.clock.now();
            encounter.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Updates a single participant within an encounter.
    pub async fn update_participant(
        &self,
        encounter_id: EncounterId,
        participant_id: ParticipantId,
        data: UpdateParticipantData,
    ) -> Result<Encounter, ServiceError> {
        let updated = {
            let mut encounters = self.encounters.write().await;
            let encounter = encounters
                .iter_mut()
                .find(|e| e.id == encounter_id)
                .ok_or(ServiceError::NotFound)?;
            let participant = encounter
                .participant_mut(participant_id)
                .ok_or(ServiceError::NotFound)?;

            if let Some(name) = data.name {
                participant.name = name;
            }
            if let Some(initiative) = data.initiative {
                participant.initiative = initiative;
            }
            if let Some(armor_class) = data.armor_class {
                participant.armor_class = armor_class;
            }
            if let Some(max_hit_points) = data.max_hit_points {
                participant.max_hit_points = max_hit_points;
            }
            if let Some(hit_points) = data.hit_points {
                // Hit points never go negative
                participant.hit_points = hit_points.max(0);
            }
            if let Some(conditions) = data.conditions {
                participant.conditions = conditions;
            }
            if let Some(notes) = data.notes {
                participant.notes = notes;
            }
            encounter.updated_at = self.clock.now();
            encounter.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Adds a participant to an encounter and returns the participant's id.
    pub async fn add_participant(
        &self,
        encounter_id: EncounterId,
        participant: EncounterParticipant,
    ) -> Result<ParticipantId, ServiceError> {
        let (participant_id, updated) = {
            let mut encounters = self.encounters.write().await;
            let encounter = encounters
                .iter_mut()
                .find(|e| e.id == encounter_id)
                .ok_or(ServiceError::NotFound)?;
            let participant_id = participant.id;
            encounter.add_participant(participant);
            encounter.updated_at = self.clock.now();
            (participant_id, encounter.clone())
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(participant_id)
    }

    /// Removes a participant from an encounter.
    pub async fn remove_participant(
        &self,
        encounter_id: EncounterId,
        participant_id: ParticipantId,
    ) -> Result<Encounter, ServiceError> {
        let updated = {
            let mut encounters = self.encounters.write().await;
            let encounter = encounters
                .iter_mut()
                .find(|e| e.id == encounter_id)
                .ok_or(ServiceError::NotFound)?;
            if !encounter.remove_participant(participant_id) {
                return Err(ServiceError::NotFound);
            }
            encounter.updated_at = self.clock.now();
            encounter.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Apply damage to a participant, clamped at zero hit points.
    pub async fn damage_participant(
        &self,
        encounter_id: EncounterId,
        participant_id: ParticipantId,
        amount: i32,
    ) -> Result<Encounter, ServiceError> {
        self.adjust_participant(encounter_id, participant_id, |p| p.apply_damage(amount))
            .await
    }

    /// Heal a participant, clamped at max hit points.
    pub async fn heal_participant(
        &self,
        encounter_id: EncounterId,
        participant_id: ParticipantId,
        amount: i32,
    ) -> Result<Encounter, ServiceError> {
        self.adjust_participant(encounter_id, participant_id, |p| p.heal(amount))
            .await
    }

    async fn adjust_participant(
        &self,
        encounter_id: EncounterId,
        participant_id: ParticipantId,
        adjust: impl FnOnce(&mut EncounterParticipant),
    ) -> Result<Encounter, ServiceError> {
        let updated = {
            let mut encounters = self.encounters.write().await;
            let encounter = encounters
                .iter_mut()
                .find(|e| e.id == encounter_id)
                .ok_or(ServiceError::NotFound)?;
            let participant = encounter
                .participant_mut(participant_id)
                .ok_or(ServiceError::NotFound)?;
            adjust(participant);
            encounter.updated_at = self.clock.now();
            encounter.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Flags an encounter as active or inactive.
    pub async fn set_encounter_active(
        &self,
        id: EncounterId,
        active: bool,
    ) -> Result<Encounter, ServiceError> {
        self.update_encounter(
            id,
            UpdateEncounterData {
                is_active: Some(active),
                ..Default::default()
            },
        )
        .await
    }

    /// Removes an encounter. Unknown ids are a silent no-op.
    pub async fn remove_encounter(&self, id: EncounterId) {
        self.encounters.write().await.retain(|e| e.id != id);
        if let Err(e) = self.repo.delete(id).await {
            tracing::error!("Error removing encounter from database: {}", e);
        }
        self.publish().await;
    }

    /// Searches encounters: FTS, then LIKE, then the in-memory list.
    pub async fn search_encounters(&self, query: &str) -> Vec<Encounter> {
        let fts = fts_query(query);
        if !fts.is_empty() {
            match self.repo.search_fts(&fts).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching encounters in database: {}", e),
            }
            match self.repo.search_like(query).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching encounters with LIKE: {}", e),
            }
        }

        let needle = query.to_lowercase();
        self.encounters
            .read()
            .await
            .iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&needle)
                    || e.description.to_lowercase().contains(&needle)
                    || e.location.to_lowercase().contains(&needle)
                    || e.notes.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Snapshot of all encounters.
    pub async fn encounters(&self) -> Vec<Encounter> {
        self.encounters.read().await.clone()
    }

    pub async fn get(&self, id: EncounterId) -> Option<Encounter> {
        self.encounters.read().await.iter().find(|e| e.id == id).cloned()
    }

    /// Encounters currently flagged active.
    pub async fn active_encounters(&self) -> Vec<Encounter> {
        self.encounters
            .read()
            .await
            .iter()
            .filter(|e| e.is_active)
            .cloned()
            .collect()
    }

    /// Observe list changes; the receiver holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Encounter>> {
        self.snapshot.subscribe()
    }

    async fn persist(&self, encounter: &Encounter) {
        if let Err(e) = self.repo.save(encounter).await {
            tracing::error!("Error saving encounter to database: {}", e);
        }
    }

    async fn publish(&self) {
        let snapshot = self.encounters.read().await.clone();
        self.snapshot.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockEncounterRepo;
    use worldweaver_domain::ParticipantType;

    fn fixed_clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap()))
    }

    fn saving_repo() -> MockEncounterRepo {
        let mut repo = MockEncounterRepo::new();
        repo.expect_save().returning(|_| Ok(()));
        repo.expect_delete().returning(|_| Ok(()));
        repo
    }

    async fn ambush_service() -> (EncounterService, EncounterId, ParticipantId) {
        let service = EncounterService::new(Arc::new(saving_repo()), fixed_clock());
        let bandit = EncounterParticipant::new("Bandit", ParticipantType::Enemy)
            .with_initiative(12)
            .with_hit_points(11, 11);
        let bandit_id = bandit.id;
        let id = service
            .add_encounter(CreateEncounterData {
                participants: vec![
                    EncounterParticipant::new("Thorne", ParticipantType::PlayerCharacter)
                        .with_initiative(15)
                        .with_hit_points(45, 45),
                    bandit,
                ],
                ..CreateEncounterData::new("Bandit Ambush")
            })
            .await
            .expect("created");
        (service, id, bandit_id)
    }

    #[tokio::test]
    async fn update_participant_touches_only_that_participant() {
        let (service, encounter_id, bandit_id) = ambush_service().await;

        let updated = service
            .update_participant(
                encounter_id,
                bandit_id,
                UpdateParticipantData {
                    conditions: Some(vec!["Poisoned".to_string()]),
                    hit_points: Some(5),
                    ..Default::default()
                },
            )
            .await
            .expect("updated");

        let bandit = updated.participant(bandit_id).expect("bandit");
        assert_eq!(bandit.conditions, vec!["Poisoned"]);
        assert_eq!(bandit.hit_points, 5);
        assert_eq!(updated.participants[0].hit_points, 45);
    }

    #[tokio::test]
    async fn damage_participant_clamps_at_zero() {
        let (service, encounter_id, bandit_id) = ambush_service().await;

        let updated = service
            .damage_participant(encounter_id, bandit_id, 100)
            .await
            .expect("damaged");
        let bandit = updated.participant(bandit_id).expect("bandit");
        assert_eq!(bandit.hit_points, 0);
        assert!(bandit.is_down());
        assert_eq!(updated.standing_participants().len(), 1);
    }

    #[tokio::test]
    async fn unknown_participant_is_not_found() {
        let (service, encounter_id, _) = ambush_service().await;
        let result = service
            .update_participant(
                encounter_id,
                ParticipantId::new(),
                UpdateParticipantData::default(),
            )
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn active_flag_round_trip() {
        let (service, encounter_id, _) = ambush_service().await;
        assert!(service.active_encounters().await.is_empty());

        service
            .set_encounter_active(encounter_id, true)
            .await
            .expect("activated");
        assert_eq!(service.active_encounters().await.len(), 1);

        service
            .set_encounter_active(encounter_id, false)
            .await
            .expect("deactivated");
        assert!(service.active_encounters().await.is_empty());
    }

    #[tokio::test]
    async fn add_and_remove_participant() {
        let (service, encounter_id, bandit_id) = ambush_service().await;

        let archer_id = service
            .add_participant(
                encounter_id,
                EncounterParticipant::new("Skeleton Archer", ParticipantType::Enemy)
                    .with_initiative(13),
            )
            .await
            .expect("added");

        let encounter = service.get(encounter_id).await.expect("exists");
        assert_eq!(encounter.participants.len(), 3);
        assert!(encounter.participant(archer_id).is_some());

        service
            .remove_participant(encounter_id, bandit_id)
            .await
            .expect("removed");
        let encounter = service.get(encounter_id).await.expect("exists");
        assert_eq!(encounter.participants.len(), 2);
        assert!(encounter.participant(bandit_id).is_none());
    }

    #[tokio::test]
    async fn initiative_order_reflects_participant_updates() {
        let (service, encounter_id, bandit_id) = ambush_service().await;

        service
            .update_participant(
                encounter_id,
                bandit_id,
                UpdateParticipantData {
                    initiative: Some(20),
                    ..Default::default()
                },
            )
            .await
            .expect("updated");

        let encounter = service.get(encounter_id).await.expect("exists");
        let order: Vec<&str> = encounter
            .initiative_order()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(order, vec!["Bandit", "Thorne"]);
    }
}
