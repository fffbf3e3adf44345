//! Campaign service: campaign CRUD, search, and active-campaign tracking.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use worldweaver_domain::{Campaign, CampaignId};

use crate::infrastructure::ports::{CampaignRepo, ClockPort};

use super::{fts_query, ServiceError};

/// Data for creating a campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCampaignData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub player_characters: Vec<String>,
    #[serde(default)]
    pub active_quests: Vec<String>,
    #[serde(default)]
    pub completed_quests: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

/// Data for updating a campaign; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCampaignData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub setting: Option<String>,
    #[serde(default)]
    pub player_characters: Option<Vec<String>>,
    #[serde(default)]
    pub active_quests: Option<Vec<String>>,
    #[serde(default)]
    pub completed_quests: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Service for handling campaign information across the application.
///
/// Tracks which campaign is active; the active id is cleared when the
/// campaign it points to is removed.
pub struct CampaignService {
    repo: Arc<dyn CampaignRepo>,
    clock: Arc<dyn ClockPort>,
    campaigns: RwLock<Vec<Campaign>>,
    active_campaign_id: RwLock<Option<CampaignId>>,
    snapshot: watch::Sender<Vec<Campaign>>,
}

impl CampaignService {
    pub fn new(repo: Arc<dyn CampaignRepo>, clock: Arc<dyn ClockPort>) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            repo,
            clock,
            campaigns: RwLock::new(Vec::new()),
            active_campaign_id: RwLock::new(None),
            snapshot,
        }
    }

    /// Hydrate the in-memory list from the database.
    ///
    /// A load failure leaves the list empty; the session still works, it
    /// just starts blank. If no campaign is active yet the first loaded
    /// campaign becomes active, matching the desktop app's startup behavior.
    pub async fn load(&self) {
        match self.repo.list_all().await {
            Ok(campaigns) => {
                *self.campaigns.write().await = campaigns;
            }
            Err(e) => {
                tracing::error!("Error loading campaigns from database: {}", e);
            }
        }

        let first = self.campaigns.read().await.first().map(|c| c.id);
        let mut active = self.active_campaign_id.write().await;
        if active.is_none() {
            *active = first;
        }
        drop(active);

        self.publish().await;
    }

    /// Adds a new campaign and returns its id.
    pub async fn add_campaign(&self, data: CreateCampaignData) -> Result<CampaignId, ServiceError> {
        if data.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Campaign name cannot be empty".to_string(),
            ));
        }

        let campaign = Campaign::new(
            data.name,
            data.description,
            data.setting,
            self.clock.now(),
        )
        .with_player_characters(data.player_characters)
        .with_active_quests(data.active_quests)
        .with_completed_quests(data.completed_quests)
        .with_notes(data.notes);

        let id = campaign.id;
        self.campaigns.write().await.push(campaign.clone());
        self.persist(&campaign).await;
        self.publish().await;
        Ok(id)
    }

    /// Updates an existing campaign, field by field.
    pub async fn update_campaign(
        &self,
        id: CampaignId,
        data: UpdateCampaignData,
    ) -> Result<Campaign, ServiceError> {
        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "Campaign name cannot be empty".to_string(),
                ));
            }
        }

        let updated = {
            let mut campaigns = self.campaigns.write().await;
            let campaign = campaigns
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(ServiceError::NotFound)?;

            if let Some(name) = data.name {
                campaign.name = name;
            }
            if let Some(description) = data.description {
                campaign.description = description;
            }
            if let Some(setting) = data.setting {
                campaign.setting = setting;
            }
            if let Some(player_characters) = data.player_characters {
                campaign.player_characters = player_characters;
            }
            if let Some(active_quests) = data.active_quests {
                campaign.active_quests = active_quests;
            }
            if let Some(completed_quests) = data.completed_quests {
                campaign.completed_quests = completed_quests;
            }
            if let Some(notes) = data.notes {
                campaign.notes = notes;
            }
            campaign.updated_at = self.clock.now();
            campaign.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Mark a quest on a campaign as completed.
    pub async fn complete_quest(
        &self,
        id: CampaignId,
        quest: &str,
    ) -> Result<Campaign, ServiceError> {
        let updated = {
            let mut campaigns = self.campaigns.write().await;
            let campaign = campaigns
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(ServiceError::NotFound)?;

            if !campaign.complete_quest(quest) {
                return Err(ServiceError::InvalidInput(format!(
                    "Quest '{}' is not active",
                    quest
                )));
            }
            campaign.updated_at = self.clock.now();
            campaign.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Removes a campaign. Unknown ids are a silent no-op.
    pub async fn remove_campaign(&self, id: CampaignId) {
        self.campaigns.write().await.retain(|c| c.id != id);

        let mut active = self.active_campaign_id.write().await;
        if *active == Some(id) {
            *active = None;
        }
        drop(active);

        if let Err(e) = self.repo.delete(id).await {
            tracing::error!("Error removing campaign from database: {}", e);
        }
        self.publish().await;
    }

    /// Searches campaigns: FTS, then LIKE, then the in-memory list.
    pub async fn search_campaigns(&self, query: &str) -> Vec<Campaign> {
        let fts = fts_query(query);
        if !fts.is_empty() {
            match self.repo.search_fts(&fts).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching campaigns in database: {}", e),
            }
            match self.repo.search_like(query).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching campaigns with LIKE: {}", e),
            }
        }

        let needle = query.to_lowercase();
        self.campaigns
            .read()
            .await
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle)
                    || c.setting.to_lowercase().contains(&needle)
                    || c.notes.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Snapshot of all campaigns.
    pub async fn campaigns(&self) -> Vec<Campaign> {
        self.campaigns.read().await.clone()
    }

    pub async fn get(&self, id: CampaignId) -> Option<Campaign> {
        self.campaigns.read().await.iter().find(|c| c.id == id).cloned()
    }

    /// Observe list changes; the receiver holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Campaign>> {
        self.snapshot.subscribe()
    }

    /// Sets the active campaign. `None` clears it; an unknown id is
    /// rejected and returns false.
    pub async fn set_active_campaign(&self, id: Option<CampaignId>) -> bool {
        match id {
            None => {
                *self.active_campaign_id.write().await = None;
                true
            }
            Some(id) => {
                let exists = self.campaigns.read().await.iter().any(|c| c.id == id);
                if exists {
                    *self.active_campaign_id.write().await = Some(id);
                }
                exists
            }
        }
    }

    pub async fn active_campaign_id(&self) -> Option<CampaignId> {
        *self.active_campaign_id.read().await
    }

    pub async fn active_campaign(&self) -> Option<Campaign> {
        let id = (*self.active_campaign_id.read().await)?;
        self.get(id).await
    }

    async fn persist(&self, campaign: &Campaign) {
        if let Err(e) = self.repo.save(campaign).await {
            tracing::error!("Error saving campaign to database: {}", e);
        }
    }

    async fn publish(&self) {
        let snapshot = self.campaigns.read().await.clone();
        self.snapshot.send_replace(snapshot);
    }
}
