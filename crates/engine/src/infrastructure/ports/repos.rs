//! Repository port traits for database access.
//!
//! One port per entity type, all with the same shape: CRUD plus the two
//! text-search paths (FTS with a LIKE fallback). Services own any further
//! filtering against their in-memory lists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use worldweaver_domain::{
    Campaign, CampaignId, Character, CharacterId, Encounter, EncounterId, Location, LocationId,
    LoreEntry, LoreEntryId,
};

use super::error::RepoError;

/// Source of the current time, injected so tests can pin it.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepo: Send + Sync {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError>;
    async fn save(&self, campaign: &Campaign) -> Result<(), RepoError>;
    async fn delete(&self, id: CampaignId) -> Result<(), RepoError>;
    /// All campaigns, most recently updated first.
    async fn list_all(&self) -> Result<Vec<Campaign>, RepoError>;
    /// Full-text search; `query` is an FTS expression (terms joined with OR).
    async fn search_fts(&self, query: &str) -> Result<Vec<Campaign>, RepoError>;
    /// Substring search over the same columns as the FTS index.
    async fn search_like(&self, query: &str) -> Result<Vec<Campaign>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;
    async fn save(&self, character: &Character) -> Result<(), RepoError>;
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError>;
    async fn list_all(&self) -> Result<Vec<Character>, RepoError>;
    async fn search_fts(&self, query: &str) -> Result<Vec<Character>, RepoError>;
    async fn search_like(&self, query: &str) -> Result<Vec<Character>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepo: Send + Sync {
    async fn get(&self, id: LocationId) -> Result<Option<Location>, RepoError>;
    async fn save(&self, location: &Location) -> Result<(), RepoError>;
    async fn delete(&self, id: LocationId) -> Result<(), RepoError>;
    async fn list_all(&self) -> Result<Vec<Location>, RepoError>;
    async fn search_fts(&self, query: &str) -> Result<Vec<Location>, RepoError>;
    async fn search_like(&self, query: &str) -> Result<Vec<Location>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoreRepo: Send + Sync {
    async fn get(&self, id: LoreEntryId) -> Result<Option<LoreEntry>, RepoError>;
    async fn save(&self, entry: &LoreEntry) -> Result<(), RepoError>;
    async fn delete(&self, id: LoreEntryId) -> Result<(), RepoError>;
    async fn list_all(&self) -> Result<Vec<LoreEntry>, RepoError>;
    async fn search_fts(&self, query: &str) -> Result<Vec<LoreEntry>, RepoError>;
    async fn search_like(&self, query: &str) -> Result<Vec<LoreEntry>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EncounterRepo: Send + Sync {
    async fn get(&self, id: EncounterId) -> Result<Option<Encounter>, RepoError>;
    async fn save(&self, encounter: &Encounter) -> Result<(), RepoError>;
    async fn delete(&self, id: EncounterId) -> Result<(), RepoError>;
    async fn list_all(&self) -> Result<Vec<Encounter>, RepoError>;
    async fn search_fts(&self, query: &str) -> Result<Vec<Encounter>, RepoError>;
    async fn search_like(&self, query: &str) -> Result<Vec<Encounter>, RepoError>;
}
