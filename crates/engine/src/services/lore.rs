//! Lore service: world-building entries with tags and cross-references.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use worldweaver_domain::{LoreCategory, LoreEntry, LoreEntryId};

use crate::infrastructure::ports::{ClockPort, LoreRepo};

use super::{fts_query, ServiceError};

/// Data for creating a lore entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoreEntryData {
    pub title: String,
    pub content: String,
    pub category: LoreCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub related_entries: Vec<LoreEntryId>,
}

/// Data for updating a lore entry; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLoreEntryData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<LoreCategory>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub related_entries: Option<Vec<LoreEntryId>>,
}

/// Service for handling lore entries across the application.
pub struct LoreService {
    repo: Arc<dyn LoreRepo>,
    clock: Arc<dyn ClockPort>,
    entries: RwLock<Vec<LoreEntry>>,
    snapshot: watch::Sender<Vec<LoreEntry>>,
}

impl LoreService {
    pub fn new(repo: Arc<dyn LoreRepo>, clock: Arc<dyn ClockPort>) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            repo,
            clock,
            entries: RwLock::new(Vec::new()),
            snapshot,
        }
    }

    /// Hydrate the in-memory list from the database.
    pub async fn load(&self) {
        match self.repo.list_all().await {
            Ok(entries) => {
                *self.entries.write().await = entries;
            }
            Err(e) => {
                tracing::error!("Error loading lore entries from database: {}", e);
            }
        }
        self.publish().await;
    }

    /// Adds a new lore entry and returns its id.
    pub async fn add_entry(&self, data: CreateLoreEntryData) -> Result<LoreEntryId, ServiceError> {
        if data.title.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Lore title cannot be empty".to_string(),
            ));
        }

        let entry = LoreEntry::new(data.title, data.content, data.category, self.clock.now())
            .with_tags(data.tags)
            .with_related_entries(data.related_entries);

        let id = entry.id;
        self.entries.write().await.push(entry.clone());
        self.persist(&entry).await;
        self.publish().await;
        Ok(id)
    }

    /// Updates an existing lore entry, field by field.
    pub async fn update_entry(
        &self,
        id: LoreEntryId,
        data: UpdateLoreEntryData,
    ) -> Result<LoreEntry, ServiceError> {
        if let Some(title) = &data.title {
            if title.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "Lore title cannot be empty".to_string(),
                ));
            }
        }

        let updated = {
            let mut entries = self.entries.write().await;
            let entry = entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(ServiceError::NotFound)?;

            if let Some(title) = data.title {
                entry.title = title;
            }
            if let Some(content) = data.content {
                entry.content = content;
            }
            if let Some(category) = data.category {
                entry.category = category;
            }
            if let Some(tags) = data.tags {
                entry.tags = tags;
            }
            if let Some(related_entries) = data.related_entries {
                // Self-references are dropped rather than rejected
                entry.related_entries = related_entries.into_iter().filter(|r| *r != id).collect();
            }
            entry.updated_at = self.clock.now();
            entry.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Cross-link two entries (one direction).
    pub async fn link_entries(
        &self,
        from: LoreEntryId,
        to: LoreEntryId,
    ) -> Result<LoreEntry, ServiceError> {
        let updated = {
            let mut entries = self.entries.write().await;
            if !entries.iter().any(|e| e.id == to) {
                return Err(ServiceError::NotFound);
            }
            let entry = entries
                .iter_mut()
                .find(|e| e.id == from)
                .ok_or(ServiceError::NotFound)?;
            entry.add_related(to);
            entry.updated_at = self.clock.now();
            entry.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Removes a lore entry. References from other entries are left dangling.
    pub async fn remove_entry(&self, id: LoreEntryId) {
        self.entries.write().await.retain(|e| e.id != id);
        if let Err(e) = self.repo.delete(id).await {
            tracing::error!("Error removing lore entry from database: {}", e);
        }
        self.publish().await;
    }

    /// Searches lore entries: FTS, then LIKE, then the in-memory list.
    pub async fn search_entries(&self, query: &str) -> Vec<LoreEntry> {
        let fts = fts_query(query);
        if !fts.is_empty() {
            match self.repo.search_fts(&fts).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching lore entries in database: {}", e),
            }
            match self.repo.search_like(query).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching lore entries with LIKE: {}", e),
            }
        }

        let needle = query.to_lowercase();
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| {
                e.title.to_lowercase().contains(&needle)
                    || e.content.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Snapshot of all lore entries.
    pub async fn entries(&self) -> Vec<LoreEntry> {
        self.entries.read().await.clone()
    }

    pub async fn get(&self, id: LoreEntryId) -> Option<LoreEntry> {
        self.entries.read().await.iter().find(|e| e.id == id).cloned()
    }

    pub async fn entries_by_category(&self, category: LoreCategory) -> Vec<LoreEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }

    pub async fn entries_by_tag(&self, tag: &str) -> Vec<LoreEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.has_tag(tag))
            .cloned()
            .collect()
    }

    /// Observe list changes; the receiver holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<LoreEntry>> {
        self.snapshot.subscribe()
    }

    async fn persist(&self, entry: &LoreEntry) {
        if let Err(e) = self.repo.save(entry).await {
            tracing::error!("Error saving lore entry to database: {}", e);
        }
    }

    async fn publish(&self) {
        let snapshot = self.entries.read().await.clone();
        self.snapshot.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockLoreRepo;

    fn fixed_clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap()))
    }

    fn saving_repo() -> MockLoreRepo {
        let mut repo = MockLoreRepo::new();
        repo.expect_save().returning(|_| Ok(()));
        repo.expect_delete().returning(|_| Ok(()));
        repo
    }

    fn create_data(title: &str, category: LoreCategory, tags: &[&str]) -> CreateLoreEntryData {
        CreateLoreEntryData {
            title: title.to_string(),
            content: String::new(),
            category,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            related_entries: Vec::new(),
        }
    }

    #[tokio::test]
    async fn category_and_tag_filters() {
        let service = LoreService::new(Arc::new(saving_repo()), fixed_clock());
        service
            .add_entry(create_data("The Great War", LoreCategory::History, &["war"]))
            .await
            .expect("created");
        service
            .add_entry(create_data(
                "The Creation Myth",
                LoreCategory::Mythology,
                &["gods", "origin"],
            ))
            .await
            .expect("created");

        assert_eq!(
            service.entries_by_category(LoreCategory::History).await.len(),
            1
        );
        assert_eq!(service.entries_by_tag("gods").await.len(), 1);
        assert_eq!(service.entries_by_tag("dragons").await.len(), 0);
    }

    #[tokio::test]
    async fn link_entries_is_one_directional() {
        let service = LoreService::new(Arc::new(saving_repo()), fixed_clock());
        let war = service
            .add_entry(create_data("The Great War", LoreCategory::History, &[]))
            .await
            .expect("created");
        let myth = service
            .add_entry(create_data("The Creation Myth", LoreCategory::Mythology, &[]))
            .await
            .expect("created");

        service.link_entries(war, myth).await.expect("linked");

        assert_eq!(
            service.get(war).await.expect("exists").related_entries,
            vec![myth]
        );
        assert!(service.get(myth).await.expect("exists").related_entries.is_empty());
    }

    #[tokio::test]
    async fn link_to_missing_entry_is_not_found() {
        let service = LoreService::new(Arc::new(saving_repo()), fixed_clock());
        let war = service
            .add_entry(create_data("The Great War", LoreCategory::History, &[]))
            .await
            .expect("created");

        let result = service.link_entries(war, LoreEntryId::new()).await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn update_strips_self_references() {
        let service = LoreService::new(Arc::new(saving_repo()), fixed_clock());
        let id = service
            .add_entry(create_data("Entry", LoreCategory::History, &[]))
            .await
            .expect("created");
        let other = LoreEntryId::new();

        let updated = service
            .update_entry(
                id,
                UpdateLoreEntryData {
                    related_entries: Some(vec![id, other]),
                    ..Default::default()
                },
            )
            .await
            .expect("updated");

        assert_eq!(updated.related_entries, vec![other]);
    }

    #[tokio::test]
    async fn removing_entry_leaves_references_dangling() {
        let service = LoreService::new(Arc::new(saving_repo()), fixed_clock());
        let war = service
            .add_entry(create_data("The Great War", LoreCategory::History, &[]))
            .await
            .expect("created");
        let myth = service
            .add_entry(create_data("The Creation Myth", LoreCategory::Mythology, &[]))
            .await
            .expect("created");
        service.link_entries(war, myth).await.expect("linked");

        service.remove_entry(myth).await;
        // No cleanup: the dead reference stays
        assert_eq!(
            service.get(war).await.expect("exists").related_entries,
            vec![myth]
        );
    }
}
