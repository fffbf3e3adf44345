//! Location service: the hierarchical gazetteer of the game world.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use worldweaver_domain::{Location, LocationId, LocationType, MapCoordinates};

use crate::infrastructure::ports::{ClockPort, LocationRepo};

use super::{fts_query, ServiceError};

/// Data for creating a location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocationData {
    pub name: String,
    pub location_type: LocationType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notable_npcs: Vec<String>,
    #[serde(default)]
    pub points_of_interest: Vec<String>,
    #[serde(default)]
    pub dangers: Vec<String>,
    #[serde(default)]
    pub treasures: Vec<String>,
    #[serde(default)]
    pub parent_id: Option<LocationId>,
    #[serde(default)]
    pub map_coordinates: Option<MapCoordinates>,
    #[serde(default)]
    pub notes: String,
}

impl CreateLocationData {
    pub fn new(name: impl Into<String>, location_type: LocationType) -> Self {
        Self {
            name: name.into(),
            location_type,
            description: String::new(),
            notable_npcs: Vec::new(),
            points_of_interest: Vec::new(),
            dangers: Vec::new(),
            treasures: Vec::new(),
            parent_id: None,
            map_coordinates: None,
            notes: String::new(),
        }
    }
}

/// Data for updating a location; `None` fields are left unchanged.
/// Use [`LocationService::clear_parent`] to detach a location from its
/// parent; a `None` here means "keep the current parent".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLocationData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location_type: Option<LocationType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notable_npcs: Option<Vec<String>>,
    #[serde(default)]
    pub points_of_interest: Option<Vec<String>>,
    #[serde(default)]
    pub dangers: Option<Vec<String>>,
    #[serde(default)]
    pub treasures: Option<Vec<String>>,
    #[serde(default)]
    pub parent_id: Option<LocationId>,
    #[serde(default)]
    pub map_coordinates: Option<MapCoordinates>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Service for handling location information across the application.
pub struct LocationService {
    repo: Arc<dyn LocationRepo>,
    clock: Arc<dyn ClockPort>,
    locations: RwLock<Vec<Location>>,
    snapshot: watch::Sender<Vec<Location>>,
}

impl LocationService {
    pub fn new(repo: Arc<dyn LocationRepo>, clock: Arc<dyn ClockPort>) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            repo,
            clock,
            locations: RwLock::new(Vec::new()),
            snapshot,
        }
    }

    /// Hydrate the in-memory list from the database.
    pub async fn load(&self) {
        match self.repo.list_all().await {
            Ok(locations) => {
                *self.locations.write().await = locations;
            }
            Err(e) => {
                tracing::error!("Error loading locations from database: {}", e);
            }
        }
        self.publish().await;
    }

    /// Adds a new location and returns its id.
    pub async fn add_location(&self, data: CreateLocationData) -> Result<LocationId, ServiceError> {
        if data.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "Location name cannot be empty".to_string(),
            ));
        }

        let mut location = Location::new(
            data.name,
            data.location_type,
            data.description,
            self.clock.now(),
        )
        .with_notable_npcs(data.notable_npcs)
        .with_points_of_interest(data.points_of_interest)
        .with_dangers(data.dangers)
        .with_treasures(data.treasures)
        .with_notes(data.notes);
        location.parent_id = data.parent_id;
        location.map_coordinates = data.map_coordinates;

        let id = location.id;
        self.locations.write().await.push(location.clone());
        self.persist(&location).await;
        self.publish().await;
        Ok(id)
    }

    /// Updates an existing location, field by field.
    pub async fn update_location(
        &self,
        id: LocationId,
        data: UpdateLocationData,
    ) -> Result<Location, ServiceError> {
        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "Location name cannot be empty".to_string(),
                ));
            }
        }
        // A location cannot contain itself
        if data.parent_id == Some(id) {
            return Err(ServiceError::InvalidInput(
                "Location cannot be its own parent".to_string(),
            ));
        }

        let updated = {
            let mut locations = self.locations.write().await;
            let location = locations
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or(ServiceError::NotFound)?;

            if let Some(name) = data.name {
                location.name = name;
            }
            if let Some(location_type) = data.location_type {
                location.location_type = location_type;
            }
            if let Some(description) = data.description {
                location.description = description;
            }
            if let Some(notable_npcs) = data.notable_npcs {
                location.notable_npcs = notable_npcs;
            }
            if let Some(points_of_interest) = data.points_of_interest {
                location.points_of_interest = points_of_interest;
            }
            if let Some(dangers) = data.dangers {
                location.dangers = dangers;
            }
            if let Some(treasures) = data.treasures {
                location.treasures = treasures;
            }
            if let Some(parent_id) = data.parent_id {
                location.parent_id = Some(parent_id);
            }
            if let Some(map_coordinates) = data.map_coordinates {
                location.map_coordinates = Some(map_coordinates);
            }
            if let Some(notes) = data.notes {
                location.notes = notes;
            }
            location.updated_at = self.clock.now();
            location.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Detach a location from its parent, making it top-level.
    ///
    /// `update_location` can only change the parent, not remove it.
    pub async fn clear_parent(&self, id: LocationId) -> Result<Location, ServiceError> {
        let updated = {
            let mut locations = self.locations.write().await;
            let location = locations
                .iter_mut()
                .find(|l| l.id == id)
                .ok_or(ServiceError::NotFound)?;
            location.parent_id = None;
            location.updated_at = self.clock.now();
            location.clone()
        };

        self.persist(&updated).await;
        self.publish().await;
        Ok(updated)
    }

    /// Removes a location. Children are left in place as orphans; there is
    /// no cascade.
    pub async fn remove_location(&self, id: LocationId) {
        self.locations.write().await.retain(|l| l.id != id);
        if let Err(e) = self.repo.delete(id).await {
            tracing::error!("Error removing location from database: {}", e);
        }
        self.publish().await;
    }

    /// Searches locations: FTS, then LIKE, then the in-memory list.
    pub async fn search_locations(&self, query: &str) -> Vec<Location> {
        let fts = fts_query(query);
        if !fts.is_empty() {
            match self.repo.search_fts(&fts).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching locations in database: {}", e),
            }
            match self.repo.search_like(query).await {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => tracing::warn!("Error searching locations with LIKE: {}", e),
            }
        }

        let needle = query.to_lowercase();
        self.locations
            .read()
            .await
            .iter()
            .filter(|l| {
                l.name.to_lowercase().contains(&needle)
                    || l.description.to_lowercase().contains(&needle)
                    || l.notes.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Snapshot of all locations.
    pub async fn locations(&self) -> Vec<Location> {
        self.locations.read().await.clone()
    }

    pub async fn get(&self, id: LocationId) -> Option<Location> {
        self.locations.read().await.iter().find(|l| l.id == id).cloned()
    }

    pub async fn locations_by_type(&self, location_type: LocationType) -> Vec<Location> {
        self.locations
            .read()
            .await
            .iter()
            .filter(|l| l.location_type == location_type)
            .cloned()
            .collect()
    }

    /// Direct children of a location.
    pub async fn child_locations(&self, parent_id: LocationId) -> Vec<Location> {
        self.locations
            .read()
            .await
            .iter()
            .filter(|l| l.parent_id == Some(parent_id))
            .cloned()
            .collect()
    }

    /// Locations with no parent.
    pub async fn top_level_locations(&self) -> Vec<Location> {
        self.locations
            .read()
            .await
            .iter()
            .filter(|l| l.is_top_level())
            .cloned()
            .collect()
    }

    /// Observe list changes; the receiver holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Location>> {
        self.snapshot.subscribe()
    }

    async fn persist(&self, location: &Location) {
        if let Err(e) = self.repo.save(location).await {
            tracing::error!("Error saving location to database: {}", e);
        }
    }

    async fn publish(&self) {
        let snapshot = self.locations.read().await.clone();
        self.snapshot.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::MockLocationRepo;

    fn fixed_clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(Utc.timestamp_opt(1_700_000_000, 0).unwrap()))
    }

    fn saving_repo() -> MockLocationRepo {
        let mut repo = MockLocationRepo::new();
        repo.expect_save().returning(|_| Ok(()));
        repo.expect_delete().returning(|_| Ok(()));
        repo
    }

    async fn service_with_city_and_tavern() -> (LocationService, LocationId, LocationId) {
        let service = LocationService::new(Arc::new(saving_repo()), fixed_clock());
        let city = service
            .add_location(CreateLocationData::new("Haven City", LocationType::City))
            .await
            .expect("city");
        let tavern = service
            .add_location(CreateLocationData {
                parent_id: Some(city),
                ..CreateLocationData::new("The Drunken Dragon Tavern", LocationType::Building)
            })
            .await
            .expect("tavern");
        (service, city, tavern)
    }

    #[tokio::test]
    async fn hierarchy_queries_partition_locations() {
        let (service, city, tavern) = service_with_city_and_tavern().await;

        let top = service.top_level_locations().await;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, city);

        let children = service.child_locations(city).await;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, tavern);
    }

    #[tokio::test]
    async fn removing_parent_orphans_children() {
        let (service, city, tavern) = service_with_city_and_tavern().await;

        // Deleting the city leaves the tavern pointing at a dead id
        service.remove_location(city).await;
        let orphan = service.get(tavern).await.expect("tavern still exists");
        assert_eq!(orphan.parent_id, Some(city));
        assert_eq!(service.child_locations(city).await.len(), 1);
    }

    #[tokio::test]
    async fn location_cannot_become_its_own_parent() {
        let (service, city, _) = service_with_city_and_tavern().await;
        let result = service
            .update_location(
                city,
                UpdateLocationData {
                    parent_id: Some(city),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn clear_parent_detaches_location() {
        let (service, _, tavern) = service_with_city_and_tavern().await;
        let detached = service.clear_parent(tavern).await.expect("detached");
        assert!(detached.is_top_level());
        assert_eq!(service.top_level_locations().await.len(), 2);
    }

    #[tokio::test]
    async fn locations_by_type_filters() {
        let (service, _, _) = service_with_city_and_tavern().await;
        assert_eq!(service.locations_by_type(LocationType::City).await.len(), 1);
        assert_eq!(
            service.locations_by_type(LocationType::Dungeon).await.len(),
            0
        );
    }
}
