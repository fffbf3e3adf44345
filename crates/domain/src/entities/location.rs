//! Location entity - places in the game world
//!
//! Locations form a hierarchy through `parent_id` (a building inside a city,
//! a chamber inside a dungeon). Deleting a parent does not cascade; children
//! simply become orphans the GM can re-parent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::LocationId;

/// The type of location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationType {
    City,
    Town,
    Village,
    Dungeon,
    Wilderness,
    Landmark,
    Building,
    /// Other/custom location type (for forward compatibility)
    #[serde(other)]
    Other,
}

impl LocationType {
    pub fn all() -> &'static [LocationType] {
        &[
            LocationType::City,
            LocationType::Town,
            LocationType::Village,
            LocationType::Dungeon,
            LocationType::Wilderness,
            LocationType::Landmark,
            LocationType::Building,
            LocationType::Other,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LocationType::City => "City",
            LocationType::Town => "Town",
            LocationType::Village => "Village",
            LocationType::Dungeon => "Dungeon",
            LocationType::Wilderness => "Wilderness",
            LocationType::Landmark => "Landmark",
            LocationType::Building => "Building",
            LocationType::Other => "Other",
        }
    }

    /// String representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::City => "city",
            LocationType::Town => "town",
            LocationType::Village => "village",
            LocationType::Dungeon => "dungeon",
            LocationType::Wilderness => "wilderness",
            LocationType::Landmark => "landmark",
            LocationType::Building => "building",
            LocationType::Other => "other",
        }
    }

    /// Parse a location type from a string (case-insensitive, unknown maps to Other)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "city" => LocationType::City,
            "town" => LocationType::Town,
            "village" => LocationType::Village,
            "dungeon" => LocationType::Dungeon,
            "wilderness" => LocationType::Wilderness,
            "landmark" => LocationType::Landmark,
            "building" => LocationType::Building,
            _ => LocationType::Other,
        }
    }
}

impl std::fmt::Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// X/Y coordinates on a campaign map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCoordinates {
    pub x: f32,
    pub y: f32,
}

/// A place in the game world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub location_type: LocationType,
    pub description: String,
    /// Names or ids of notable NPCs found here
    pub notable_npcs: Vec<String>,
    pub points_of_interest: Vec<String>,
    pub dangers: Vec<String>,
    pub treasures: Vec<String>,
    /// Containing location, if nested (e.g. a tavern within a city)
    pub parent_id: Option<LocationId>,
    pub map_coordinates: Option<MapCoordinates>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Location {
    pub fn new(
        name: impl Into<String>,
        location_type: LocationType,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            location_type,
            description: description.into(),
            notable_npcs: Vec::new(),
            points_of_interest: Vec::new(),
            dangers: Vec::new(),
            treasures: Vec::new(),
            parent_id: None,
            map_coordinates: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_notable_npcs(mut self, notable_npcs: Vec<String>) -> Self {
        self.notable_npcs = notable_npcs;
        self
    }

    pub fn with_points_of_interest(mut self, points_of_interest: Vec<String>) -> Self {
        self.points_of_interest = points_of_interest;
        self
    }

    pub fn with_dangers(mut self, dangers: Vec<String>) -> Self {
        self.dangers = dangers;
        self
    }

    pub fn with_treasures(mut self, treasures: Vec<String>) -> Self {
        self.treasures = treasures;
        self
    }

    pub fn with_parent(mut self, parent_id: LocationId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_map_coordinates(mut self, x: f32, y: f32) -> Self {
        self.map_coordinates = Some(MapCoordinates { x, y });
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
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
    fn test_location_hierarchy() {
        let now = fixed_time();
        let city = Location::new("Haven City", LocationType::City, "A bustling metropolis", now);
        let tavern = Location::new(
            "The Drunken Dragon Tavern",
            LocationType::Building,
            "A popular tavern",
            now,
        )
        .with_parent(city.id);

        assert!(city.is_top_level());
        assert!(!tavern.is_top_level());
        assert_eq!(tavern.parent_id, Some(city.id));
    }

    #[test]
    fn test_location_type_parse() {
        assert_eq!(LocationType::parse("DUNGEON"), LocationType::Dungeon);
        assert_eq!(LocationType::parse("tavern"), LocationType::Other);
    }

    #[test]
    fn test_map_coordinates() {
        let now = fixed_time();
        let location = Location::new("Darkwood Forest", LocationType::Wilderness, "", now)
            .with_map_coordinates(12.5, -3.0);
        let coords = location.map_coordinates.expect("coordinates set");
        assert_eq!(coords.x, 12.5);
        assert_eq!(coords.y, -3.0);
    }
}
