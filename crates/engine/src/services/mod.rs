//! Domain services: the single mutation path for each entity type.
//!
//! Each service owns an observable in-memory list hydrated from its
//! repository at startup, generates ids at creation time, and offers the
//! uniform operation set: add, update-by-id-with-optional-fields,
//! remove-by-id, and search. Text search cascades FTS -> LIKE -> in-memory
//! substring scan.
//!
//! Persistence failures never surface to callers: they are logged and the
//! in-memory list stays authoritative for the session. Only validation
//! problems (empty names, unknown ids) come back as [`ServiceError`].

mod campaign;
mod character;
mod encounter;
mod location;
mod lore;
mod notification;

pub use campaign::{CampaignService, CreateCampaignData, UpdateCampaignData};
pub use character::{CharacterService, CreateCharacterData, UpdateCharacterData};
pub use encounter::{
    CreateEncounterData, EncounterService, UpdateEncounterData, UpdateParticipantData,
};
pub use location::{CreateLocationData, LocationService, UpdateLocationData};
pub use lore::{CreateLoreEntryData, LoreService, UpdateLoreEntryData};
pub use notification::NotificationService;

/// Shared error type for service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Join whitespace-separated terms with OR for an FTS expression.
///
/// "lich king" becomes "lich OR king", matching records containing either
/// term. An empty or all-whitespace query yields an empty expression, which
/// callers treat as "skip the database and scan in memory".
fn fts_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" OR ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fts_query_joins_terms_with_or() {
        assert_eq!(fts_query("lich king"), "lich OR king");
        assert_eq!(fts_query("  lich   king  "), "lich OR king");
        assert_eq!(fts_query("single"), "single");
        assert_eq!(fts_query("   "), "");
    }
}
