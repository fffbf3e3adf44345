//! SQLite persistence adapters.
//!
//! One adapter per entity table. List-valued fields are stored as
//! JSON-encoded TEXT columns; timestamps as RFC 3339 TEXT. Each table has an
//! external-content FTS5 index kept in sync by triggers (see `connection`).

mod campaign_repo;
mod character_repo;
mod connection;
mod encounter_repo;
mod location_repo;
mod lore_repo;

pub use campaign_repo::SqliteCampaignRepo;
pub use character_repo::SqliteCharacterRepo;
pub use connection::{connect, run_migrations};
pub use encounter_repo::SqliteEncounterRepo;
pub use location_repo::SqliteLocationRepo;
pub use lore_repo::SqliteLoreRepo;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Utc};

use super::ports::RepoError;

// Row-mapping code uses `?` on sqlx results; query call sites that want an
// operation name in the error still map explicitly.
impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        RepoError::database("sqlite", e)
    }
}

/// Parse an RFC 3339 timestamp column.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("invalid timestamp '{}': {}", value, e)))
}

/// Decode a JSON-encoded column.
fn decode_json<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, RepoError> {
    serde_json::from_str(value).map_err(|e| RepoError::serialization(e))
}

/// Encode a list- or document-valued field for storage.
fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, RepoError> {
    serde_json::to_string(value).map_err(|e| RepoError::serialization(e))
}

/// Turn a user query into a `%...%` LIKE pattern.
fn like_pattern(query: &str) -> String {
    format!("%{}%", query)
}
