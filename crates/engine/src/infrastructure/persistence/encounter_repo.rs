//! Encounter repository implementation for SQLite.
//!
//! The participant roster is one JSON document per row. Participants are
//! never queried independently, so they don't get their own table.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use worldweaver_domain::{Encounter, EncounterDifficulty, EncounterId};

use super::{decode_json, encode_json, like_pattern, parse_timestamp};
use crate::infrastructure::ports::{EncounterRepo, RepoError};

/// Repository for Encounter rows
pub struct SqliteEncounterRepo {
    pool: SqlitePool,
}

impl SqliteEncounterRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Convert an encounters row to an Encounter
fn row_to_encounter(row: &SqliteRow) -> Result<Encounter, RepoError> {
    let id: String = row.try_get("id")?;
    let difficulty: String = row.try_get("difficulty")?;
    let participants: String = row.try_get("participants")?;
    let rewards: String = row.try_get("rewards")?;
    let is_active: i64 = row.try_get("is_active")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Encounter {
        id: id
            .parse::<EncounterId>()
            .map_err(|e| RepoError::serialization(e))?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        difficulty: difficulty
            .parse::<EncounterDifficulty>()
            .map_err(|e| RepoError::serialization(e))?,
        participants: decode_json(&participants)?,
        rewards: decode_json(&rewards)?,
        notes: row.try_get("notes")?,
        is_active: is_active != 0,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn rows_to_encounters(rows: Vec<SqliteRow>) -> Result<Vec<Encounter>, RepoError> {
    rows.iter().map(row_to_encounter).collect()
}

#[async_trait]
impl EncounterRepo for SqliteEncounterRepo {
    async fn get(&self, id: EncounterId) -> Result<Option<Encounter>, RepoError> {
        let row = sqlx::query("SELECT * FROM encounters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("encounters.get", e))?;

        row.as_ref().map(row_to_encounter).transpose()
    }

    async fn save(&self, encounter: &Encounter) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO encounters (
                id, name, description, location, difficulty,
                participants, rewards, notes, is_active,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                location = excluded.location,
                difficulty = excluded.difficulty,
                participants = excluded.participants,
                rewards = excluded.rewards,
                notes = excluded.notes,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(encounter.id.to_string())
        .bind(&encounter.name)
        .bind(&encounter.description)
        .bind(&encounter.location)
        .bind(encounter.difficulty.as_str())
        .bind(encode_json(&encounter.participants)?)
        .bind(encode_json(&encounter.rewards)?)
        .bind(&encounter.notes)
        .bind(encounter.is_active as i64)
        .bind(encounter.created_at.to_rfc3339())
        .bind(encounter.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("encounters.save", e))?;

        tracing::debug!("Saved encounter: {}", encounter.name);
        Ok(())
    }

    async fn delete(&self, id: EncounterId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM encounters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("encounters.delete", e))?;

        tracing::debug!("Deleted encounter: {}", id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Encounter>, RepoError> {
        let rows = sqlx::query("SELECT * FROM encounters ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("encounters.list", e))?;

        rows_to_encounters(rows)
    }

    async fn search_fts(&self, query: &str) -> Result<Vec<Encounter>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT e.* FROM encounters e
            JOIN encounters_fts ON encounters_fts.rowid = e.rowid
            WHERE encounters_fts MATCH ?
            ORDER BY encounters_fts.rank
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("encounters.search_fts", e))?;

        rows_to_encounters(rows)
    }

    async fn search_like(&self, query: &str) -> Result<Vec<Encounter>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM encounters
            WHERE name LIKE ?1 OR description LIKE ?1 OR location LIKE ?1 OR notes LIKE ?1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("encounters.search_like", e))?;

        rows_to_encounters(rows)
    }
}
