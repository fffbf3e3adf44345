//! Campaign repository implementation for SQLite.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use worldweaver_domain::{Campaign, CampaignId};

use super::{decode_json, encode_json, like_pattern, parse_timestamp};
use crate::infrastructure::ports::{CampaignRepo, RepoError};

/// Repository for Campaign rows
pub struct SqliteCampaignRepo {
    pool: SqlitePool,
}

impl SqliteCampaignRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Convert a campaigns row to a Campaign
fn row_to_campaign(row: &SqliteRow) -> Result<Campaign, RepoError> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let player_characters: String = row.try_get("player_characters")?;
    let active_quests: String = row.try_get("active_quests")?;
    let completed_quests: String = row.try_get("completed_quests")?;

    Ok(Campaign {
        id: id
            .parse::<CampaignId>()
            .map_err(|e| RepoError::serialization(e))?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        setting: row.try_get("setting")?,
        player_characters: decode_json(&player_characters)?,
        active_quests: decode_json(&active_quests)?,
        completed_quests: decode_json(&completed_quests)?,
        notes: row.try_get("notes")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn rows_to_campaigns(rows: Vec<SqliteRow>) -> Result<Vec<Campaign>, RepoError> {
    rows.iter().map(row_to_campaign).collect()
}

#[async_trait]
impl CampaignRepo for SqliteCampaignRepo {
    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepoError> {
        let row = sqlx::query("SELECT * FROM campaigns WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("campaigns.get", e))?;

        row.as_ref().map(row_to_campaign).transpose()
    }

    async fn save(&self, campaign: &Campaign) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, name, description, setting,
                player_characters, active_quests, completed_quests,
                notes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                setting = excluded.setting,
                player_characters = excluded.player_characters,
                active_quests = excluded.active_quests,
                completed_quests = excluded.completed_quests,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(campaign.id.to_string())
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(&campaign.setting)
        .bind(encode_json(&campaign.player_characters)?)
        .bind(encode_json(&campaign.active_quests)?)
        .bind(encode_json(&campaign.completed_quests)?)
        .bind(&campaign.notes)
        .bind(campaign.created_at.to_rfc3339())
        .bind(campaign.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("campaigns.save", e))?;

        tracing::debug!("Saved campaign: {}", campaign.name);
        Ok(())
    }

    async fn delete(&self, id: CampaignId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM campaigns WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("campaigns.delete", e))?;

        tracing::debug!("Deleted campaign: {}", id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Campaign>, RepoError> {
        let rows = sqlx::query("SELECT * FROM campaigns ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("campaigns.list", e))?;

        rows_to_campaigns(rows)
    }

    async fn search_fts(&self, query: &str) -> Result<Vec<Campaign>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT c.* FROM campaigns c
            JOIN campaigns_fts ON campaigns_fts.rowid = c.rowid
            WHERE campaigns_fts MATCH ?
            ORDER BY campaigns_fts.rank
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("campaigns.search_fts", e))?;

        rows_to_campaigns(rows)
    }

    async fn search_like(&self, query: &str) -> Result<Vec<Campaign>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM campaigns
            WHERE name LIKE ?1 OR description LIKE ?1 OR setting LIKE ?1 OR notes LIKE ?1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("campaigns.search_like", e))?;

        rows_to_campaigns(rows)
    }
}
