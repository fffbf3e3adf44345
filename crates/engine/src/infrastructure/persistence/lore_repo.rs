//! Lore repository implementation for SQLite.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use worldweaver_domain::{LoreCategory, LoreEntry, LoreEntryId};

use super::{decode_json, encode_json, like_pattern, parse_timestamp};
use crate::infrastructure::ports::{LoreRepo, RepoError};

/// Repository for LoreEntry rows
pub struct SqliteLoreRepo {
    pool: SqlitePool,
}

impl SqliteLoreRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Convert a lore_entries row to a LoreEntry
fn row_to_entry(row: &SqliteRow) -> Result<LoreEntry, RepoError> {
    let id: String = row.try_get("id")?;
    let category: String = row.try_get("category")?;
    let tags: String = row.try_get("tags")?;
    let related_entries: String = row.try_get("related_entries")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    // Related ids are stored as JSON strings; unparseable ids would mean a
    // corrupted row, surfaced as a serialization error.
    let related: Vec<String> = decode_json(&related_entries)?;
    let related_entries = related
        .iter()
        .map(|s| s.parse::<LoreEntryId>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RepoError::serialization(e))?;

    Ok(LoreEntry {
        id: id
            .parse::<LoreEntryId>()
            .map_err(|e| RepoError::serialization(e))?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        category: category
            .parse::<LoreCategory>()
            .unwrap_or(LoreCategory::Other),
        tags: decode_json(&tags)?,
        related_entries,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn rows_to_entries(rows: Vec<SqliteRow>) -> Result<Vec<LoreEntry>, RepoError> {
    rows.iter().map(row_to_entry).collect()
}

#[async_trait]
impl LoreRepo for SqliteLoreRepo {
    async fn get(&self, id: LoreEntryId) -> Result<Option<LoreEntry>, RepoError> {
        let row = sqlx::query("SELECT * FROM lore_entries WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("lore.get", e))?;

        row.as_ref().map(row_to_entry).transpose()
    }

    async fn save(&self, entry: &LoreEntry) -> Result<(), RepoError> {
        let related: Vec<String> = entry.related_entries.iter().map(|r| r.to_string()).collect();

        sqlx::query(
            r#"
            INSERT INTO lore_entries (
                id, title, content, category, tags, related_entries,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                category = excluded.category,
                tags = excluded.tags,
                related_entries = excluded.related_entries,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.category.as_str())
        .bind(encode_json(&entry.tags)?)
        .bind(encode_json(&related)?)
        .bind(entry.created_at.to_rfc3339())
        .bind(entry.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("lore.save", e))?;

        tracing::debug!("Saved lore entry: {}", entry.title);
        Ok(())
    }

    async fn delete(&self, id: LoreEntryId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM lore_entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("lore.delete", e))?;

        tracing::debug!("Deleted lore entry: {}", id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<LoreEntry>, RepoError> {
        let rows = sqlx::query("SELECT * FROM lore_entries ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("lore.list", e))?;

        rows_to_entries(rows)
    }

    async fn search_fts(&self, query: &str) -> Result<Vec<LoreEntry>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT l.* FROM lore_entries l
            JOIN lore_fts ON lore_fts.rowid = l.rowid
            WHERE lore_fts MATCH ?
            ORDER BY lore_fts.rank
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("lore.search_fts", e))?;

        rows_to_entries(rows)
    }

    async fn search_like(&self, query: &str) -> Result<Vec<LoreEntry>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM lore_entries
            WHERE title LIKE ?1 OR content LIKE ?1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("lore.search_like", e))?;

        rows_to_entries(rows)
    }
}
