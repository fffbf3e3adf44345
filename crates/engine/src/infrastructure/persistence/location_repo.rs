//! Location repository implementation for SQLite.
//!
//! The hierarchy column (`parent_id`) is a plain nullable TEXT reference;
//! there is no foreign key and no cascade, orphans are allowed.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use worldweaver_domain::{Location, LocationId, LocationType, MapCoordinates};

use super::{decode_json, encode_json, like_pattern, parse_timestamp};
use crate::infrastructure::ports::{LocationRepo, RepoError};

/// Repository for Location rows
pub struct SqliteLocationRepo {
    pool: SqlitePool,
}

impl SqliteLocationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Convert a locations row to a Location
fn row_to_location(row: &SqliteRow) -> Result<Location, RepoError> {
    let id: String = row.try_get("id")?;
    let location_type: String = row.try_get("location_type")?;
    let notable_npcs: String = row.try_get("notable_npcs")?;
    let points_of_interest: String = row.try_get("points_of_interest")?;
    let dangers: String = row.try_get("dangers")?;
    let treasures: String = row.try_get("treasures")?;
    let parent_id: Option<String> = row.try_get("parent_id")?;
    let map_x: Option<f32> = row.try_get("map_x")?;
    let map_y: Option<f32> = row.try_get("map_y")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let parent_id = parent_id
        .map(|p| p.parse::<LocationId>())
        .transpose()
        .map_err(|e| RepoError::serialization(e))?;

    let map_coordinates = match (map_x, map_y) {
        (Some(x), Some(y)) => Some(MapCoordinates { x, y }),
        _ => None,
    };

    Ok(Location {
        id: id
            .parse::<LocationId>()
            .map_err(|e| RepoError::serialization(e))?,
        name: row.try_get("name")?,
        location_type: LocationType::parse(&location_type),
        description: row.try_get("description")?,
        notable_npcs: decode_json(&notable_npcs)?,
        points_of_interest: decode_json(&points_of_interest)?,
        dangers: decode_json(&dangers)?,
        treasures: decode_json(&treasures)?,
        parent_id,
        map_coordinates,
        notes: row.try_get("notes")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn rows_to_locations(rows: Vec<SqliteRow>) -> Result<Vec<Location>, RepoError> {
    rows.iter().map(row_to_location).collect()
}

#[async_trait]
impl LocationRepo for SqliteLocationRepo {
    async fn get(&self, id: LocationId) -> Result<Option<Location>, RepoError> {
        let row = sqlx::query("SELECT * FROM locations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("locations.get", e))?;

        row.as_ref().map(row_to_location).transpose()
    }

    async fn save(&self, location: &Location) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO locations (
                id, name, location_type, description,
                notable_npcs, points_of_interest, dangers, treasures,
                parent_id, map_x, map_y,
                notes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                location_type = excluded.location_type,
                description = excluded.description,
                notable_npcs = excluded.notable_npcs,
                points_of_interest = excluded.points_of_interest,
                dangers = excluded.dangers,
                treasures = excluded.treasures,
                parent_id = excluded.parent_id,
                map_x = excluded.map_x,
                map_y = excluded.map_y,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(location.id.to_string())
        .bind(&location.name)
        .bind(location.location_type.as_str())
        .bind(&location.description)
        .bind(encode_json(&location.notable_npcs)?)
        .bind(encode_json(&location.points_of_interest)?)
        .bind(encode_json(&location.dangers)?)
        .bind(encode_json(&location.treasures)?)
        .bind(location.parent_id.map(|p| p.to_string()))
        .bind(location.map_coordinates.map(|c| c.x))
        .bind(location.map_coordinates.map(|c| c.y))
        .bind(&location.notes)
        .bind(location.created_at.to_rfc3339())
        .bind(location.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("locations.save", e))?;

        tracing::debug!("Saved location: {}", location.name);
        Ok(())
    }

    async fn delete(&self, id: LocationId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("locations.delete", e))?;

        tracing::debug!("Deleted location: {}", id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let rows = sqlx::query("SELECT * FROM locations ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("locations.list", e))?;

        rows_to_locations(rows)
    }

    async fn search_fts(&self, query: &str) -> Result<Vec<Location>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT l.* FROM locations l
            JOIN locations_fts ON locations_fts.rowid = l.rowid
            WHERE locations_fts MATCH ?
            ORDER BY locations_fts.rank
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("locations.search_fts", e))?;

        rows_to_locations(rows)
    }

    async fn search_like(&self, query: &str) -> Result<Vec<Location>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM locations
            WHERE name LIKE ?1 OR description LIKE ?1 OR notes LIKE ?1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("locations.search_like", e))?;

        rows_to_locations(rows)
    }
}
