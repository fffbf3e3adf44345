//! Character repository implementation for SQLite.
//!
//! Ability scores and spellcasting are stored as JSON documents; the
//! remaining attributes get their own columns so type and level can be
//! indexed and filtered in SQL.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use worldweaver_domain::{Character, CharacterId, CharacterType, Spellcasting};

use super::{decode_json, encode_json, like_pattern, parse_timestamp};
use crate::infrastructure::ports::{CharacterRepo, RepoError};

/// Repository for Character rows
pub struct SqliteCharacterRepo {
    pool: SqlitePool,
}

impl SqliteCharacterRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Convert a characters row to a Character
fn row_to_character(row: &SqliteRow) -> Result<Character, RepoError> {
    let id: String = row.try_get("id")?;
    let character_type: String = row.try_get("character_type")?;
    let ability_scores: String = row.try_get("ability_scores")?;
    let alignment: String = row.try_get("alignment")?;
    let proficiencies: String = row.try_get("proficiencies")?;
    let inventory: String = row.try_get("inventory")?;
    let features: String = row.try_get("features")?;
    let spellcasting: Option<String> = row.try_get("spellcasting")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Character {
        id: id
            .parse::<CharacterId>()
            .map_err(|e| RepoError::serialization(e))?,
        name: row.try_get("name")?,
        character_type: character_type
            .parse::<CharacterType>()
            .map_err(|e| RepoError::serialization(e))?,
        race: row.try_get("race")?,
        class_name: row.try_get("class_name")?,
        subclass: row.try_get("subclass")?,
        level: row.try_get("level")?,
        experience_points: row.try_get("experience_points")?,
        ability_scores: decode_json(&ability_scores)?,
        hit_points: row.try_get("hit_points")?,
        max_hit_points: row.try_get("max_hit_points")?,
        armor_class: row.try_get("armor_class")?,
        background: row.try_get("background")?,
        alignment: alignment.parse().map_err(|e| RepoError::serialization(e))?,
        description: row.try_get("description")?,
        proficiencies: decode_json(&proficiencies)?,
        inventory: decode_json(&inventory)?,
        features: decode_json(&features)?,
        spellcasting: spellcasting
            .as_deref()
            .map(decode_json::<Spellcasting>)
            .transpose()?,
        notes: row.try_get("notes")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn rows_to_characters(rows: Vec<SqliteRow>) -> Result<Vec<Character>, RepoError> {
    rows.iter().map(row_to_character).collect()
}

#[async_trait]
impl CharacterRepo for SqliteCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        let row = sqlx::query("SELECT * FROM characters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("characters.get", e))?;

        row.as_ref().map(row_to_character).transpose()
    }

    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        let spellcasting = character
            .spellcasting
            .as_ref()
            .map(encode_json)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO characters (
                id, name, character_type, race, class_name, subclass,
                level, experience_points, ability_scores,
                hit_points, max_hit_points, armor_class,
                background, alignment, description,
                proficiencies, inventory, features, spellcasting,
                notes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                character_type = excluded.character_type,
                race = excluded.race,
                class_name = excluded.class_name,
                subclass = excluded.subclass,
                level = excluded.level,
                experience_points = excluded.experience_points,
                ability_scores = excluded.ability_scores,
                hit_points = excluded.hit_points,
                max_hit_points = excluded.max_hit_points,
                armor_class = excluded.armor_class,
                background = excluded.background,
                alignment = excluded.alignment,
                description = excluded.description,
                proficiencies = excluded.proficiencies,
                inventory = excluded.inventory,
                features = excluded.features,
                spellcasting = excluded.spellcasting,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(character.id.to_string())
        .bind(&character.name)
        .bind(character.character_type.as_str())
        .bind(&character.race)
        .bind(&character.class_name)
        .bind(&character.subclass)
        .bind(character.level)
        .bind(character.experience_points)
        .bind(encode_json(&character.ability_scores)?)
        .bind(character.hit_points)
        .bind(character.max_hit_points)
        .bind(character.armor_class)
        .bind(&character.background)
        .bind(character.alignment.as_str())
        .bind(&character.description)
        .bind(encode_json(&character.proficiencies)?)
        .bind(encode_json(&character.inventory)?)
        .bind(encode_json(&character.features)?)
        .bind(spellcasting)
        .bind(&character.notes)
        .bind(character.created_at.to_rfc3339())
        .bind(character.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("characters.save", e))?;

        tracing::debug!("Saved character: {}", character.name);
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("characters.delete", e))?;

        tracing::debug!("Deleted character: {}", id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query("SELECT * FROM characters ORDER BY updated_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("characters.list", e))?;

        rows_to_characters(rows)
    }

    async fn search_fts(&self, query: &str) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT c.* FROM characters c
            JOIN characters_fts ON characters_fts.rowid = c.rowid
            WHERE characters_fts MATCH ?
            ORDER BY characters_fts.rank
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("characters.search_fts", e))?;

        rows_to_characters(rows)
    }

    async fn search_like(&self, query: &str) -> Result<Vec<Character>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM characters
            WHERE name LIKE ?1 OR race LIKE ?1 OR description LIKE ?1 OR notes LIKE ?1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("characters.search_like", e))?;

        rows_to_characters(rows)
    }
}
