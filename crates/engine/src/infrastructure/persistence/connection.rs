//! Database connection and schema migrations.
//!
//! The schema is versioned through a `_migrations` table; each migration is
//! a list of statements executed in order. Statements are kept as separate
//! constants rather than one split string because the FTS sync triggers
//! contain semicolons in their bodies.

use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::RepoError;

/// Current database schema version
const SCHEMA_VERSION: i32 = 2;

/// Open (creating if needed) the database at `db_path` and bring the schema
/// up to date.
pub async fn connect(db_path: &str) -> Result<SqlitePool, RepoError> {
    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await
        .map_err(|e| RepoError::database("connect", e))?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Run all pending migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("migrations", e))?;

    let current_version = current_version(pool).await?;
    tracing::debug!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            "Running database migrations from v{} to v{}",
            current_version,
            SCHEMA_VERSION
        );
        for version in (current_version + 1)..=SCHEMA_VERSION {
            run_migration(pool, version).await?;
        }
    }

    Ok(())
}

async fn current_version(pool: &SqlitePool) -> Result<i32, RepoError> {
    let row = sqlx::query("SELECT MAX(version) as version FROM _migrations")
        .fetch_optional(pool)
        .await
        .map_err(|e| RepoError::database("migrations", e))?;

    Ok(row
        .and_then(|row| row.try_get::<i32, _>("version").ok())
        .unwrap_or(0))
}

async fn run_migration(pool: &SqlitePool, version: i32) -> Result<(), RepoError> {
    let (name, statements) = match version {
        1 => ("initial_schema", MIGRATION_V1),
        2 => ("full_text_search", MIGRATION_V2),
        _ => {
            tracing::warn!("Unknown migration version: {}", version);
            return Ok(());
        }
    };

    tracing::info!("Applying migration v{}: {}", version, name);

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("migrations", e))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(version)
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| RepoError::database("migrations", e))?;

    Ok(())
}

/// Migration v1: one table per entity type, JSON-encoded list columns.
const MIGRATION_V1: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS campaigns (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        setting TEXT NOT NULL DEFAULT '',
        player_characters TEXT NOT NULL DEFAULT '[]',
        active_quests TEXT NOT NULL DEFAULT '[]',
        completed_quests TEXT NOT NULL DEFAULT '[]',
        notes TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_campaigns_updated ON campaigns(updated_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        character_type TEXT NOT NULL,
        race TEXT NOT NULL DEFAULT '',
        class_name TEXT NOT NULL DEFAULT '',
        subclass TEXT NOT NULL DEFAULT '',
        level INTEGER NOT NULL DEFAULT 1,
        experience_points INTEGER NOT NULL DEFAULT 0,
        ability_scores TEXT NOT NULL,
        hit_points INTEGER NOT NULL DEFAULT 10,
        max_hit_points INTEGER NOT NULL DEFAULT 10,
        armor_class INTEGER NOT NULL DEFAULT 10,
        background TEXT NOT NULL DEFAULT '',
        alignment TEXT NOT NULL DEFAULT 'true_neutral',
        description TEXT NOT NULL DEFAULT '',
        proficiencies TEXT NOT NULL DEFAULT '[]',
        inventory TEXT NOT NULL DEFAULT '[]',
        features TEXT NOT NULL DEFAULT '[]',
        spellcasting TEXT,
        notes TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_characters_type ON characters(character_type)",
    "CREATE INDEX IF NOT EXISTS idx_characters_updated ON characters(updated_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        location_type TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        notable_npcs TEXT NOT NULL DEFAULT '[]',
        points_of_interest TEXT NOT NULL DEFAULT '[]',
        dangers TEXT NOT NULL DEFAULT '[]',
        treasures TEXT NOT NULL DEFAULT '[]',
        parent_id TEXT,
        map_x REAL,
        map_y REAL,
        notes TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_locations_parent ON locations(parent_id)",
    "CREATE INDEX IF NOT EXISTS idx_locations_updated ON locations(updated_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS lore_entries (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        related_entries TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_lore_category ON lore_entries(category)",
    "CREATE INDEX IF NOT EXISTS idx_lore_updated ON lore_entries(updated_at DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS encounters (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        location TEXT NOT NULL DEFAULT '',
        difficulty TEXT NOT NULL DEFAULT 'medium',
        participants TEXT NOT NULL DEFAULT '[]',
        rewards TEXT NOT NULL DEFAULT '[]',
        notes TEXT NOT NULL DEFAULT '',
        is_active INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_encounters_active ON encounters(is_active)",
    "CREATE INDEX IF NOT EXISTS idx_encounters_updated ON encounters(updated_at DESC)",
];

/// Migration v2: external-content FTS5 indexes with sync triggers.
const MIGRATION_V2: &[&str] = &[
    // Campaigns
    r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS campaigns_fts USING fts5(
        name, description, setting, notes,
        content='campaigns', content_rowid='rowid'
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS campaigns_fts_insert AFTER INSERT ON campaigns BEGIN
        INSERT INTO campaigns_fts(rowid, name, description, setting, notes)
        VALUES (new.rowid, new.name, new.description, new.setting, new.notes);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS campaigns_fts_delete AFTER DELETE ON campaigns BEGIN
        INSERT INTO campaigns_fts(campaigns_fts, rowid, name, description, setting, notes)
        VALUES ('delete', old.rowid, old.name, old.description, old.setting, old.notes);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS campaigns_fts_update AFTER UPDATE ON campaigns BEGIN
        INSERT INTO campaigns_fts(campaigns_fts, rowid, name, description, setting, notes)
        VALUES ('delete', old.rowid, old.name, old.description, old.setting, old.notes);
        INSERT INTO campaigns_fts(rowid, name, description, setting, notes)
        VALUES (new.rowid, new.name, new.description, new.setting, new.notes);
    END
    "#,
    // Characters
    r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS characters_fts USING fts5(
        name, race, description, notes,
        content='characters', content_rowid='rowid'
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS characters_fts_insert AFTER INSERT ON characters BEGIN
        INSERT INTO characters_fts(rowid, name, race, description, notes)
        VALUES (new.rowid, new.name, new.race, new.description, new.notes);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS characters_fts_delete AFTER DELETE ON characters BEGIN
        INSERT INTO characters_fts(characters_fts, rowid, name, race, description, notes)
        VALUES ('delete', old.rowid, old.name, old.race, old.description, old.notes);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS characters_fts_update AFTER UPDATE ON characters BEGIN
        INSERT INTO characters_fts(characters_fts, rowid, name, race, description, notes)
        VALUES ('delete', old.rowid, old.name, old.race, old.description, old.notes);
        INSERT INTO characters_fts(rowid, name, race, description, notes)
        VALUES (new.rowid, new.name, new.race, new.description, new.notes);
    END
    "#,
    // Locations
    r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS locations_fts USING fts5(
        name, description, notes,
        content='locations', content_rowid='rowid'
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS locations_fts_insert AFTER INSERT ON locations BEGIN
        INSERT INTO locations_fts(rowid, name, description, notes)
        VALUES (new.rowid, new.name, new.description, new.notes);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS locations_fts_delete AFTER DELETE ON locations BEGIN
        INSERT INTO locations_fts(locations_fts, rowid, name, description, notes)
        VALUES ('delete', old.rowid, old.name, old.description, old.notes);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS locations_fts_update AFTER UPDATE ON locations BEGIN
        INSERT INTO locations_fts(locations_fts, rowid, name, description, notes)
        VALUES ('delete', old.rowid, old.name, old.description, old.notes);
        INSERT INTO locations_fts(rowid, name, description, notes)
        VALUES (new.rowid, new.name, new.description, new.notes);
    END
    "#,
    // Lore entries
    r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS lore_fts USING fts5(
        title, content,
        content='lore_entries', content_rowid='rowid'
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS lore_fts_insert AFTER INSERT ON lore_entries BEGIN
        INSERT INTO lore_fts(rowid, title, content)
        VALUES (new.rowid, new.title, new.content);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS lore_fts_delete AFTER DELETE ON lore_entries BEGIN
        INSERT INTO lore_fts(lore_fts, rowid, title, content)
        VALUES ('delete', old.rowid, old.title, old.content);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS lore_fts_update AFTER UPDATE ON lore_entries BEGIN
        INSERT INTO lore_fts(lore_fts, rowid, title, content)
        VALUES ('delete', old.rowid, old.title, old.content);
        INSERT INTO lore_fts(rowid, title, content)
        VALUES (new.rowid, new.title, new.content);
    END
    "#,
    // Encounters
    r#"
    CREATE VIRTUAL TABLE IF NOT EXISTS encounters_fts USING fts5(
        name, description, location, notes,
        content='encounters', content_rowid='rowid'
    )
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS encounters_fts_insert AFTER INSERT ON encounters BEGIN
        INSERT INTO encounters_fts(rowid, name, description, location, notes)
        VALUES (new.rowid, new.name, new.description, new.location, new.notes);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS encounters_fts_delete AFTER DELETE ON encounters BEGIN
        INSERT INTO encounters_fts(encounters_fts, rowid, name, description, location, notes)
        VALUES ('delete', old.rowid, old.name, old.description, old.location, old.notes);
    END
    "#,
    r#"
    CREATE TRIGGER IF NOT EXISTS encounters_fts_update AFTER UPDATE ON encounters BEGIN
        INSERT INTO encounters_fts(encounters_fts, rowid, name, description, location, notes)
        VALUES ('delete', old.rowid, old.name, old.description, old.location, old.notes);
        INSERT INTO encounters_fts(rowid, name, description, location, notes)
        VALUES (new.rowid, new.name, new.description, new.location, new.notes);
    END
    "#,
];
