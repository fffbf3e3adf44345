//! Integration tests for the SQLite adapters against in-memory databases.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use worldweaver_domain::{
    Ability, AbilityScores, Campaign, Character, CharacterType, Encounter, EncounterDifficulty,
    EncounterParticipant, Location, LocationType, LoreCategory, LoreEntry, LoreEntryId,
    ParticipantType, Spellcasting,
};

use super::{
    run_migrations, SqliteCampaignRepo, SqliteCharacterRepo, SqliteEncounterRepo,
    SqliteLocationRepo, SqliteLoreRepo,
};
use crate::infrastructure::ports::{
    CampaignRepo, CharacterRepo, EncounterRepo, LocationRepo, LoreRepo,
};

/// In-memory pool pinned to a single connection so every query sees the same
/// database.
async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

fn fixed_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let pool = test_pool().await;
    run_migrations(&pool).await.expect("second run is a no-op");
}

#[tokio::test]
async fn campaign_round_trip_preserves_list_fields() {
    let repo = SqliteCampaignRepo::new(test_pool().await);
    let campaign = Campaign::new(
        "The Shadow of Malachar",
        "The Lich King's descendants stir.",
        "The Kingdom of Aldoria",
        fixed_time(),
    )
    .with_player_characters(vec![
        "Thorne Ironheart".to_string(),
        "Elara Nightshade".to_string(),
    ])
    .with_active_quests(vec!["The Awakening Darkness".to_string()])
    .with_notes("Players are in Ravenhollow.");

    repo.save(&campaign).await.expect("save");
    let loaded = repo.get(campaign.id).await.expect("get").expect("exists");

    assert_eq!(loaded, campaign);
}

#[tokio::test]
async fn campaign_get_missing_returns_none() {
    let repo = SqliteCampaignRepo::new(test_pool().await);
    let loaded = repo
        .get(worldweaver_domain::CampaignId::new())
        .await
        .expect("get");
    assert!(loaded.is_none());
}

#[tokio::test]
async fn campaign_list_orders_by_updated_at_desc() {
    let repo = SqliteCampaignRepo::new(test_pool().await);
    let t0 = fixed_time();

    let older = Campaign::new("Older", "", "", t0);
    let mut newer = Campaign::new("Newer", "", "", t0);
    newer.updated_at = t0 + Duration::hours(1);

    repo.save(&older).await.expect("save older");
    repo.save(&newer).await.expect("save newer");

    let all = repo.list_all().await.expect("list");
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Newer", "Older"]);
}

#[tokio::test]
async fn campaign_upsert_updates_in_place() {
    let repo = SqliteCampaignRepo::new(test_pool().await);
    let mut campaign = Campaign::new("Before", "", "", fixed_time());
    repo.save(&campaign).await.expect("insert");

    campaign.name = "After".to_string();
    campaign.active_quests = vec!["New quest".to_string()];
    repo.save(&campaign).await.expect("update");

    let all = repo.list_all().await.expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "After");
    assert_eq!(all[0].active_quests, vec!["New quest"]);
}

#[tokio::test]
async fn campaign_fts_search_finds_and_ranks() {
    let repo = SqliteCampaignRepo::new(test_pool().await);
    let t = fixed_time();

    repo.save(
        &Campaign::new("The Shadow of Malachar", "Undead rise in the north", "Aldoria", t)
            .with_notes("lich king"),
    )
    .await
    .expect("save");
    repo.save(&Campaign::new("Sunny Isles", "A beach adventure", "The Coral Coast", t))
        .await
        .expect("save");

    let hits = repo.search_fts("undead OR lich").await.expect("fts");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "The Shadow of Malachar");

    // Updated rows stay in sync with the index
    let mut beach = repo.search_fts("beach").await.expect("fts").remove(0);
    beach.description = "A desert adventure".to_string();
    repo.save(&beach).await.expect("update");

    assert!(repo.search_fts("beach").await.expect("fts").is_empty());
    assert_eq!(repo.search_fts("desert").await.expect("fts").len(), 1);
}

#[tokio::test]
async fn campaign_like_search_matches_substrings() {
    let repo = SqliteCampaignRepo::new(test_pool().await);
    repo.save(&Campaign::new(
        "The Shadow of Malachar",
        "",
        "Aldoria",
        fixed_time(),
    ))
    .await
    .expect("save");

    // "alach" is not a full token, so only LIKE finds it
    let hits = repo.search_like("alach").await.expect("like");
    assert_eq!(hits.len(), 1);
    assert!(repo.search_like("zzz").await.expect("like").is_empty());
}

#[tokio::test]
async fn campaign_delete_removes_row_and_index_entry() {
    let repo = SqliteCampaignRepo::new(test_pool().await);
    let campaign = Campaign::new("Doomed", "short lived", "", fixed_time());
    repo.save(&campaign).await.expect("save");

    repo.delete(campaign.id).await.expect("delete");
    assert!(repo.get(campaign.id).await.expect("get").is_none());
    assert!(repo.search_fts("Doomed").await.expect("fts").is_empty());
}

#[tokio::test]
async fn character_round_trip_with_spellcasting() {
    let repo = SqliteCharacterRepo::new(test_pool().await);
    let wizard = Character::new(
        "Elara Nightshade",
        CharacterType::NonPlayerCharacter,
        "Elf",
        fixed_time(),
    )
    .with_class("Wizard", "")
    .with_level(7)
    .with_ability_scores(AbilityScores::new(8, 14, 12, 18, 16, 14))
    .with_hit_points(35, 35)
    .with_armor_class(13)
    .with_features(vec!["Arcane Recovery".to_string(), "Fey Ancestry".to_string()])
    .with_spellcasting(
        Spellcasting::new(Ability::Intelligence)
            .with_known_spells(vec!["Fireball".to_string()])
            .with_slots(vec![4, 3, 3, 1]),
    );

    repo.save(&wizard).await.expect("save");
    let loaded = repo.get(wizard.id).await.expect("get").expect("exists");
    assert_eq!(loaded, wizard);
    assert_eq!(loaded.spell_save_dc(), Some(15));
}

#[tokio::test]
async fn character_round_trip_without_spellcasting() {
    let repo = SqliteCharacterRepo::new(test_pool().await);
    let troll = Character::new("Grommash", CharacterType::Monster, "Troll", fixed_time())
        .with_hit_points(84, 84)
        .with_inventory(vec!["Giant club".to_string()]);

    repo.save(&troll).await.expect("save");
    let loaded = repo.get(troll.id).await.expect("get").expect("exists");
    assert!(loaded.spellcasting.is_none());
    assert_eq!(loaded.inventory, vec!["Giant club"]);
}

#[tokio::test]
async fn character_fts_searches_race_column() {
    let repo = SqliteCharacterRepo::new(test_pool().await);
    repo.save(&Character::new(
        "Thorne Ironheart",
        CharacterType::PlayerCharacter,
        "Dwarf",
        fixed_time(),
    ))
    .await
    .expect("save");

    assert_eq!(repo.search_fts("dwarf").await.expect("fts").len(), 1);
    assert!(repo.search_fts("elf").await.expect("fts").is_empty());
}

#[tokio::test]
async fn location_round_trip_with_hierarchy_and_coordinates() {
    let repo = SqliteLocationRepo::new(test_pool().await);
    let city = Location::new(
        "Haven City",
        LocationType::City,
        "A bustling metropolis",
        fixed_time(),
    )
    .with_map_coordinates(12.5, -3.0);
    let tavern = Location::new(
        "The Drunken Dragon Tavern",
        LocationType::Building,
        "A popular tavern",
        fixed_time(),
    )
    .with_parent(city.id)
    .with_dangers(vec!["Bar fights".to_string()]);

    repo.save(&city).await.expect("save city");
    repo.save(&tavern).await.expect("save tavern");

    let loaded_city = repo.get(city.id).await.expect("get").expect("exists");
    let loaded_tavern = repo.get(tavern.id).await.expect("get").expect("exists");

    assert_eq!(loaded_city, city);
    assert_eq!(loaded_tavern.parent_id, Some(city.id));
    assert!(loaded_city.parent_id.is_none());
}

#[tokio::test]
async fn lore_round_trip_with_related_entries() {
    let repo = SqliteLoreRepo::new(test_pool().await);
    let related = LoreEntryId::new();
    let entry = LoreEntry::new(
        "The Great War",
        "The kingdoms of men united against the rising darkness.",
        LoreCategory::History,
        fixed_time(),
    )
    .with_tags(vec!["war".to_string(), "undead".to_string()])
    .with_related_entries(vec![related]);

    repo.save(&entry).await.expect("save");
    let loaded = repo.get(entry.id).await.expect("get").expect("exists");
    assert_eq!(loaded, entry);
    assert_eq!(loaded.related_entries, vec![related]);

    assert_eq!(repo.search_fts("darkness").await.expect("fts").len(), 1);
}

#[tokio::test]
async fn encounter_round_trip_with_participants() {
    let repo = SqliteEncounterRepo::new(test_pool().await);
    let mut encounter = Encounter::new(
        "Bandit Ambush",
        "Bandits ambush the party.",
        "Forest Road",
        fixed_time(),
    )
    .with_difficulty(EncounterDifficulty::Easy)
    .with_participants(vec![
        EncounterParticipant::new("Thorne", ParticipantType::PlayerCharacter)
            .with_initiative(15)
            .with_hit_points(45, 45),
        EncounterParticipant::new("Bandit Leader", ParticipantType::Enemy)
            .with_initiative(16)
            .with_hit_points(32, 32)
            .with_conditions(vec!["Poisoned".to_string()]),
    ])
    .with_rewards(vec!["50 gold pieces".to_string()]);
    encounter.is_active = true;

    repo.save(&encounter).await.expect("save");
    let loaded = repo.get(encounter.id).await.expect("get").expect("exists");
    assert_eq!(loaded, encounter);
    assert!(loaded.is_active);
    assert_eq!(loaded.participants[1].conditions, vec!["Poisoned"]);
}

#[tokio::test]
async fn connect_creates_file_backed_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("worldweaver.db");
    let pool = super::connect(db_path.to_str().expect("utf-8 path"))
        .await
        .expect("connect");

    let repo = SqliteCampaignRepo::new(pool);
    repo.save(&Campaign::new("Persisted", "", "", fixed_time()))
        .await
        .expect("save");

    assert!(db_path.exists());
    assert_eq!(repo.list_all().await.expect("list").len(), 1);
}
