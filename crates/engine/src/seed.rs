//! First-run sample content.
//!
//! Seeds the store with a small ready-made campaign so the application has
//! something to show before the GM enters their own world.

use worldweaver_domain::{
    Ability, AbilityScores, Alignment, CharacterType, EncounterDifficulty, EncounterParticipant,
    LocationType, LoreCategory, ParticipantType, Spellcasting,
};

use crate::app::App;
use crate::services::{
    CreateCampaignData, CreateCharacterData, CreateEncounterData, CreateLocationData,
    CreateLoreEntryData, ServiceError,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Populate an empty store with the sample campaign.
pub async fn seed_sample_content(app: &App) -> Result<(), ServiceError> {
    let services = &app.services;

    let campaign_id = services
        .campaign
        .add_campaign(CreateCampaignData {
            name: "The Shadow of Malachar".to_string(),
            description: "Five hundred years after the Great War, the descendants of the \
                          Lich King Malachar seek to resurrect their master and plunge the \
                          world into darkness once more."
                .to_string(),
            setting: "The Kingdom of Aldoria and surrounding lands".to_string(),
            player_characters: strings(&[
                "Thorne Ironheart",
                "Elara Nightshade",
                "Grimble Woodfoot",
            ]),
            active_quests: strings(&[
                "The Awakening Darkness: Investigate undead sightings near Ravenhollow",
                "The Missing Blacksmith: Find the missing blacksmith of Ravenhollow",
            ]),
            completed_quests: Vec::new(),
            notes: "Players are currently in the village of Ravenhollow investigating \
                    reports of undead activity."
                .to_string(),
        })
        .await?;
    services.campaign.set_active_campaign(Some(campaign_id)).await;

    // Characters: one of each kind
    services
        .character
        .add_character(CreateCharacterData {
            class_name: Some("Fighter".to_string()),
            level: Some(5),
            ability_scores: Some(AbilityScores::new(16, 12, 18, 10, 14, 8)),
            max_hit_points: Some(45),
            armor_class: Some(18),
            background: Some("Soldier".to_string()),
            alignment: Some(Alignment::LawfulGood),
            description: Some(
                "A stout dwarf with a braided beard and battle scars. Known for his \
                 unwavering loyalty and tactical prowess."
                    .to_string(),
            ),
            inventory: Some(strings(&[
                "Plate Armor",
                "Warhammer",
                "Shield",
                "Potion of Healing (2)",
                "50 gold pieces",
            ])),
            features: Some(strings(&[
                "Second Wind",
                "Action Surge",
                "Improved Critical",
                "Dwarven Resilience",
            ])),
            proficiencies: Some(strings(&["Athletics", "Intimidation", "Smith's tools"])),
            notes: Some(
                "Member of the Ironheart clan from the mountains of Kragspire. Seeking \
                 vengeance against the orcs who destroyed his home."
                    .to_string(),
            ),
            ..CreateCharacterData::new(
                "Thorne Ironheart",
                CharacterType::PlayerCharacter,
                "Dwarf",
            )
        })
        .await?;

    services
        .character
        .add_character(CreateCharacterData {
            class_name: Some("Wizard".to_string()),
            level: Some(7),
            ability_scores: Some(AbilityScores::new(8, 14, 12, 18, 16, 14)),
            max_hit_points: Some(35),
            armor_class: Some(13),
            alignment: Some(Alignment::NeutralGood),
            description: Some(
                "A tall, slender elf with silver hair and piercing blue eyes. She speaks \
                 softly but with authority."
                    .to_string(),
            ),
            features: Some(strings(&["Arcane Recovery", "Spell Mastery", "Fey Ancestry"])),
            spellcasting: Some(
                Spellcasting::new(Ability::Intelligence)
                    .with_known_spells(strings(&[
                        "Fireball",
                        "Counterspell",
                        "Shield",
                        "Detect Magic",
                    ]))
                    .with_slots(vec![4, 3, 3, 1]),
            ),
            notes: Some(
                "Court mage to King Aldric. Has knowledge of ancient artifacts and can \
                 provide magical assistance to the party."
                    .to_string(),
            ),
            ..CreateCharacterData::new(
                "Elara Nightshade",
                CharacterType::NonPlayerCharacter,
                "Elf",
            )
        })
        .await?;

    services
        .character
        .add_character(CreateCharacterData {
            ability_scores: Some(AbilityScores::new(18, 13, 20, 7, 9, 7)),
            max_hit_points: Some(84),
            armor_class: Some(15),
            alignment: Some(Alignment::ChaoticEvil),
            description: Some(
                "A massive troll with green, warty skin and razor-sharp claws. Its \
                 regenerative abilities make it a formidable foe."
                    .to_string(),
            ),
            features: Some(strings(&["Regeneration", "Multiattack", "Keen Smell"])),
            notes: Some("Lair located in the Darkwood Swamp. Weakness to fire damage.".to_string()),
            ..CreateCharacterData::new("Grommash the Devourer", CharacterType::Monster, "Troll")
        })
        .await?;

    // Locations, with a building nested inside the city
    let haven_city = services
        .location
        .add_location(CreateLocationData {
            description: "A bustling metropolis nestled between the mountains and the sea. \
                          Known for its grand architecture, diverse population, and \
                          thriving trade."
                .to_string(),
            notable_npcs: strings(&[
                "King Aldric",
                "Elara Nightshade (Court Mage)",
                "Captain Thorne (City Guard)",
            ]),
            points_of_interest: strings(&[
                "Royal Palace",
                "Grand Market",
                "Temple District",
                "Mages' Guild",
                "Harbor",
            ]),
            dangers: strings(&[
                "Thieves' Guild operates in the shadows",
                "Political intrigue and corruption",
            ]),
            treasures: strings(&["Royal Treasury", "Magical artifacts in the Mages' Guild"]),
            ..CreateLocationData::new("Haven City", LocationType::City)
        })
        .await?;

    services
        .location
        .add_location(CreateLocationData {
            description: "A popular tavern in Haven City known for its strong ale, hearty \
                          food, and colorful patrons. A favorite gathering spot for \
                          adventurers."
                .to_string(),
            notable_npcs: strings(&["Greta (Bartender)", "Old Man Wilbur (Storyteller)"]),
            points_of_interest: strings(&[
                "Notice board with job postings",
                "Secret basement room for private meetings",
            ]),
            dangers: strings(&["Bar fights", "Thieves targeting drunk patrons"]),
            treasures: strings(&["Rare wines in the cellar"]),
            parent_id: Some(haven_city),
            ..CreateLocationData::new("The Drunken Dragon Tavern", LocationType::Building)
        })
        .await?;

    services
        .location
        .add_location(CreateLocationData {
            description: "An ancient burial complex beneath the ruins of Castle Blackmoor. \
                          Dark, damp corridors lead to chambers filled with traps and \
                          undead guardians."
                .to_string(),
            notable_npcs: strings(&["Ghost of King Alaric", "Necromancer Zul'than"]),
            points_of_interest: strings(&[
                "Throne Room",
                "Treasury",
                "Ritual Chamber",
                "Catacombs",
            ]),
            dangers: strings(&[
                "Undead guardians",
                "Deadly traps",
                "Cursed artifacts",
                "Collapsing passages",
            ]),
            treasures: strings(&[
                "Crown of the Forgotten King",
                "Ancient spellbooks",
                "Royal jewels",
                "Magical weapons",
            ]),
            ..CreateLocationData::new("Crypt of the Forgotten King", LocationType::Dungeon)
        })
        .await?;

    services
        .location
        .add_location(CreateLocationData {
            description: "A vast, ancient forest with towering trees that block out the \
                          sun. The deeper one goes, the stranger and more dangerous it \
                          becomes."
                .to_string(),
            notable_npcs: strings(&[
                "Elven Ranger Patrols",
                "Dryad Council",
                "Grommash the Troll",
            ]),
            points_of_interest: strings(&[
                "Heart of the Forest (ancient tree)",
                "Fey Crossing",
                "Abandoned Elven Ruins",
                "Crystal Clear Lake",
            ]),
            dangers: strings(&[
                "Territorial wolf packs",
                "Giant spiders",
                "Fey tricksters",
                "Lost travelers who never find their way out",
            ]),
            treasures: strings(&[
                "Rare herbs and plants",
                "Enchanted wood for crafting",
                "Forgotten elven artifacts",
            ]),
            ..CreateLocationData::new("Darkwood Forest", LocationType::Wilderness)
        })
        .await?;

    // Lore
    let creation_myth = services
        .lore
        .add_entry(CreateLoreEntryData {
            title: "The Creation Myth".to_string(),
            content: "In the beginning, there was only the void. From this emptiness \
                      emerged two primordial forces: Order and Chaos. Their eternal \
                      struggle gave birth to the material world and all its inhabitants."
                .to_string(),
            category: LoreCategory::Mythology,
            tags: strings(&["creation", "gods", "origin"]),
            related_entries: Vec::new(),
        })
        .await?;

    let great_war = services
        .lore
        .add_entry(CreateLoreEntryData {
            title: "The Great War".to_string(),
            content: "Five hundred years ago, the kingdoms of men united against the \
                      rising darkness from the north. Led by the legendary hero Aldric \
                      the Brave, they fought a decade-long war against the Lich King \
                      Malachar and his undead armies."
                .to_string(),
            category: LoreCategory::History,
            tags: strings(&["war", "undead", "heroes"]),
            related_entries: Vec::new(),
        })
        .await?;

    services
        .lore
        .add_entry(CreateLoreEntryData {
            title: "The Pantheon".to_string(),
            content: "The world is watched over by twelve major deities, each \
                      representing different aspects of existence. The most widely \
                      worshipped are Solara (goddess of light), Noctis (god of \
                      darkness), Terran (god of earth), and Aquaria (goddess of water)."
                .to_string(),
            category: LoreCategory::Religion,
            tags: strings(&["gods", "worship", "divine"]),
            related_entries: vec![creation_myth],
        })
        .await?;
    services.lore.link_entries(great_war, creation_myth).await?;

    // Encounters
    services
        .encounter
        .add_encounter(CreateEncounterData {
            description: "A group of bandits ambushes the party on the road to Ravenhollow."
                .to_string(),
            location: "Forest Road".to_string(),
            difficulty: EncounterDifficulty::Easy,
            participants: vec![
                EncounterParticipant::new("Thorne Ironheart", ParticipantType::PlayerCharacter)
                    .with_initiative(15)
                    .with_armor_class(18)
                    .with_hit_points(45, 45),
                EncounterParticipant::new("Bandit Leader", ParticipantType::Enemy)
                    .with_initiative(16)
                    .with_armor_class(15)
                    .with_hit_points(32, 32)
                    .with_notes("Dual-wields short swords, has Multiattack"),
                EncounterParticipant::new("Bandit 1", ParticipantType::Enemy)
                    .with_initiative(12)
                    .with_armor_class(12)
                    .with_hit_points(11, 11),
                EncounterParticipant::new("Bandit 2", ParticipantType::Enemy)
                    .with_initiative(8)
                    .with_armor_class(12)
                    .with_hit_points(11, 11),
            ],
            rewards: strings(&[
                "50 gold pieces",
                "Bandit leader's short swords",
                "100 XP per character",
            ]),
            ..CreateEncounterData::new("Bandit Ambush")
        })
        .await?;

    services
        .encounter
        .add_encounter(CreateEncounterData {
            description: "Undead rise from the graves as the party investigates the old \
                          cemetery of Ravenhollow."
                .to_string(),
            location: "Old Cemetery".to_string(),
            difficulty: EncounterDifficulty::Hard,
            participants: vec![
                EncounterParticipant::new("Thorne Ironheart", ParticipantType::PlayerCharacter)
                    .with_initiative(15)
                    .with_armor_class(18)
                    .with_hit_points(45, 45),
                EncounterParticipant::new("Zombie Hulk", ParticipantType::Enemy)
                    .with_initiative(8)
                    .with_armor_class(14)
                    .with_hit_points(85, 85)
                    .with_notes("Resistant to non-magical weapons, vulnerable to radiant damage"),
                EncounterParticipant::new("Skeleton Archer 1", ParticipantType::Enemy)
                    .with_initiative(13)
                    .with_armor_class(13)
                    .with_hit_points(20, 20)
                    .with_notes("Attacks from range with longbow"),
                EncounterParticipant::new("Skeleton Archer 2", ParticipantType::Enemy)
                    .with_initiative(13)
                    .with_armor_class(13)
                    .with_hit_points(20, 20)
                    .with_notes("Attacks from range with longbow"),
                EncounterParticipant::new("Skeleton Warrior 1", ParticipantType::Enemy)
                    .with_initiative(11)
                    .with_armor_class(15)
                    .with_hit_points(26, 26),
                EncounterParticipant::new("Skeleton Warrior 2", ParticipantType::Enemy)
                    .with_initiative(11)
                    .with_armor_class(15)
                    .with_hit_points(26, 26),
            ],
            rewards: strings(&[
                "Ancient amulet (quest item)",
                "Potion of healing",
                "300 XP per character",
            ]),
            ..CreateEncounterData::new("Cemetery Guardians")
        })
        .await?;

    services
        .notification
        .notify(
            "Welcome to WorldWeaver",
            "A sample campaign has been created to get you started.",
        )
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sqlx::sqlite::SqlitePoolOptions;

    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::persistence::run_migrations;
    use crate::infrastructure::ports::ClockPort;

    #[tokio::test]
    async fn seeding_an_empty_store_populates_every_service() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("pool");
        run_migrations(&pool).await.expect("migrations");

        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let app = App::new(pool, clock);
        seed_sample_content(&app).await.expect("seeded");

        assert_eq!(app.services.campaign.campaigns().await.len(), 1);
        assert!(app.services.campaign.active_campaign().await.is_some());
        assert_eq!(app.services.character.characters().await.len(), 3);
        assert_eq!(app.services.location.locations().await.len(), 4);
        assert_eq!(app.services.location.top_level_locations().await.len(), 3);
        assert_eq!(app.services.lore.entries().await.len(), 3);
        assert_eq!(app.services.encounter.encounters().await.len(), 2);
        assert_eq!(app.services.notification.unread_count().await, 1);

        // Reload from the database: everything round-trips
        app.load_all().await;
        assert_eq!(app.services.character.characters().await.len(), 3);
        assert_eq!(app.services.encounter.encounters().await.len(), 2);
    }
}
