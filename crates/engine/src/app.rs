//! Application state and composition.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::EngineConfig;
use crate::infrastructure::{
    clock::SystemClock,
    persistence::{
        connect, SqliteCampaignRepo, SqliteCharacterRepo, SqliteEncounterRepo, SqliteLocationRepo,
        SqliteLoreRepo,
    },
    ports::{CampaignRepo, CharacterRepo, ClockPort, EncounterRepo, LocationRepo, LoreRepo},
};
use crate::services::{
    CampaignService, CharacterService, EncounterService, LocationService, LoreService,
    NotificationService,
};

/// Container for the repository ports.
pub struct Repositories {
    pub campaign: Arc<dyn CampaignRepo>,
    pub character: Arc<dyn CharacterRepo>,
    pub location: Arc<dyn LocationRepo>,
    pub lore: Arc<dyn LoreRepo>,
    pub encounter: Arc<dyn EncounterRepo>,
}

impl Repositories {
    /// SQLite-backed repositories sharing one pool.
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            campaign: Arc::new(SqliteCampaignRepo::new(pool.clone())),
            character: Arc::new(SqliteCharacterRepo::new(pool.clone())),
            location: Arc::new(SqliteLocationRepo::new(pool.clone())),
            lore: Arc::new(SqliteLoreRepo::new(pool.clone())),
            encounter: Arc::new(SqliteEncounterRepo::new(pool)),
        }
    }
}

/// Container for the domain services a UI shell binds to.
pub struct Services {
    pub campaign: Arc<CampaignService>,
    pub character: Arc<CharacterService>,
    pub location: Arc<LocationService>,
    pub lore: Arc<LoreService>,
    pub encounter: Arc<EncounterService>,
    pub notification: Arc<NotificationService>,
}

/// Main application state.
pub struct App {
    pub services: Services,
}

impl App {
    /// Wire services onto SQLite repositories over the given pool.
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self::with_repositories(Repositories::sqlite(pool), clock)
    }

    /// Wire services onto arbitrary repository implementations.
    pub fn with_repositories(repos: Repositories, clock: Arc<dyn ClockPort>) -> Self {
        let services = Services {
            campaign: Arc::new(CampaignService::new(repos.campaign, clock.clone())),
            character: Arc::new(CharacterService::new(repos.character, clock.clone())),
            location: Arc::new(LocationService::new(repos.location, clock.clone())),
            lore: Arc::new(LoreService::new(repos.lore, clock.clone())),
            encounter: Arc::new(EncounterService::new(repos.encounter, clock.clone())),
            notification: Arc::new(NotificationService::new(clock)),
        };
        Self { services }
    }

    /// Open the configured database, migrate it, and hydrate every service.
    pub async fn connect(config: &EngineConfig) -> anyhow::Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db_path = config
            .database_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("database path is not valid UTF-8"))?;

        let pool = connect(db_path).await?;
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let app = Self::new(pool, clock);
        app.load_all().await;
        Ok(app)
    }

    /// Hydrate every service's in-memory list from the database.
    pub async fn load_all(&self) {
        self.services.campaign.load().await;
        self.services.character.load().await;
        self.services.location.load().await;
        self.services.lore.load().await;
        self.services.encounter.load().await;
    }
}
