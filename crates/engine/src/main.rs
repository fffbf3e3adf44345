//! WorldWeaver Engine - Main entry point.
//!
//! Headless bootstrap: opens the store, migrates it, hydrates the services,
//! and seeds sample content on first run. A desktop shell embeds the same
//! [`App`] and binds its screens to the service subscriptions.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use worldweaver_engine::{seed, App, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from a .env file, if present.
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worldweaver_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting WorldWeaver Engine");

    let config = EngineConfig::from_env();
    tracing::info!("Using database at {}", config.database_path.display());

    let app = App::connect(&config).await?;

    // First run: give the GM something to look at.
    if app.services.campaign.campaigns().await.is_empty() {
        tracing::info!("No campaigns found, seeding sample content");
        seed::seed_sample_content(&app).await?;
    }

    let services = &app.services;
    tracing::info!(
        campaigns = services.campaign.campaigns().await.len(),
        characters = services.character.characters().await.len(),
        locations = services.location.locations().await.len(),
        lore_entries = services.lore.entries().await.len(),
        encounters = services.encounter.encounters().await.len(),
        "WorldWeaver store ready"
    );

    if let Some(active) = services.campaign.active_campaign().await {
        tracing::info!("Active campaign: {}", active.name);
    }

    Ok(())
}
