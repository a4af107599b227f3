use anyhow::Result;
use tracing::info;

use pet_groups_engine::config::Config;
use pet_groups_engine::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging)?;

    info!("Starting pet groups engine v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    // Sweep invitations that lapsed while nothing was running
    let store = persistence::PgStore::new(pool).with_max_retries(config.database.max_retries);
    let engine = pet_groups_engine::GroupEngine::with_system_clock(
        std::sync::Arc::new(store),
        config.limits.clone(),
    );
    let expired = engine.expire_stale_invitations().await?;
    info!(
        expired = expired,
        max_groups_per_creator = config.limits.max_groups_per_creator,
        "Store ready"
    );

    Ok(())
}
