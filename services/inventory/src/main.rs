use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod config;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;

use common::database;

use crate::{
    repositories::{ItemRepository, ledger::LedgerRepository},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting inventory service");

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let item_repository = ItemRepository::new(pool.clone());
    let ledger_repository = LedgerRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        item_repository,
        ledger_repository,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let service_config = config::ServiceConfig::from_env();
    let listener = tokio::net::TcpListener::bind(&service_config.listen_addr).await?;
    info!(
        "Inventory service listening on {}",
        service_config.listen_addr
    );

    axum::serve(listener, app).await?;

    Ok(())
}
