//! Application state shared across handlers

use sqlx::PgPool;

use crate::repositories::{ItemRepository, ledger::LedgerRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub item_repository: ItemRepository,
    pub ledger_repository: LedgerRepository,
}
