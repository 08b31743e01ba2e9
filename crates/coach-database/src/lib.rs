//! # coach-database
//!
//! The notification ledger contract and its adapters: PostgreSQL through
//! sqlx for production, and a process-local map for tests and database-less
//! deployments.

pub mod connection;
pub mod ledger;
pub mod memory;
pub mod repositories;

use std::sync::Arc;

use coach_core::config::{DatabaseConfig, LedgerBackend};
use coach_core::result::AppResult;

pub use connection::DatabasePool;
pub use ledger::{DayScope, NotificationLedger, STALE_PENDING_REASON, StatusUpdate};
pub use memory::InMemoryLedger;
pub use repositories::NotificationRepository;

/// Build the ledger selected by `database.backend`.
///
/// For PostgreSQL this connects the pool and, when `migrate` is set, applies
/// pending migrations first.
pub async fn open_ledger(
    config: &DatabaseConfig,
    migrate: bool,
) -> AppResult<Arc<dyn NotificationLedger>> {
    match config.backend {
        LedgerBackend::Memory => {
            tracing::warn!("Using in-memory notification ledger; records are not durable");
            Ok(Arc::new(InMemoryLedger::new()))
        }
        LedgerBackend::Postgres => {
            let db = DatabasePool::connect(config).await?;
            if migrate {
                db.migrate().await?;
            }
            Ok(Arc::new(NotificationRepository::new(db.into_pool())))
        }
    }
}
