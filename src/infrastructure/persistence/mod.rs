//! Persistence adapters
//!
//! Two interchangeable stores back the repository and unit of work ports:
//! an in-process [`InMemoryStore`] and a [`SqliteStore`] on a sqlx pool.
//! [`StoreBackend`] picks one at startup from configuration.

mod memory_store;
mod sqlite_store;

pub use memory_store::InMemoryStore;
pub use sqlite_store::SqliteStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::ports::outbound::{RepositorySession, SessionFactoryPort};
use crate::infrastructure::config::DatabaseConfig;

/// Enum wrapper for store backends to enable runtime selection
#[derive(Clone)]
pub enum StoreBackend {
    Memory(InMemoryStore),
    Sqlite(SqliteStore),
}

impl StoreBackend {
    /// SQLite when a database URL is configured, in-memory otherwise
    pub async fn from_config(config: Option<&DatabaseConfig>) -> Result<Self> {
        match config {
            Some(db) => {
                let store = SqliteStore::connect(&db.url, db.max_connections).await?;
                tracing::info!("Using SQLite store at {}", db.url);
                Ok(StoreBackend::Sqlite(store))
            }
            None => {
                tracing::info!("DATABASE_URL not set, using in-memory store");
                Ok(StoreBackend::Memory(InMemoryStore::new()))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Memory(_) => "memory",
            StoreBackend::Sqlite(_) => "sqlite",
        }
    }
}

#[async_trait]
impl SessionFactoryPort for StoreBackend {
    async fn open(&self) -> Result<RepositorySession> {
        match self {
            StoreBackend::Memory(store) => store.open().await,
            StoreBackend::Sqlite(store) => store.open().await,
        }
    }
}
