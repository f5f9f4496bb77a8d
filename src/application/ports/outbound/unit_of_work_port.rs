//! Unit of work port - Transaction boundary shared by a session's repositories

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::repository_port::{CourierRepositoryPort, OrderRepositoryPort};

/// Groups repository writes so they commit or roll back together
///
/// Writes issued outside a transaction are committed immediately.
#[async_trait]
pub trait UnitOfWorkPort: Send + Sync {
    /// Open a transaction unless one is already open
    ///
    /// Returns `true` when this call opened it; only that caller should
    /// commit or roll back.
    async fn begin(&self) -> Result<bool>;

    async fn commit(&self) -> Result<()>;

    /// Discard everything written since `begin`; a no-op outside a transaction
    async fn rollback(&self) -> Result<()>;

    async fn in_transaction(&self) -> bool;
}

/// Repositories bound to one unit of work
#[derive(Clone)]
pub struct RepositorySession {
    pub orders: Arc<dyn OrderRepositoryPort>,
    pub couriers: Arc<dyn CourierRepositoryPort>,
    pub unit_of_work: Arc<dyn UnitOfWorkPort>,
}

/// Opens an independent session per use case invocation or tick
#[async_trait]
pub trait SessionFactoryPort: Send + Sync {
    async fn open(&self) -> Result<RepositorySession>;
}
