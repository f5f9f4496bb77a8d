//! Repository ports - Interfaces for aggregate persistence
//!
//! Couriers are persisted together with their storage slots. Every list is
//! returned ordered by identity so dispatch stays deterministic.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::{Courier, Order};
use crate::domain::value_objects::{CourierId, OrderId};

// =============================================================================
// Order Repository Port
// =============================================================================

#[async_trait]
pub trait OrderRepositoryPort: Send + Sync {
    /// Insert a new order; fails if the id is already stored
    async fn add(&self, order: &Order) -> Result<()>;

    /// Overwrite a stored order; fails if it does not exist
    async fn update(&self, order: &Order) -> Result<()>;

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// The CREATED order with the lowest id
    async fn get_first_created(&self) -> Result<Option<Order>>;

    async fn get_all_assigned(&self) -> Result<Vec<Order>>;

    async fn get_all_not_completed(&self) -> Result<Vec<Order>>;
}

// =============================================================================
// Courier Repository Port
// =============================================================================

#[async_trait]
pub trait CourierRepositoryPort: Send + Sync {
    /// Insert a new courier with its slots; fails if the id is already stored
    async fn add(&self, courier: &Courier) -> Result<()>;

    /// Overwrite a stored courier and replace its slots
    async fn update(&self, courier: &Courier) -> Result<()>;

    async fn get_by_id(&self, id: CourierId) -> Result<Option<Courier>>;

    async fn get_all(&self) -> Result<Vec<Courier>>;

    /// Couriers whose every slot is empty
    async fn get_all_free(&self) -> Result<Vec<Courier>>;

    /// Couriers holding at least one order
    async fn get_all_busy(&self) -> Result<Vec<Courier>>;
}
