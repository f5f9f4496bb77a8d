//! Domain errors - Business rule violations raised by value objects and entities
//!
//! Validation errors come from malformed construction input; state-conflict
//! errors come from illegal transitions. Neither is retried by the domain.

use super::entities::OrderStatus;
use super::value_objects::{Axis, OrderId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Coordinate {axis} is out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        axis: Axis,
        value: i32,
        min: i32,
        max: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageSlotError {
    #[error("Storage slot name cannot be empty")]
    InvalidName,

    #[error("Storage slot capacity must be positive, got {0}")]
    InvalidCapacity(i32),

    #[error("Order volume must be positive, got {0}")]
    InvalidVolume(i32),

    #[error("Storage slot is occupied or too small for volume {volume}")]
    CannotStore { volume: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourierError {
    #[error("Courier name cannot be empty")]
    InvalidName,

    #[error("Courier speed must be positive, got {0}")]
    InvalidSpeed(i32),

    #[error(transparent)]
    Slot(#[from] StorageSlotError),

    #[error("Courier has no free storage slot for volume {volume}")]
    CannotTakeOrder { volume: i32 },

    #[error("Courier does not hold order {0}")]
    NoSuchOrder(OrderId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("Order volume must be positive, got {0}")]
    InvalidVolume(i32),

    #[error("Order is already assigned to a courier")]
    AlreadyAssigned,

    #[error("Cannot assign order in status: {0:?}")]
    CannotAssign(OrderStatus),

    #[error("Cannot complete order in status: {0:?}")]
    CannotComplete(OrderStatus),
}

/// Umbrella error for domain services that touch several aggregates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Courier(#[from] CourierError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl From<StorageSlotError> for DomainError {
    fn from(err: StorageSlotError) -> Self {
        DomainError::Courier(CourierError::Slot(err))
    }
}
