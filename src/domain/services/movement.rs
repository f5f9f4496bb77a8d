//! Movement step - Advances busy couriers one tick and completes arrivals

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::entities::{Courier, Order, OrderStatus};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{CourierId, OrderId, Position};

/// Outcome of moving one courier, used for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveResult {
    pub courier_id: CourierId,
    pub courier_name: String,
    pub position: Position,
    pub order_id: OrderId,
    pub order_completed: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MovementStep;

impl MovementStep {
    pub fn new() -> Self {
        Self
    }

    /// Move every busy courier toward the destination of its assigned order
    ///
    /// Couriers without an assigned order and orders without a busy courier
    /// are skipped. A courier that lands on the destination completes the
    /// order and frees its slot in the same tick.
    pub fn advance(
        &self,
        orders: &mut [Order],
        couriers: &mut [Courier],
    ) -> Result<Vec<MoveResult>, DomainError> {
        let mut order_by_courier: HashMap<CourierId, usize> = HashMap::new();
        for (idx, order) in orders.iter().enumerate() {
            if order.status() != OrderStatus::Assigned {
                continue;
            }
            if let Some(courier_id) = order.courier_id() {
                order_by_courier.entry(courier_id).or_insert(idx);
            }
        }

        let mut results = Vec::new();
        for courier in couriers.iter_mut() {
            if !courier.is_busy() {
                continue;
            }
            let Some(&idx) = order_by_courier.get(&courier.id()) else {
                continue;
            };
            let order = &mut orders[idx];

            courier.move_toward(&order.destination());

            let order_completed = courier.position() == order.destination();
            if order_completed {
                order.complete()?;
                courier.complete_order(order.id())?;
            }

            results.push(MoveResult {
                courier_id: courier.id(),
                courier_name: courier.name().to_string(),
                position: courier.position(),
                order_id: order.id(),
                order_completed,
            });
        }

        Ok(results)
    }
}
