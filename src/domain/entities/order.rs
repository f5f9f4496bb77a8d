//! Order entity - A delivery request travelling through its lifecycle

use serde::{Deserialize, Serialize};

use crate::domain::errors::OrderError;
use crate::domain::value_objects::{CourierId, OrderId, Position};

/// Order lifecycle: Created -> Assigned -> Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Assigned,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CREATED" => Some(OrderStatus::Created),
            "ASSIGNED" => Some(OrderStatus::Assigned),
            "COMPLETED" => Some(OrderStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    destination: Position,
    volume: i32,
    courier_id: Option<CourierId>,
    status: OrderStatus,
}

impl Order {
    pub fn new(id: OrderId, destination: Position, volume: i32) -> Result<Self, OrderError> {
        if volume <= 0 {
            return Err(OrderError::InvalidVolume(volume));
        }

        Ok(Self {
            id,
            destination,
            volume,
            courier_id: None,
            status: OrderStatus::Created,
        })
    }

    /// Rebuild an order from storage without business-rule validation
    pub fn rehydrate(
        id: OrderId,
        destination: Position,
        volume: i32,
        courier_id: Option<CourierId>,
        status: OrderStatus,
    ) -> Self {
        Self {
            id,
            destination,
            volume,
            courier_id,
            status,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    pub fn courier_id(&self) -> Option<CourierId> {
        self.courier_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn assign(&mut self, courier_id: CourierId) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Created => {}
            OrderStatus::Assigned => return Err(OrderError::AlreadyAssigned),
            OrderStatus::Completed => return Err(OrderError::CannotAssign(self.status)),
        }

        self.courier_id = Some(courier_id);
        self.status = OrderStatus::Assigned;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Assigned {
            return Err(OrderError::CannotComplete(self.status));
        }

        self.status = OrderStatus::Completed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(volume: i32) -> Result<Order, OrderError> {
        Order::new(OrderId::new(), Position::new(3, 4).unwrap(), volume)
    }

    #[test]
    fn test_new_order_is_created_without_courier() {
        let order = order(5).unwrap();
        assert_eq!(order.status(), OrderStatus::Created);
        assert_eq!(order.courier_id(), None);
        assert_eq!(order.volume(), 5);
    }

    #[test]
    fn test_new_order_rejects_non_positive_volume() {
        assert_eq!(order(0), Err(OrderError::InvalidVolume(0)));
        assert_eq!(order(-1), Err(OrderError::InvalidVolume(-1)));
    }

    #[test]
    fn test_assign_then_complete() {
        let mut order = order(5).unwrap();
        let courier_id = CourierId::new();

        order.assign(courier_id).unwrap();
        assert_eq!(order.status(), OrderStatus::Assigned);
        assert_eq!(order.courier_id(), Some(courier_id));

        order.complete().unwrap();
        assert_eq!(order.status(), OrderStatus::Completed);
    }

    #[test]
    fn test_illegal_transitions_leave_state_unchanged() {
        let mut order = order(5).unwrap();
        assert_eq!(
            order.complete(),
            Err(OrderError::CannotComplete(OrderStatus::Created))
        );
        assert_eq!(order.status(), OrderStatus::Created);

        let first = CourierId::new();
        order.assign(first).unwrap();
        assert_eq!(order.assign(CourierId::new()), Err(OrderError::AlreadyAssigned));
        assert_eq!(order.courier_id(), Some(first));
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut order = order(5).unwrap();
        order.assign(CourierId::new()).unwrap();
        order.complete().unwrap();

        assert_eq!(
            order.assign(CourierId::new()),
            Err(OrderError::CannotAssign(OrderStatus::Completed))
        );
        assert_eq!(
            order.complete(),
            Err(OrderError::CannotComplete(OrderStatus::Completed))
        );
        assert_eq!(order.status(), OrderStatus::Completed);
    }

    #[test]
    fn test_status_string_mapping() {
        for status in [OrderStatus::Created, OrderStatus::Assigned, OrderStatus::Completed] {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("CANCELLED"), None);
        assert_eq!(
            serde_json::to_string(&OrderStatus::Assigned).unwrap(),
            "\"ASSIGNED\""
        );
    }
}
