//! Order dispatcher - Greedy matching of one order to the quickest courier

use crate::domain::entities::{Courier, Order};
use crate::domain::errors::DomainError;

/// Picks the eligible courier with the fewest steps to the order's destination
///
/// Ties go to the courier that appears first in the candidate list, so callers
/// must pass candidates in a stable order (repositories return them by id).
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderDispatcher;

impl OrderDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Assign `order` to the best candidate and place it in one of its slots
    ///
    /// Returns `Ok(None)` when no candidate can hold the order; the order is
    /// left untouched in that case. On `Err` both arguments may be partially
    /// mutated and must be discarded by the caller's unit of work.
    pub fn dispatch<'a>(
        &self,
        order: &mut Order,
        couriers: &'a mut [Courier],
    ) -> Result<Option<&'a Courier>, DomainError> {
        let destination = order.destination();
        let mut best: Option<(usize, i32)> = None;

        for (idx, courier) in couriers.iter().enumerate() {
            if !courier.can_accept(order.volume())? {
                continue;
            }
            let steps = courier.steps_to(&destination);
            match best {
                Some((_, best_steps)) if best_steps <= steps => {}
                _ => best = Some((idx, steps)),
            }
        }

        let Some((idx, _)) = best else {
            return Ok(None);
        };

        let courier = &mut couriers[idx];
        order.assign(courier.id())?;
        courier.take_order(order.id(), order.volume())?;

        Ok(Some(courier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::courier::DEFAULT_SLOT_CAPACITY;
    use crate::domain::entities::OrderStatus;
    use crate::domain::value_objects::{OrderId, Position};

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y).unwrap()
    }

    fn order_at(x: i32, y: i32, volume: i32) -> Order {
        Order::new(OrderId::new(), pos(x, y), volume).unwrap()
    }

    #[test]
    fn test_dispatch_selects_closest_courier() {
        let mut order = order_at(5, 5, 5);
        let far = Courier::new("Far", 1, pos(1, 1)).unwrap();
        let close = Courier::new("Close", 1, pos(4, 4)).unwrap();
        let close_id = close.id();
        let mut couriers = vec![far, close];

        let winner = OrderDispatcher::new()
            .dispatch(&mut order, &mut couriers)
            .unwrap()
            .expect("a courier should be selected");

        assert_eq!(winner.id(), close_id);
        assert_eq!(order.status(), OrderStatus::Assigned);
        assert_eq!(order.courier_id(), Some(close_id));
        assert!(couriers[1].is_busy());
        assert!(couriers[0].is_free());
    }

    #[test]
    fn test_dispatch_considers_speed() {
        let mut order = order_at(10, 10, 3);
        // distance 10, 10 steps
        let slow = Courier::new("Slow", 1, pos(5, 5)).unwrap();
        // distance 18, 4 steps
        let fast = Courier::new("Fast", 5, pos(1, 1)).unwrap();
        let fast_id = fast.id();
        let mut couriers = vec![slow, fast];

        let winner = OrderDispatcher::new()
            .dispatch(&mut order, &mut couriers)
            .unwrap()
            .unwrap();

        assert_eq!(winner.id(), fast_id);
    }

    #[test]
    fn test_dispatch_tie_goes_to_first_candidate() {
        let mut order = order_at(5, 5, 2);
        let first = Courier::new("First", 2, pos(3, 3)).unwrap();
        let second = Courier::new("Second", 2, pos(7, 7)).unwrap();
        let first_id = first.id();
        let mut couriers = vec![first, second];

        let winner = OrderDispatcher::new()
            .dispatch(&mut order, &mut couriers)
            .unwrap()
            .unwrap();

        assert_eq!(winner.id(), first_id);
        assert_eq!(couriers[0].slots()[0].occupant(), Some(order.id()));
        assert!(couriers[1].is_free());
    }

    #[test]
    fn test_dispatch_without_capacity_returns_none() {
        let mut order = order_at(5, 5, DEFAULT_SLOT_CAPACITY + 1);
        let mut couriers = vec![
            Courier::new("A", 1, pos(1, 1)).unwrap(),
            Courier::new("B", 3, pos(9, 9)).unwrap(),
        ];

        let result = OrderDispatcher::new()
            .dispatch(&mut order, &mut couriers)
            .unwrap();

        assert!(result.is_none());
        assert_eq!(order.status(), OrderStatus::Created);
        assert_eq!(order.courier_id(), None);
        assert!(couriers.iter().all(Courier::is_free));
    }

    #[test]
    fn test_dispatch_with_no_candidates_returns_none() {
        let mut order = order_at(5, 5, 1);
        let result = OrderDispatcher::new().dispatch(&mut order, &mut []).unwrap();

        assert!(result.is_none());
        assert_eq!(order.status(), OrderStatus::Created);
    }

    #[test]
    fn test_dispatch_skips_ineligible_closer_courier() {
        let mut order = order_at(5, 5, 20);
        let close = Courier::new("Close", 1, pos(5, 4)).unwrap();
        let mut far = Courier::new("Far", 1, pos(1, 1)).unwrap();
        far.add_slot("Trunk", 25).unwrap();
        let far_id = far.id();
        let mut couriers = vec![close, far];

        let winner = OrderDispatcher::new()
            .dispatch(&mut order, &mut couriers)
            .unwrap()
            .unwrap();

        assert_eq!(winner.id(), far_id);
        assert_eq!(winner.slots()[1].occupant(), Some(order.id()));
    }

    #[test]
    fn test_dispatch_of_assigned_order_fails() {
        let mut order = order_at(5, 5, 1);
        let mut couriers = vec![Courier::new("A", 1, pos(1, 1)).unwrap()];
        OrderDispatcher::new()
            .dispatch(&mut order, &mut couriers)
            .unwrap();

        let mut others = vec![Courier::new("B", 1, pos(2, 2)).unwrap()];
        let err = OrderDispatcher::new()
            .dispatch(&mut order, &mut others)
            .unwrap_err();

        assert!(matches!(err, DomainError::Order(_)));
        assert!(others[0].is_free());
    }
}
