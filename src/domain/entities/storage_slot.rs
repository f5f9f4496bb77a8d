//! Storage slot entity - A named capacity unit on a courier

use crate::domain::errors::StorageSlotError;
use crate::domain::value_objects::{OrderId, StorageSlotId};

/// A slot that can hold at most one order whose volume fits its capacity
///
/// The slot is occupied iff `occupant` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSlot {
    id: StorageSlotId,
    name: String,
    capacity: i32,
    occupant: Option<OrderId>,
}

impl StorageSlot {
    pub fn new(name: impl Into<String>, capacity: i32) -> Result<Self, StorageSlotError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StorageSlotError::InvalidName);
        }
        if capacity <= 0 {
            return Err(StorageSlotError::InvalidCapacity(capacity));
        }

        Ok(Self {
            id: StorageSlotId::new(),
            name,
            capacity,
            occupant: None,
        })
    }

    /// Rebuild a slot from storage without business-rule validation
    pub fn rehydrate(
        id: StorageSlotId,
        name: String,
        capacity: i32,
        occupant: Option<OrderId>,
    ) -> Self {
        Self {
            id,
            name,
            capacity,
            occupant,
        }
    }

    pub fn id(&self) -> StorageSlotId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    pub fn occupant(&self) -> Option<OrderId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn can_hold(&self, volume: i32) -> Result<bool, StorageSlotError> {
        if volume <= 0 {
            return Err(StorageSlotError::InvalidVolume(volume));
        }
        Ok(!self.is_occupied() && volume <= self.capacity)
    }

    pub fn occupy(&mut self, order_id: OrderId, volume: i32) -> Result<(), StorageSlotError> {
        if !self.can_hold(volume)? {
            return Err(StorageSlotError::CannotStore { volume });
        }
        self.occupant = Some(order_id);
        Ok(())
    }

    /// Clear the occupant; a no-op on an empty slot
    pub fn release(&mut self) {
        self.occupant = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_creation_validates_input() {
        assert_eq!(StorageSlot::new("  ", 5), Err(StorageSlotError::InvalidName));
        assert_eq!(
            StorageSlot::new("Bag", 0),
            Err(StorageSlotError::InvalidCapacity(0))
        );

        let slot = StorageSlot::new("Bag", 10).unwrap();
        assert_eq!(slot.name(), "Bag");
        assert_eq!(slot.capacity(), 10);
        assert!(!slot.is_occupied());
    }

    #[test]
    fn test_can_hold() {
        let slot = StorageSlot::new("Trunk", 10).unwrap();
        assert_eq!(slot.can_hold(10), Ok(true));
        assert_eq!(slot.can_hold(11), Ok(false));
        assert_eq!(slot.can_hold(0), Err(StorageSlotError::InvalidVolume(0)));
        assert_eq!(slot.can_hold(-4), Err(StorageSlotError::InvalidVolume(-4)));
    }

    #[test]
    fn test_occupy_and_release() {
        let mut slot = StorageSlot::new("Bag", 10).unwrap();
        let order_id = OrderId::new();

        slot.occupy(order_id, 7).unwrap();
        assert_eq!(slot.occupant(), Some(order_id));
        assert_eq!(slot.can_hold(1), Ok(false));

        // Occupied slots reject further orders
        assert_eq!(
            slot.occupy(OrderId::new(), 1),
            Err(StorageSlotError::CannotStore { volume: 1 })
        );

        slot.release();
        assert!(!slot.is_occupied());
        slot.release();
        assert!(!slot.is_occupied());
    }

    #[test]
    fn test_occupy_rejects_oversized_volume() {
        let mut slot = StorageSlot::new("Bag", 3).unwrap();
        assert_eq!(
            slot.occupy(OrderId::new(), 4),
            Err(StorageSlotError::CannotStore { volume: 4 })
        );
        assert!(!slot.is_occupied());
    }
}
