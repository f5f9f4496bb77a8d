//! Courier entity - A moving carrier of orders with one or more storage slots

use crate::domain::errors::CourierError;
use crate::domain::value_objects::{CourierId, OrderId, Position, StorageSlotId};

use super::storage_slot::StorageSlot;

pub const DEFAULT_SLOT_NAME: &str = "Bag";
pub const DEFAULT_SLOT_CAPACITY: i32 = 10;

/// A courier owns its storage slots
///
/// Free when every slot is empty, busy when at least one slot holds an order.
/// Built through [`Courier::new`] (validated) or [`Courier::rehydrate`]
/// (storage only); every mutation goes through a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Courier {
    id: CourierId,
    name: String,
    speed: i32,
    position: Position,
    slots: Vec<StorageSlot>,
}

impl Courier {
    pub fn new(
        name: impl Into<String>,
        speed: i32,
        position: Position,
    ) -> Result<Self, CourierError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CourierError::InvalidName);
        }
        if speed <= 0 {
            return Err(CourierError::InvalidSpeed(speed));
        }

        let default_slot = StorageSlot::new(DEFAULT_SLOT_NAME, DEFAULT_SLOT_CAPACITY)?;

        Ok(Self {
            id: CourierId::new(),
            name,
            speed,
            position,
            slots: vec![default_slot],
        })
    }

    /// Rebuild a courier from storage without business-rule validation
    pub fn rehydrate(
        id: CourierId,
        name: String,
        speed: i32,
        position: Position,
        slots: Vec<StorageSlot>,
    ) -> Self {
        Self {
            id,
            name,
            speed,
            position,
            slots,
        }
    }

    pub fn id(&self) -> CourierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn slots(&self) -> &[StorageSlot] {
        &self.slots
    }

    pub fn is_free(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_occupied())
    }

    pub fn is_busy(&self) -> bool {
        !self.is_free()
    }

    /// Append a slot; there is no upper bound on the slot count
    pub fn add_slot(
        &mut self,
        name: impl Into<String>,
        capacity: i32,
    ) -> Result<StorageSlotId, CourierError> {
        let slot = StorageSlot::new(name, capacity)?;
        let id = slot.id();
        self.slots.push(slot);
        Ok(id)
    }

    pub fn can_accept(&self, volume: i32) -> Result<bool, CourierError> {
        for slot in &self.slots {
            if slot.can_hold(volume)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Place the order into the first slot, in declaration order, that can hold it
    pub fn take_order(&mut self, order_id: OrderId, volume: i32) -> Result<(), CourierError> {
        for slot in &mut self.slots {
            if slot.can_hold(volume)? {
                slot.occupy(order_id, volume)?;
                return Ok(());
            }
        }
        Err(CourierError::CannotTakeOrder { volume })
    }

    /// Release the slot holding `order_id`
    pub fn complete_order(&mut self, order_id: OrderId) -> Result<(), CourierError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.occupant() == Some(order_id))
            .ok_or(CourierError::NoSuchOrder(order_id))?;
        slot.release();
        Ok(())
    }

    /// Ticks needed to reach `target`, rounded up; used for dispatch ranking
    pub fn steps_to(&self, target: &Position) -> i32 {
        let distance = self.position.distance_to(target);
        (distance + self.speed - 1) / self.speed
    }

    /// Advance at most `speed` Manhattan units toward `target`
    pub fn move_toward(&mut self, target: &Position) {
        self.position = self.position.step_toward(target, self.speed);
    }
}
