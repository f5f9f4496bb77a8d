//! Domain entities - Core business objects with identity

pub mod courier;
mod order;
mod storage_slot;

pub use courier::Courier;
pub use order::{Order, OrderStatus};
pub use storage_slot::StorageSlot;
