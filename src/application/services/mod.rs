//! Application services - Use case implementations
//!
//! Each service depends on outbound ports only and opens its own repository
//! session per call.

pub mod courier_service;
pub mod delivery_service;
pub mod order_service;
mod transaction;

pub use courier_service::{
    AddStorageSlotRequest, CourierService, CourierServiceImpl, CreateCourierRequest,
};
pub use delivery_service::{DeliveryService, DeliveryServiceImpl};
pub use order_service::{CreateOrderRequest, OrderService, OrderServiceImpl};
