//! Application layer - Use cases orchestrating the domain through ports
//!
//! This layer contains:
//! - Ports: Outbound interfaces for persistence and geocoding
//! - Services: Use case implementations (couriers, orders and delivery ticks)

pub mod ports;
pub mod services;
