//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Config: Application configuration
//! - Persistence: In-memory and SQLite stores behind the repository ports
//! - Geo: HTTP and random geocoders
//! - Tick workers: Periodic assignment and movement loops
//! - State: Shared application state

pub mod config;
pub mod geo;
pub mod persistence;
pub mod state;
pub mod tick_workers;
