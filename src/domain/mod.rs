//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Value Objects: Position, strongly-typed identifiers
//! - Entities: Courier (with its storage slots) and Order
//! - Errors: Validation and state-conflict errors
//! - Domain Services: Order dispatch and courier movement

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;
