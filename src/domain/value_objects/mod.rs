//! Value objects - Immutable objects defined by their attributes

mod ids;
pub mod position;

pub use ids::*;
pub use position::{Axis, Position};
