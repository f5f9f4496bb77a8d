//! Domain services - Stateless operations spanning several aggregates

mod movement;
mod order_dispatcher;

pub use movement::{MoveResult, MovementStep};
pub use order_dispatcher::OrderDispatcher;
