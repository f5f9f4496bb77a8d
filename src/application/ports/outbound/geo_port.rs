//! Geocoding port - Resolves a street name to a grid position

use async_trait::async_trait;

use crate::domain::errors::PositionError;
use crate::domain::value_objects::Position;

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Geo service unavailable: {0}")]
    Unavailable(String),

    #[error("Geo service returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Geo service returned a position outside the grid: {0}")]
    OutOfGrid(#[from] PositionError),
}

#[async_trait]
pub trait GeoServicePort: Send + Sync {
    async fn resolve(&self, street: &str) -> Result<Position, GeoError>;
}
