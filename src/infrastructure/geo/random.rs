//! Offline geocoder that ignores the street and picks a random grid cell

use async_trait::async_trait;

use crate::application::ports::outbound::{GeoError, GeoServicePort};
use crate::domain::value_objects::Position;

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGeoService;

impl RandomGeoService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GeoServicePort for RandomGeoService {
    async fn resolve(&self, street: &str) -> Result<Position, GeoError> {
        let position = Position::random();
        tracing::debug!("Resolved '{}' to random position {}", street, position);
        Ok(position)
    }
}
