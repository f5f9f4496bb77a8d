//! HTTP client for the external geocoding service

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::outbound::{GeoError, GeoServicePort};
use crate::domain::value_objects::Position;

const LOCATION_PATH: &str = "/api/v1/location";

/// Raw coordinates as returned by the service, validated before use
#[derive(Debug, Deserialize)]
struct LocationResponse {
    x: i32,
    y: i32,
}

/// Client for `GET {base_url}/api/v1/location?street=...`
pub struct HttpGeoClient {
    client: Client,
    base_url: String,
}

impl HttpGeoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build geo HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GeoServicePort for HttpGeoClient {
    async fn resolve(&self, street: &str) -> Result<Position, GeoError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, LOCATION_PATH))
            .query(&[("street", street)])
            .send()
            .await
            .map_err(|e| GeoError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeoError::Unavailable(format!("{}: {}", status, body)));
        }

        let location: LocationResponse = response
            .json()
            .await
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;

        let position = Position::new(location.x, location.y)?;
        tracing::debug!("Geocoded '{}' to {}", street, position);
        Ok(position)
    }
}
