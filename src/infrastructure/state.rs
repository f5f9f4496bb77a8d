//! Shared application state

use std::sync::Arc;

use anyhow::Result;

use crate::application::ports::outbound::{GeoServicePort, SessionFactoryPort};
use crate::application::services::{CourierServiceImpl, DeliveryServiceImpl, OrderServiceImpl};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::geo::{HttpGeoClient, RandomGeoService};
use crate::infrastructure::persistence::StoreBackend;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub store: StoreBackend,
    // Application services
    pub courier_service: Arc<CourierServiceImpl>,
    pub order_service: Arc<OrderServiceImpl>,
    pub delivery_service: Arc<DeliveryServiceImpl>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let store = StoreBackend::from_config(config.database.as_ref()).await?;
        let sessions: Arc<dyn SessionFactoryPort> = Arc::new(store.clone());

        let geo: Arc<dyn GeoServicePort> = match &config.geo_service_url {
            Some(url) => {
                tracing::info!("Using geo service at {}", url);
                Arc::new(HttpGeoClient::new(url, config.geo_service_timeout)?)
            }
            None => {
                tracing::info!("GEO_SERVICE_URL not set, orders get random positions");
                Arc::new(RandomGeoService::new())
            }
        };

        let courier_service = Arc::new(CourierServiceImpl::new(sessions.clone()));
        let order_service = Arc::new(OrderServiceImpl::new(sessions.clone(), geo));
        let delivery_service = Arc::new(DeliveryServiceImpl::new(sessions));

        Ok(Self {
            config,
            store,
            courier_service,
            order_service,
            delivery_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{CourierService, CreateCourierRequest, DeliveryService};
    use std::time::Duration;

    fn config() -> AppConfig {
        AppConfig {
            database: None,
            geo_service_url: None,
            geo_service_timeout: Duration::from_secs(1),
            assign_interval: Duration::from_millis(10),
            move_interval: Duration::from_millis(10),
            seed_couriers: Vec::new(),
            seed_orders: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_services_share_one_store() {
        let state = AppState::new(config()).await.unwrap();
        assert_eq!(state.store.name(), "memory");

        state
            .courier_service
            .create_courier(CreateCourierRequest {
                name: "Ivan".to_string(),
                speed: 2,
            })
            .await
            .unwrap();

        assert_eq!(state.courier_service.list_couriers().await.unwrap().len(), 1);
        assert!(state.delivery_service.assign_next_order().await.unwrap().is_none());
    }
}
