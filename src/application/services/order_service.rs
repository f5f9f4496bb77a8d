//! Order Service - Application service for order intake and listing

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::transaction::finish;
use crate::application::ports::outbound::{GeoServicePort, SessionFactoryPort};
use crate::domain::entities::Order;
use crate::domain::value_objects::{OrderId, Position};

/// Request to create an order delivered to a street
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub order_id: OrderId,
    pub street: String,
    pub volume: i32,
}

/// Read model for active order listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub id: OrderId,
    pub destination: Position,
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Create an order; a redelivered id returns the stored order unchanged
    async fn create_order(&self, request: CreateOrderRequest) -> Result<Order>;

    /// Orders that are not completed yet
    async fn list_active_orders(&self) -> Result<Vec<OrderSummary>>;
}

pub struct OrderServiceImpl {
    sessions: Arc<dyn SessionFactoryPort>,
    geo: Arc<dyn GeoServicePort>,
}

impl OrderServiceImpl {
    pub fn new(sessions: Arc<dyn SessionFactoryPort>, geo: Arc<dyn GeoServicePort>) -> Self {
        Self { sessions, geo }
    }
}

#[async_trait]
impl OrderService for OrderServiceImpl {
    #[instrument(skip(self), fields(order_id = %request.order_id, street = %request.street))]
    async fn create_order(&self, request: CreateOrderRequest) -> Result<Order> {
        // Resolve before touching storage so a geocoding failure leaves no trace
        let destination = self
            .geo
            .resolve(&request.street)
            .await
            .with_context(|| format!("Failed to resolve street '{}'", request.street))?;

        let order = Order::new(request.order_id, destination, request.volume)?;

        let session = self.sessions.open().await?;
        let opened = session.unit_of_work.begin().await?;
        let result = async {
            if let Some(existing) = session.orders.get_by_id(order.id()).await? {
                warn!("Order already exists, ignoring duplicate");
                return Ok::<_, anyhow::Error>(existing);
            }
            session
                .orders
                .add(&order)
                .await
                .context("Failed to add order to repository")?;
            info!(destination = %order.destination(), volume = order.volume(), "Created order");
            Ok(order)
        }
        .await;

        finish(session.unit_of_work.as_ref(), opened, result).await
    }

    #[instrument(skip(self))]
    async fn list_active_orders(&self) -> Result<Vec<OrderSummary>> {
        debug!("Listing active orders");
        let session = self.sessions.open().await?;
        let orders = session
            .orders
            .get_all_not_completed()
            .await
            .context("Failed to list orders from repository")?;

        Ok(orders
            .into_iter()
            .map(|order| OrderSummary {
                id: order.id(),
                destination: order.destination(),
            })
            .collect())
    }
}
