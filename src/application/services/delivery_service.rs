//! Delivery Service - One assignment tick and one movement tick
//!
//! Each call opens its own repository session and runs inside a single unit
//! of work: either every change of the tick is persisted or none is.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::transaction::finish;
use crate::application::ports::outbound::{RepositorySession, SessionFactoryPort};
use crate::domain::services::{MoveResult, MovementStep, OrderDispatcher};
use crate::domain::value_objects::{CourierId, OrderId};

/// An order matched to a courier during an assignment tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignResult {
    pub order_id: OrderId,
    pub courier_id: CourierId,
}

#[async_trait]
pub trait DeliveryService: Send + Sync {
    /// Match the first created order with the quickest free courier
    async fn assign_next_order(&self) -> Result<Option<AssignResult>>;

    /// Advance every busy courier by one tick
    async fn move_couriers(&self) -> Result<Vec<MoveResult>>;
}

pub struct DeliveryServiceImpl {
    sessions: Arc<dyn SessionFactoryPort>,
    dispatcher: OrderDispatcher,
    movement: MovementStep,
}

impl DeliveryServiceImpl {
    pub fn new(sessions: Arc<dyn SessionFactoryPort>) -> Self {
        Self {
            sessions,
            dispatcher: OrderDispatcher::new(),
            movement: MovementStep::new(),
        }
    }

    async fn assign_in(&self, session: &RepositorySession) -> Result<Option<AssignResult>> {
        let Some(mut order) = session.orders.get_first_created().await? else {
            debug!("No created orders to assign");
            return Ok(None);
        };

        let mut couriers = session.couriers.get_all_free().await?;
        if couriers.is_empty() {
            debug!(order_id = %order.id(), "No free couriers");
            return Ok(None);
        }

        let Some(courier) = self.dispatcher.dispatch(&mut order, &mut couriers)? else {
            debug!(
                order_id = %order.id(),
                volume = order.volume(),
                "No courier can take the order"
            );
            return Ok(None);
        };
        let courier = courier.clone();

        session
            .orders
            .update(&order)
            .await
            .context("Failed to update assigned order")?;
        session
            .couriers
            .update(&courier)
            .await
            .context("Failed to update assigned courier")?;

        info!(
            order_id = %order.id(),
            courier_id = %courier.id(),
            "Assigned order to courier {}",
            courier.name()
        );
        Ok(Some(AssignResult {
            order_id: order.id(),
            courier_id: courier.id(),
        }))
    }

    async fn move_in(&self, session: &RepositorySession) -> Result<Vec<MoveResult>> {
        let mut orders = session.orders.get_all_assigned().await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let mut couriers = session.couriers.get_all_busy().await?;

        let results = self.movement.advance(&mut orders, &mut couriers)?;

        for result in &results {
            if let Some(courier) = couriers.iter().find(|c| c.id() == result.courier_id) {
                session
                    .couriers
                    .update(courier)
                    .await
                    .context("Failed to update moved courier")?;
            }
            if result.order_completed {
                if let Some(order) = orders.iter().find(|o| o.id() == result.order_id) {
                    session
                        .orders
                        .update(order)
                        .await
                        .context("Failed to update completed order")?;
                }
                info!(
                    order_id = %result.order_id,
                    courier_id = %result.courier_id,
                    "Order delivered at {}",
                    result.position
                );
            }
        }

        Ok(results)
    }
}

#[async_trait]
impl DeliveryService for DeliveryServiceImpl {
    #[instrument(skip(self))]
    async fn assign_next_order(&self) -> Result<Option<AssignResult>> {
        let session = self.sessions.open().await?;
        let opened = session.unit_of_work.begin().await?;
        let result = self.assign_in(&session).await;
        finish(session.unit_of_work.as_ref(), opened, result).await
    }

    #[instrument(skip(self))]
    async fn move_couriers(&self) -> Result<Vec<MoveResult>> {
        let session = self.sessions.open().await?;
        let opened = session.unit_of_work.begin().await?;
        let result = self.move_in(&session).await;
        finish(session.unit_of_work.as_ref(), opened, result).await
    }
}
