//! Courier Service - Application service for courier management

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::transaction::finish;
use crate::application::ports::outbound::SessionFactoryPort;
use crate::domain::entities::Courier;
use crate::domain::value_objects::{CourierId, Position};

/// Request to create a new courier at a random position
#[derive(Debug, Clone)]
pub struct CreateCourierRequest {
    pub name: String,
    pub speed: i32,
}

/// Request to add a storage slot to an existing courier
#[derive(Debug, Clone)]
pub struct AddStorageSlotRequest {
    pub courier_id: CourierId,
    pub name: String,
    pub capacity: i32,
}

/// Read model for courier listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourierSummary {
    pub id: CourierId,
    pub name: String,
    pub position: Position,
}

#[async_trait]
pub trait CourierService: Send + Sync {
    async fn create_courier(&self, request: CreateCourierRequest) -> Result<Courier>;

    async fn add_storage_slot(&self, request: AddStorageSlotRequest) -> Result<Courier>;

    async fn list_couriers(&self) -> Result<Vec<CourierSummary>>;
}

pub struct CourierServiceImpl {
    sessions: Arc<dyn SessionFactoryPort>,
}

impl CourierServiceImpl {
    pub fn new(sessions: Arc<dyn SessionFactoryPort>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl CourierService for CourierServiceImpl {
    #[instrument(skip(self), fields(name = %request.name))]
    async fn create_courier(&self, request: CreateCourierRequest) -> Result<Courier> {
        let courier = Courier::new(request.name, request.speed, Position::random())?;

        let session = self.sessions.open().await?;
        let opened = session.unit_of_work.begin().await?;
        let result = session
            .couriers
            .add(&courier)
            .await
            .context("Failed to add courier to repository");
        finish(session.unit_of_work.as_ref(), opened, result).await?;

        info!(
            courier_id = %courier.id(),
            position = %courier.position(),
            "Created courier: {}",
            courier.name()
        );
        Ok(courier)
    }

    #[instrument(skip(self), fields(courier_id = %request.courier_id))]
    async fn add_storage_slot(&self, request: AddStorageSlotRequest) -> Result<Courier> {
        let session = self.sessions.open().await?;
        let opened = session.unit_of_work.begin().await?;

        let result = async {
            let mut courier = session
                .couriers
                .get_by_id(request.courier_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Courier not found: {}", request.courier_id))?;

            courier.add_slot(&request.name, request.capacity)?;

            session
                .couriers
                .update(&courier)
                .await
                .context("Failed to update courier in repository")?;
            Ok::<_, anyhow::Error>(courier)
        }
        .await;
        let courier = finish(session.unit_of_work.as_ref(), opened, result).await?;

        info!(slots = courier.slots().len(), "Added storage slot '{}'", request.name);
        Ok(courier)
    }

    #[instrument(skip(self))]
    async fn list_couriers(&self) -> Result<Vec<CourierSummary>> {
        debug!("Listing all couriers");
        let session = self.sessions.open().await?;
        let couriers = session
            .couriers
            .get_all()
            .await
            .context("Failed to list couriers from repository")?;

        Ok(couriers
            .into_iter()
            .map(|courier| CourierSummary {
                id: courier.id(),
                name: courier.name().to_string(),
                position: courier.position(),
            })
            .collect())
    }
}
