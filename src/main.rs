//! Delivery Engine - Courier dispatch and movement simulation
//!
//! The engine:
//! - Keeps couriers and orders on a 10x10 grid
//! - Assigns created orders to the courier that reaches them soonest
//! - Moves busy couriers one step per tick and completes orders on arrival

mod application;
mod domain;
mod infrastructure;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::{
    AddStorageSlotRequest, CourierService, CreateCourierRequest, CreateOrderRequest,
    DeliveryService, OrderService,
};
use crate::domain::value_objects::OrderId;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::state::AppState;
use crate::infrastructure::tick_workers::{assignment_worker, movement_worker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delivery_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Delivery Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Assign interval: {:?}", config.assign_interval);
    tracing::info!("  Move interval: {:?}", config.move_interval);

    // Initialize application state
    let state = Arc::new(AppState::new(config).await?);
    tracing::info!("Application state initialized ({} store)", state.store.name());

    for seed in &state.config.seed_couriers {
        let mut courier = state
            .courier_service
            .create_courier(CreateCourierRequest {
                name: seed.name.clone(),
                speed: seed.speed,
            })
            .await
            .with_context(|| format!("Failed to seed courier '{}'", seed.name))?;

        for slot in &seed.slots {
            courier = state
                .courier_service
                .add_storage_slot(AddStorageSlotRequest {
                    courier_id: courier.id(),
                    name: slot.name.clone(),
                    capacity: slot.capacity,
                })
                .await
                .with_context(|| format!("Failed to add slot '{}' to '{}'", slot.name, seed.name))?;
        }

        tracing::info!(
            "Seeded courier {} at {} with {} slots",
            courier.name(),
            courier.position(),
            courier.slots().len()
        );
    }

    for seed in &state.config.seed_orders {
        let request = CreateOrderRequest {
            order_id: OrderId::new(),
            street: seed.street.clone(),
            volume: seed.volume,
        };
        match state.order_service.create_order(request).await {
            Ok(order) => tracing::info!("Seeded order {} to {}", order.id(), order.destination()),
            Err(e) => tracing::warn!("Skipping seed order for '{}': {:#}", seed.street, e),
        }
    }

    // Start the simulation loops
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let assignment = {
        let service: Arc<dyn DeliveryService> = state.delivery_service.clone();
        let interval = state.config.assign_interval;
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            assignment_worker(service, interval, shutdown).await;
        })
    };

    let movement = {
        let service: Arc<dyn DeliveryService> = state.delivery_service.clone();
        let interval = state.config.move_interval;
        let shutdown = shutdown_rx;
        tokio::spawn(async move {
            movement_worker(service, interval, shutdown).await;
        })
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    tracing::info!("Shutdown requested, waiting for in-flight ticks");

    let _ = shutdown_tx.send(true);
    let (assignment, movement) = tokio::join!(assignment, movement);
    assignment.context("Assignment worker panicked")?;
    movement.context("Movement worker panicked")?;

    match state.courier_service.list_couriers().await {
        Ok(couriers) => {
            for courier in couriers {
                tracing::info!("Courier {} finished at {}", courier.name, courier.position);
            }
        }
        Err(e) => tracing::warn!("Failed to list couriers: {:#}", e),
    }
    match state.order_service.list_active_orders().await {
        Ok(orders) => tracing::info!("{} orders still in flight", orders.len()),
        Err(e) => tracing::warn!("Failed to list active orders: {:#}", e),
    }

    tracing::info!("Delivery Engine stopped");
    Ok(())
}
