//! In-memory store - Repository and unit of work adapters backed by shared maps
//!
//! A session works directly against the shared state until `begin` is called.
//! Inside a transaction it reads and writes a private snapshot; on commit the
//! entities it touched are copied back, so concurrent sessions follow a
//! last-commit-wins rule per entity.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::application::ports::outbound::{
    CourierRepositoryPort, OrderRepositoryPort, RepositorySession, SessionFactoryPort,
    UnitOfWorkPort,
};
use crate::domain::entities::{Courier, Order, OrderStatus};
use crate::domain::value_objects::{CourierId, OrderId};

#[derive(Debug, Default, Clone)]
struct StoreState {
    orders: BTreeMap<OrderId, Order>,
    couriers: BTreeMap<CourierId, Courier>,
}

/// Shared in-memory state; every `open` hands out an independent session
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionFactoryPort for InMemoryStore {
    async fn open(&self) -> Result<RepositorySession> {
        let session = Arc::new(InMemorySession {
            shared: self.state.clone(),
            tx: Mutex::new(None),
        });
        Ok(RepositorySession {
            orders: session.clone(),
            couriers: session.clone(),
            unit_of_work: session,
        })
    }
}

struct Transaction {
    working: StoreState,
    dirty_orders: BTreeSet<OrderId>,
    dirty_couriers: BTreeSet<CourierId>,
}

enum Touched {
    Order(OrderId),
    Courier(CourierId),
}

pub struct InMemorySession {
    shared: Arc<RwLock<StoreState>>,
    tx: Mutex<Option<Transaction>>,
}

impl InMemorySession {
    async fn read<T>(&self, f: impl FnOnce(&StoreState) -> T + Send) -> T {
        let tx = self.tx.lock().await;
        match tx.as_ref() {
            Some(tx) => f(&tx.working),
            None => f(&*self.shared.read().await),
        }
    }

    async fn write(
        &self,
        touched: Touched,
        f: impl FnOnce(&mut StoreState) -> Result<()> + Send,
    ) -> Result<()> {
        let mut tx = self.tx.lock().await;
        match tx.as_mut() {
            Some(tx) => {
                f(&mut tx.working)?;
                match touched {
                    Touched::Order(id) => tx.dirty_orders.insert(id),
                    Touched::Courier(id) => tx.dirty_couriers.insert(id),
                };
                Ok(())
            }
            None => f(&mut *self.shared.write().await),
        }
    }
}

#[async_trait]
impl UnitOfWorkPort for InMemorySession {
    async fn begin(&self) -> Result<bool> {
        let mut tx = self.tx.lock().await;
        if tx.is_some() {
            return Ok(false);
        }
        let working = self.shared.read().await.clone();
        *tx = Some(Transaction {
            working,
            dirty_orders: BTreeSet::new(),
            dirty_couriers: BTreeSet::new(),
        });
        Ok(true)
    }

    async fn commit(&self) -> Result<()> {
        let Some(tx) = self.tx.lock().await.take() else {
            bail!("No transaction to commit");
        };

        let mut shared = self.shared.write().await;
        for id in &tx.dirty_orders {
            if let Some(order) = tx.working.orders.get(id) {
                shared.orders.insert(*id, order.clone());
            }
        }
        for id in &tx.dirty_couriers {
            if let Some(courier) = tx.working.couriers.get(id) {
                shared.couriers.insert(*id, courier.clone());
            }
        }

        tracing::debug!(
            orders = tx.dirty_orders.len(),
            couriers = tx.dirty_couriers.len(),
            "Committed in-memory transaction"
        );
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        self.tx.lock().await.take();
        Ok(())
    }

    async fn in_transaction(&self) -> bool {
        self.tx.lock().await.is_some()
    }
}

#[async_trait]
impl OrderRepositoryPort for InMemorySession {
    async fn add(&self, order: &Order) -> Result<()> {
        let order = order.clone();
        self.write(Touched::Order(order.id()), move |state| {
            if state.orders.contains_key(&order.id()) {
                bail!("Order already exists: {}", order.id());
            }
            state.orders.insert(order.id(), order);
            Ok(())
        })
        .await
    }

    async fn update(&self, order: &Order) -> Result<()> {
        let order = order.clone();
        self.write(Touched::Order(order.id()), move |state| {
            match state.orders.get_mut(&order.id()) {
                Some(stored) => *stored = order,
                None => bail!("Order not found: {}", order.id()),
            }
            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.read(|state| state.orders.get(&id).cloned()).await)
    }

    async fn get_first_created(&self) -> Result<Option<Order>> {
        Ok(self
            .read(|state| {
                state
                    .orders
                    .values()
                    .find(|o| o.status() == OrderStatus::Created)
                    .cloned()
            })
            .await)
    }

    async fn get_all_assigned(&self) -> Result<Vec<Order>> {
        Ok(self
            .read(|state| {
                state
                    .orders
                    .values()
                    .filter(|o| o.status() == OrderStatus::Assigned)
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn get_all_not_completed(&self) -> Result<Vec<Order>> {
        Ok(self
            .read(|state| {
                state
                    .orders
                    .values()
                    .filter(|o| o.status() != OrderStatus::Completed)
                    .cloned()
                    .collect()
            })
            .await)
    }
}

#[async_trait]
impl CourierRepositoryPort for InMemorySession {
    async fn add(&self, courier: &Courier) -> Result<()> {
        let courier = courier.clone();
        self.write(Touched::Courier(courier.id()), move |state| {
            if state.couriers.contains_key(&courier.id()) {
                bail!("Courier already exists: {}", courier.id());
            }
            state.couriers.insert(courier.id(), courier);
            Ok(())
        })
        .await
    }

    async fn update(&self, courier: &Courier) -> Result<()> {
        let courier = courier.clone();
        self.write(Touched::Courier(courier.id()), move |state| {
            match state.couriers.get_mut(&courier.id()) {
                Some(stored) => *stored = courier,
                None => bail!("Courier not found: {}", courier.id()),
            }
            Ok(())
        })
        .await
    }

    async fn get_by_id(&self, id: CourierId) -> Result<Option<Courier>> {
        Ok(self.read(|state| state.couriers.get(&id).cloned()).await)
    }

    async fn get_all(&self) -> Result<Vec<Courier>> {
        Ok(self
            .read(|state| state.couriers.values().cloned().collect())
            .await)
    }

    async fn get_all_free(&self) -> Result<Vec<Courier>> {
        Ok(self
            .read(|state| {
                state
                    .couriers
                    .values()
                    .filter(|c| c.is_free())
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn get_all_busy(&self) -> Result<Vec<Courier>> {
        Ok(self
            .read(|state| {
                state
                    .couriers
                    .values()
                    .filter(|c| c.is_busy())
                    .cloned()
                    .collect()
            })
            .await)
    }
}
