//! SQLite store - Repository and unit of work adapters on a sqlx pool
//!
//! Couriers live in `couriers` with their slots in `storage_slots` (kept in
//! declaration order by `slot_index`); orders live in `orders`. Ids are stored
//! as hyphenated UUID text, so `ORDER BY id` matches identity order.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use crate::application::ports::outbound::{
    CourierRepositoryPort, OrderRepositoryPort, RepositorySession, SessionFactoryPort,
    UnitOfWorkPort,
};
use crate::domain::entities::{Courier, Order, OrderStatus, StorageSlot};
use crate::domain::value_objects::{CourierId, OrderId, Position};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS couriers (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        speed INTEGER NOT NULL,
        position_x INTEGER NOT NULL,
        position_y INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS storage_slots (
        id TEXT PRIMARY KEY,
        courier_id TEXT NOT NULL REFERENCES couriers(id) ON DELETE CASCADE,
        slot_index INTEGER NOT NULL,
        name TEXT NOT NULL,
        capacity INTEGER NOT NULL,
        order_id TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_storage_slots_courier_id ON storage_slots (courier_id)",
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id TEXT PRIMARY KEY,
        courier_id TEXT,
        position_x INTEGER NOT NULL,
        position_y INTEGER NOT NULL,
        volume INTEGER NOT NULL,
        status TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_orders_status ON orders (status)",
];

const ORDER_COLUMNS: &str = "id, courier_id, position_x, position_y, volume, status";

type OrderRow = (String, Option<String>, i32, i32, i32, String);
type CourierRow = (String, String, i32, i32, i32);
type SlotRow = (String, String, String, i32, Option<String>);

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Open (creating if missing) the database at `url`
    ///
    /// Every connection to an in-memory URL gets its own empty database, so
    /// such a pool is pinned to a single connection that never expires.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid SQLite URL: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if is_in_memory(url) {
            if max_connections != 1 {
                tracing::warn!(
                    "In-memory SQLite URL, using 1 connection instead of {}",
                    max_connections
                );
            }
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite")?;

        Self::new(pool)
            .await
            .context("Failed to initialize SQLite schema")
    }
}

#[async_trait]
impl SessionFactoryPort for SqliteStore {
    async fn open(&self) -> Result<RepositorySession> {
        let session = Arc::new(SqliteSession {
            pool: self.pool.clone(),
            tx: Mutex::new(None),
        });
        Ok(RepositorySession {
            orders: session.clone(),
            couriers: session.clone(),
            unit_of_work: session,
        })
    }
}

pub struct SqliteSession {
    pool: SqlitePool,
    tx: Mutex<Option<Transaction<'static, Sqlite>>>,
}

/// Connection a repository call runs on: the session transaction if one is
/// open, otherwise a short transaction committed by `finish`
enum Scope<'s> {
    Shared(MutexGuard<'s, Option<Transaction<'static, Sqlite>>>),
    Auto(Transaction<'static, Sqlite>),
}

impl Scope<'_> {
    fn conn(&mut self) -> Result<&mut SqliteConnection> {
        match self {
            Scope::Shared(guard) => guard.as_deref_mut().context("Transaction already closed"),
            Scope::Auto(tx) => Ok(&mut **tx),
        }
    }

    async fn finish(self) -> Result<()> {
        if let Scope::Auto(tx) = self {
            tx.commit().await?;
        }
        Ok(())
    }
}

impl SqliteSession {
    async fn scope(&self) -> Result<Scope<'_>> {
        let guard = self.tx.lock().await;
        if guard.is_some() {
            return Ok(Scope::Shared(guard));
        }
        drop(guard);
        Ok(Scope::Auto(self.pool.begin().await?))
    }

    async fn fetch_orders(&self, filter: &str, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let sql = format!("SELECT {} FROM orders {} ORDER BY id", ORDER_COLUMNS, filter);
        let mut scope = self.scope().await?;
        let mut query = sqlx::query_as::<_, OrderRow>(&sql);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }
        let rows = query.fetch_all(scope.conn()?).await?;
        scope.finish().await?;

        rows.into_iter().map(order_from_row).collect()
    }

    async fn fetch_couriers(&self, id: Option<CourierId>) -> Result<Vec<Courier>> {
        let mut scope = self.scope().await?;
        let conn = scope.conn()?;

        let (courier_rows, slot_rows) = match id {
            Some(id) => {
                let couriers = sqlx::query_as::<_, CourierRow>(
                    "SELECT id, name, speed, position_x, position_y FROM couriers WHERE id = ?",
                )
                .bind(id.to_string())
                .fetch_all(&mut *conn)
                .await?;
                let slots = sqlx::query_as::<_, SlotRow>(
                    "SELECT id, courier_id, name, capacity, order_id FROM storage_slots
                     WHERE courier_id = ? ORDER BY slot_index",
                )
                .bind(id.to_string())
                .fetch_all(&mut *conn)
                .await?;
                (couriers, slots)
            }
            None => {
                let couriers = sqlx::query_as::<_, CourierRow>(
                    "SELECT id, name, speed, position_x, position_y FROM couriers ORDER BY id",
                )
                .fetch_all(&mut *conn)
                .await?;
                let slots = sqlx::query_as::<_, SlotRow>(
                    "SELECT id, courier_id, name, capacity, order_id FROM storage_slots
                     ORDER BY courier_id, slot_index",
                )
                .fetch_all(&mut *conn)
                .await?;
                (couriers, slots)
            }
        };
        scope.finish().await?;

        let mut couriers = Vec::with_capacity(courier_rows.len());
        for row in courier_rows {
            let slots = slot_rows
                .iter()
                .filter(|slot| slot.1 == row.0)
                .map(slot_from_row)
                .collect::<Result<Vec<_>>>()?;
            couriers.push(courier_from_row(row, slots)?);
        }
        Ok(couriers)
    }

    async fn insert_slots(conn: &mut SqliteConnection, courier: &Courier) -> Result<()> {
        for (index, slot) in courier.slots().iter().enumerate() {
            sqlx::query(
                "INSERT INTO storage_slots (id, courier_id, slot_index, name, capacity, order_id)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(slot.id().to_string())
            .bind(courier.id().to_string())
            .bind(index as i64)
            .bind(slot.name())
            .bind(slot.capacity())
            .bind(slot.occupant().map(|id| id.to_string()))
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWorkPort for SqliteSession {
    async fn begin(&self) -> Result<bool> {
        let mut tx = self.tx.lock().await;
        if tx.is_some() {
            return Ok(false);
        }
        *tx = Some(self.pool.begin().await.context("Failed to begin transaction")?);
        Ok(true)
    }

    async fn commit(&self) -> Result<()> {
        let Some(tx) = self.tx.lock().await.take() else {
            bail!("No transaction to commit");
        };
        tx.commit().await.context("Failed to commit transaction")
    }

    async fn rollback(&self) -> Result<()> {
        if let Some(tx) = self.tx.lock().await.take() {
            tx.rollback().await.context("Failed to roll back transaction")?;
        }
        Ok(())
    }

    async fn in_transaction(&self) -> bool {
        self.tx.lock().await.is_some()
    }
}

#[async_trait]
impl OrderRepositoryPort for SqliteSession {
    async fn add(&self, order: &Order) -> Result<()> {
        let mut scope = self.scope().await?;
        sqlx::query(
            "INSERT INTO orders (id, courier_id, position_x, position_y, volume, status)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(order.id().to_string())
        .bind(order.courier_id().map(|id| id.to_string()))
        .bind(order.destination().x())
        .bind(order.destination().y())
        .bind(order.volume())
        .bind(order.status().as_str())
        .execute(scope.conn()?)
        .await
        .with_context(|| format!("Failed to insert order {}", order.id()))?;
        scope.finish().await?;

        tracing::debug!("Inserted order: {}", order.id());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<()> {
        let mut scope = self.scope().await?;
        let result = sqlx::query(
            "UPDATE orders
             SET courier_id = ?, position_x = ?, position_y = ?, volume = ?, status = ?
             WHERE id = ?",
        )
        .bind(order.courier_id().map(|id| id.to_string()))
        .bind(order.destination().x())
        .bind(order.destination().y())
        .bind(order.volume())
        .bind(order.status().as_str())
        .bind(order.id().to_string())
        .execute(scope.conn()?)
        .await?;

        if result.rows_affected() == 0 {
            bail!("Order not found: {}", order.id());
        }
        scope.finish().await
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS);
        let mut scope = self.scope().await?;
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(scope.conn()?)
            .await?;
        scope.finish().await?;

        row.map(order_from_row).transpose()
    }

    async fn get_first_created(&self) -> Result<Option<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE status = ? ORDER BY id LIMIT 1",
            ORDER_COLUMNS
        );
        let mut scope = self.scope().await?;
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(OrderStatus::Created.as_str())
            .fetch_optional(scope.conn()?)
            .await?;
        scope.finish().await?;

        row.map(order_from_row).transpose()
    }

    async fn get_all_assigned(&self) -> Result<Vec<Order>> {
        self.fetch_orders("WHERE status = ?", Some(OrderStatus::Assigned))
            .await
    }

    async fn get_all_not_completed(&self) -> Result<Vec<Order>> {
        self.fetch_orders("WHERE status <> ?", Some(OrderStatus::Completed))
            .await
    }
}

#[async_trait]
impl CourierRepositoryPort for SqliteSession {
    async fn add(&self, courier: &Courier) -> Result<()> {
        let mut scope = self.scope().await?;
        let conn = scope.conn()?;
        sqlx::query(
            "INSERT INTO couriers (id, name, speed, position_x, position_y) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(courier.id().to_string())
        .bind(courier.name())
        .bind(courier.speed())
        .bind(courier.position().x())
        .bind(courier.position().y())
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to insert courier {}", courier.id()))?;
        Self::insert_slots(conn, courier).await?;
        scope.finish().await?;

        tracing::debug!("Inserted courier: {}", courier.name());
        Ok(())
    }

    async fn update(&self, courier: &Courier) -> Result<()> {
        let mut scope = self.scope().await?;
        let conn = scope.conn()?;
        let result = sqlx::query(
            "UPDATE couriers SET name = ?, speed = ?, position_x = ?, position_y = ? WHERE id = ?",
        )
        .bind(courier.name())
        .bind(courier.speed())
        .bind(courier.position().x())
        .bind(courier.position().y())
        .bind(courier.id().to_string())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            bail!("Courier not found: {}", courier.id());
        }

        sqlx::query("DELETE FROM storage_slots WHERE courier_id = ?")
            .bind(courier.id().to_string())
            .execute(&mut *conn)
            .await?;
        Self::insert_slots(conn, courier).await?;
        scope.finish().await
    }

    async fn get_by_id(&self, id: CourierId) -> Result<Option<Courier>> {
        Ok(self.fetch_couriers(Some(id)).await?.into_iter().next())
    }

    async fn get_all(&self) -> Result<Vec<Courier>> {
        self.fetch_couriers(None).await
    }

    async fn get_all_free(&self) -> Result<Vec<Courier>> {
        let couriers = self.fetch_couriers(None).await?;
        Ok(couriers.into_iter().filter(Courier::is_free).collect())
    }

    async fn get_all_busy(&self) -> Result<Vec<Courier>> {
        let couriers = self.fetch_couriers(None).await?;
        Ok(couriers.into_iter().filter(Courier::is_busy).collect())
    }
}

// =============================================================================
// Row mapping
// =============================================================================

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn parse_id<T>(value: &str) -> Result<T>
where
    T: FromStr<Err = uuid::Error>,
{
    value
        .parse()
        .with_context(|| format!("Invalid id in database: {}", value))
}

fn order_from_row(row: OrderRow) -> Result<Order> {
    let (id, courier_id, x, y, volume, status) = row;
    let status = OrderStatus::parse(&status)
        .with_context(|| format!("Unknown order status in database: {}", status))?;

    Ok(Order::rehydrate(
        parse_id(&id)?,
        Position::new(x, y)?,
        volume,
        courier_id.as_deref().map(parse_id).transpose()?,
        status,
    ))
}

fn slot_from_row(row: &SlotRow) -> Result<StorageSlot> {
    let (id, _courier_id, name, capacity, order_id) = row;
    Ok(StorageSlot::rehydrate(
        parse_id(id)?,
        name.clone(),
        *capacity,
        order_id.as_deref().map(parse_id).transpose()?,
    ))
}

fn courier_from_row(row: CourierRow, slots: Vec<StorageSlot>) -> Result<Courier> {
    let (id, name, speed, x, y) = row;
    Ok(Courier::rehydrate(
        parse_id(&id)?,
        name,
        speed,
        Position::new(x, y)?,
        slots,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        // A single long-lived connection keeps the in-memory database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteStore::new(pool).await.unwrap()
    }

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y).unwrap()
    }

    #[tokio::test]
    async fn test_courier_round_trip_keeps_slot_order() {
        let store = store().await;
        let session = store.open().await.unwrap();

        let mut courier = Courier::new("Ivan", 3, pos(2, 9)).unwrap();
        courier.add_slot("Trunk", 40).unwrap();
        courier.add_slot("Box", 5).unwrap();
        let order_id = OrderId::new();
        courier.take_order(order_id, 30).unwrap();

        session.couriers.add(&courier).await.unwrap();
        let loaded = session.couriers.get_by_id(courier.id()).await.unwrap();

        assert_eq!(loaded, Some(courier));
    }

    #[tokio::test]
    async fn test_order_update_and_status_queries() {
        let store = store().await;
        let session = store.open().await.unwrap();
        let courier = Courier::new("Ivan", 1, pos(1, 1)).unwrap();

        let mut assigned = Order::new(OrderId::new(), pos(4, 4), 2).unwrap();
        let created = Order::new(OrderId::new(), pos(5, 5), 2).unwrap();
        session.orders.add(&assigned).await.unwrap();
        session.orders.add(&created).await.unwrap();

        assigned.assign(courier.id()).unwrap();
        session.orders.update(&assigned).await.unwrap();

        assert_eq!(
            session.orders.get_all_assigned().await.unwrap(),
            vec![assigned.clone()]
        );
        assert_eq!(
            session.orders.get_first_created().await.unwrap(),
            Some(created)
        );
        assert_eq!(session.orders.get_all_not_completed().await.unwrap().len(), 2);

        assigned.complete().unwrap();
        session.orders.update(&assigned).await.unwrap();
        assert_eq!(session.orders.get_all_not_completed().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_of_missing_rows_fails() {
        let store = store().await;
        let session = store.open().await.unwrap();

        let order = Order::new(OrderId::new(), pos(4, 4), 2).unwrap();
        assert!(session.orders.update(&order).await.is_err());

        let courier = Courier::new("Ivan", 1, pos(1, 1)).unwrap();
        assert!(session.couriers.update(&courier).await.is_err());
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let store = store().await;
        let session = store.open().await.unwrap();
        let courier = Courier::new("Ivan", 1, pos(1, 1)).unwrap();

        assert!(session.unit_of_work.begin().await.unwrap());
        assert!(!session.unit_of_work.begin().await.unwrap());
        session.couriers.add(&courier).await.unwrap();
        assert_eq!(session.couriers.get_all().await.unwrap().len(), 1);
        session.unit_of_work.rollback().await.unwrap();

        assert!(session.couriers.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_url_shares_one_database_across_sessions() {
        let store = SqliteStore::connect("sqlite::memory:", 5).await.unwrap();
        let courier = Courier::new("Ivan", 1, pos(1, 1)).unwrap();

        let writer = store.open().await.unwrap();
        writer.unit_of_work.begin().await.unwrap();
        writer.couriers.add(&courier).await.unwrap();
        writer.unit_of_work.commit().await.unwrap();

        for _ in 0..5 {
            let reader = store.open().await.unwrap();
            assert_eq!(reader.couriers.get_all().await.unwrap(), vec![courier.clone()]);
        }
    }

    #[test]
    fn test_in_memory_url_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:shared?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://delivery.db"));
    }

    #[tokio::test]
    async fn test_free_and_busy_couriers() {
        let store = store().await;
        let session = store.open().await.unwrap();

        let free = Courier::new("Free", 1, pos(1, 1)).unwrap();
        let mut busy = Courier::new("Busy", 1, pos(2, 2)).unwrap();
        busy.take_order(OrderId::new(), 1).unwrap();

        session.unit_of_work.begin().await.unwrap();
        session.couriers.add(&free).await.unwrap();
        session.couriers.add(&busy).await.unwrap();
        session.unit_of_work.commit().await.unwrap();

        let other = store.open().await.unwrap();
        assert_eq!(other.couriers.get_all_free().await.unwrap(), vec![free]);
        assert_eq!(other.couriers.get_all_busy().await.unwrap(), vec![busy]);
    }
}
