//! Application configuration

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// SQLite connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// An extra storage slot attached to a seeded courier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSeed {
    pub name: String,
    pub capacity: i32,
}

/// A courier created at startup, with slots added after the default one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourierSeed {
    pub name: String,
    pub speed: i32,
    pub slots: Vec<SlotSeed>,
}

/// An order created at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSeed {
    pub street: String,
    pub volume: i32,
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite store; `None` selects the in-memory store
    pub database: Option<DatabaseConfig>,

    /// Geocoder base URL; `None` selects random positions
    pub geo_service_url: Option<String>,
    pub geo_service_timeout: Duration,

    /// Pause between assignment ticks
    pub assign_interval: Duration,
    /// Pause between movement ticks
    pub move_interval: Duration,

    pub seed_couriers: Vec<CourierSeed>,
    pub seed_orders: Vec<OrderSeed>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database = match var("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: positive(var("DATABASE_MAX_CONNECTIONS"), 5)
                    .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            }),
            None => None,
        };

        Ok(Self {
            database,

            geo_service_url: var("GEO_SERVICE_URL").filter(|url| !url.trim().is_empty()),
            geo_service_timeout: millis(var("GEO_SERVICE_TIMEOUT_MS"), 2000)
                .context("GEO_SERVICE_TIMEOUT_MS must be a number of milliseconds")?,

            assign_interval: millis(var("ASSIGN_INTERVAL_MS"), 1000)
                .context("ASSIGN_INTERVAL_MS must be a number of milliseconds")?,
            move_interval: millis(var("MOVE_INTERVAL_MS"), 1000)
                .context("MOVE_INTERVAL_MS must be a number of milliseconds")?,

            seed_couriers: match var("SEED_COURIERS") {
                Some(raw) => parse_seed_couriers(&raw).context("Invalid SEED_COURIERS")?,
                None => Vec::new(),
            },
            seed_orders: match var("SEED_ORDERS") {
                Some(raw) => parse_seed_orders(&raw).context("Invalid SEED_ORDERS")?,
                None => Vec::new(),
            },
        })
    }
}

fn positive(value: Option<String>, default: u32) -> Result<u32> {
    let n = match value {
        Some(raw) => raw.trim().parse::<u32>()?,
        None => default,
    };
    if n == 0 {
        bail!("value must be greater than zero");
    }
    Ok(n)
}

fn millis(value: Option<String>, default: u64) -> Result<Duration> {
    let ms = match value {
        Some(raw) => raw.trim().parse::<u64>()?,
        None => default,
    };
    if ms == 0 {
        bail!("interval must be greater than zero");
    }
    Ok(Duration::from_millis(ms))
}

/// Parse a comma-separated `name:speed[:slot=capacity...]` list; blank
/// entries are skipped
///
/// `Ivan:2:Trunk=30:Box=5` seeds a courier with the default bag plus a
/// trunk and a box.
pub fn parse_seed_couriers(raw: &str) -> Result<Vec<CourierSeed>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<CourierSeed> {
            let mut parts = entry.split(':').map(str::trim);
            let name = parts.next().unwrap_or_default();
            let speed = parts
                .next()
                .with_context(|| format!("Expected name:speed, got '{}'", entry))?
                .parse::<i32>()
                .with_context(|| format!("Invalid speed in '{}'", entry))?;

            let slots = parts
                .map(|slot| -> Result<SlotSeed> {
                    let (slot_name, capacity) = slot
                        .split_once('=')
                        .with_context(|| format!("Expected slot=capacity, got '{}'", slot))?;
                    let capacity = capacity
                        .trim()
                        .parse::<i32>()
                        .with_context(|| format!("Invalid capacity in '{}'", slot))?;
                    Ok(SlotSeed {
                        name: slot_name.trim().to_string(),
                        capacity,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(CourierSeed {
                name: name.to_string(),
                speed,
                slots,
            })
        })
        .collect()
}

/// Parse a comma-separated `street:volume` list; blank entries are skipped
pub fn parse_seed_orders(raw: &str) -> Result<Vec<OrderSeed>> {
    Ok(parse_pairs(raw, "street:volume")?
        .into_iter()
        .map(|(street, volume)| OrderSeed { street, volume })
        .collect())
}

fn parse_pairs(raw: &str, shape: &str) -> Result<Vec<(String, i32)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<(String, i32)> {
            let (label, number) = entry
                .rsplit_once(':')
                .with_context(|| format!("Expected {}, got '{}'", shape, entry))?;
            let number = number
                .trim()
                .parse::<i32>()
                .with_context(|| format!("Invalid number in '{}'", entry))?;
            Ok((label.trim().to_string(), number))
        })
        .collect()
}
