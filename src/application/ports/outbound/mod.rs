//! Outbound ports - Interfaces that the application requires from external systems

mod geo_port;
mod repository_port;
mod unit_of_work_port;

pub use geo_port::{GeoError, GeoServicePort};
pub use repository_port::{CourierRepositoryPort, OrderRepositoryPort};
pub use unit_of_work_port::{RepositorySession, SessionFactoryPort, UnitOfWorkPort};
