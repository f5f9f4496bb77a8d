//! Geocoding adapters

mod http_client;
mod random;

pub use http_client::HttpGeoClient;
pub use random::RandomGeoService;
