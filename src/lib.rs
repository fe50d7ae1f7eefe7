pub mod api;
pub mod config;
pub mod models;
pub mod scrapers;
pub mod service;
pub mod store;

pub use config::{AppConfig, ScrapeConfig};
pub use models::*;
pub use service::{RefreshScope, ServiceError, UfcService};
pub use store::{DocStore, FighterFilter, StoreError};
