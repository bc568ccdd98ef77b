//! # Car Rental Service
//!
//! Vehicle listings, bookings with date-conflict protection, and reviews
//! with per-vehicle rating aggregation.
//!
//! ## Architecture
//!
//! - **domain**: entities, value types, access policy, repository traits
//! - **application**: booking engine, review aggregator, vehicle ledger
//! - **infrastructure**: SeaORM persistence, in-memory store, token checks
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: errors, retry, graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, InMemoryStore, SeaOrmRepositoryProvider};

pub use interfaces::http::create_api_router;
