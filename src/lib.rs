//! # Texnouz Consumption Engine
//!
//! Turns the meter values of EV charging transactions into priced
//! consumption intervals and keeps the transaction's running totals.
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **domain**: Entities, repository traits and collaborator ports
//! - **application**: The consumption pipeline and the lifecycle services
//! - **infrastructure**: In-memory storage and static integration wiring
//! - **shared**: Errors, decimal helpers, timeouts and logging setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, EngineConfig};

pub use application::{ConsumptionEngine, RebuildService, StopTransactionRequest, TransactionService};
pub use domain::{DomainError, DomainResult, RepositoryProvider};
pub use infrastructure::{InMemoryStorage, StaticIntegrations};
pub use shared::logging::init_tracing;
