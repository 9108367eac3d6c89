//! Transaction aggregate
//!
//! Contains the Transaction entity, its stop record, and repository interface.

pub mod model;
pub mod repository;

pub use model::{
    BillingData, BillingDataStop, InactivityStatus, LastConsumption, Transaction,
    TransactionAction, TransactionStop,
};
pub use repository::TransactionRepository;
