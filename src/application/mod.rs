//! Application layer - the consumption engine
//!
//! Pipeline stages live in `consumption`, `pricing` and `roaming`;
//! `services` sequences them per lifecycle event.

pub mod consumption;
pub mod engine;
pub mod pricing;
pub mod roaming;
pub mod services;
pub mod session;

// Re-export key types for convenience
pub use consumption::{
    classify, fold, reconcile, ConsumptionBuilder, InactivityPolicy, LimitationEnricher,
    StationContext,
};
pub use engine::ConsumptionEngine;
pub use pricing::PricingOrchestrator;
pub use roaming::RoamingRelay;
pub use services::{
    build_extra_inactivity, capture_signed_data, stop_meter_values, Pipeline, RebuildService,
    StopTransactionRequest, TransactionService,
};
pub use session::{SharedStationLocks, StationLocks};
