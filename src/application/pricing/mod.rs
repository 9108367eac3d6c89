//! Pricing and billing side effects of the transaction lifecycle

pub mod orchestrator;

pub use orchestrator::PricingOrchestrator;
