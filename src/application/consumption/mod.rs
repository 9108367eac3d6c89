//! Consumption pipeline: classify → build → enrich → reconcile → fold

pub mod builder;
pub mod classifier;
pub mod context;
pub mod limitation;
pub mod reconciler;
pub mod tracker;

pub use builder::ConsumptionBuilder;
pub use classifier::{classify, Classified, Quantity};
pub use context::StationContext;
pub use limitation::LimitationEnricher;
pub use reconciler::reconcile;
pub use tracker::{fold, InactivityPolicy};
