//! Consumption aggregate

pub mod model;
pub mod repository;

pub use model::{Consumption, PhaseSlot, PhaseValues};
pub use repository::ConsumptionRepository;
