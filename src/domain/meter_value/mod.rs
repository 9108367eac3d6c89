//! Meter value aggregate

pub mod model;
pub mod repository;

pub use model::{
    Measurand, MeterValueAttribute, NormalizedMeterValue, Phase, ReadingContext, UnitOfMeasure,
    ValueFormat,
};
pub use repository::MeterValueRepository;
