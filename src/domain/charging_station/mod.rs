//! Charging station aggregate

pub mod model;
pub mod repository;

pub use model::{
    ChargingStation, Connector, ConnectorLimit, ConnectorLimitSource, CurrentType,
    RemoteAuthorization,
};
pub use repository::ChargingStationRepository;
