//! Roaming (OCPI / OICP) mirroring of the transaction lifecycle

pub mod relay;

pub use relay::RoamingRelay;
