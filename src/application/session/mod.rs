pub mod locks;

pub use locks::{SharedStationLocks, StationLocks};
