//! Site area domain entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why a site-area limit has its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteAreaLimitSource {
    /// Maximum power configured on the site area
    SiteArea,
    /// Sum of the rated power of the site area's connectors
    ChargingStations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteArea {
    pub id: String,
    pub name: String,
    pub site_id: Option<String>,
    /// Maximum power (W), computed and cached when not configured
    pub maximum_power: Option<Decimal>,
    /// Supply voltage (V)
    pub voltage: Decimal,
    pub smart_charging: bool,
}

impl SiteArea {
    pub fn new(id: impl Into<String>, name: impl Into<String>, voltage: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            site_id: None,
            maximum_power: None,
            voltage,
            smart_charging: false,
        }
    }

    pub fn configured_maximum_power(&self) -> Option<Decimal> {
        self.maximum_power.filter(|p| *p > Decimal::ZERO)
    }
}
