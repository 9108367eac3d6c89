//! Charging station domain entity
//!
//! Only the electrical characteristics the consumption engine needs:
//! current type, rated voltage, connected phases, static limits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::decimal::safe_div;

/// Phases assumed when a connector does not declare them
const DEFAULT_CONNECTED_PHASES: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrentType {
    #[default]
    Ac,
    Dc,
}

/// Why a connector limit has its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorLimitSource {
    /// Static connector rating
    Connector,
    /// Smart-charging profile pushed to the station
    ChargingProfile,
    /// Static limitation configured on the station
    StaticLimitation,
}

/// Current ceiling of one connector at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorLimit {
    pub limit_amps: Option<Decimal>,
    pub limit_watts: Option<Decimal>,
    pub limit_source: ConnectorLimitSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub connector_id: u32,
    pub current_type: CurrentType,
    /// Rated power (W)
    pub power: Option<Decimal>,
    /// Amperage limit summed over phases (A)
    pub amperage_limit: Option<Decimal>,
    /// Rated voltage (V), overrides the station voltage
    pub voltage: Option<Decimal>,
    pub number_of_connected_phases: Option<u32>,
}

impl Connector {
    pub fn new(connector_id: u32, current_type: CurrentType) -> Self {
        Self {
            connector_id,
            current_type,
            power: None,
            amperage_limit: None,
            voltage: None,
            number_of_connected_phases: None,
        }
    }
}

/// Authorization pushed by a roaming platform with a remote start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteAuthorization {
    /// Roaming session id assigned by the remote platform
    pub id: String,
    pub connector_id: u32,
    pub tag_id: String,
    pub timestamp: DateTime<Utc>,
    /// OICP EVSE identification payload, if any
    pub oicp_identification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingStation {
    pub id: String,
    pub site_id: Option<String>,
    pub site_area_id: Option<String>,
    /// Vendor name, used to resolve a vendor integration
    pub vendor: Option<String>,
    /// Rated voltage (V)
    pub voltage: Option<Decimal>,
    pub connectors: Vec<Connector>,
    pub remote_authorizations: Vec<RemoteAuthorization>,
}

impl ChargingStation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            site_id: None,
            site_area_id: None,
            vendor: None,
            voltage: None,
            connectors: Vec::new(),
            remote_authorizations: Vec::new(),
        }
    }

    pub fn connector(&self, connector_id: u32) -> Option<&Connector> {
        self.connectors
            .iter()
            .find(|c| c.connector_id == connector_id)
    }

    pub fn current_type(&self, connector_id: u32) -> CurrentType {
        self.connector(connector_id)
            .map(|c| c.current_type)
            .unwrap_or_default()
    }

    pub fn rated_voltage(&self, connector_id: u32) -> Option<Decimal> {
        self.connector(connector_id)
            .and_then(|c| c.voltage)
            .or(self.voltage)
            .filter(|v| *v > Decimal::ZERO)
    }

    pub fn connected_phases(&self, connector_id: u32) -> u32 {
        self.connector(connector_id)
            .and_then(|c| c.number_of_connected_phases)
            .unwrap_or(DEFAULT_CONNECTED_PHASES)
    }

    /// Watts drawn by `amps` at the rated voltage (0 when the voltage is unknown or out of range)
    pub fn amps_to_watts(&self, connector_id: u32, amps: Decimal) -> Decimal {
        self.rated_voltage(connector_id)
            .and_then(|volts| volts.checked_mul(amps))
            .unwrap_or(Decimal::ZERO)
    }

    /// Amps drawn by `watts` at the rated voltage (0 when the voltage is unknown)
    pub fn watts_to_amps(&self, connector_id: u32, watts: Decimal) -> Decimal {
        self.rated_voltage(connector_id)
            .and_then(|volts| safe_div(watts, volts))
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of the rated power of every connector
    pub fn total_connector_power(&self) -> Decimal {
        self.connectors.iter().filter_map(|c| c.power).sum()
    }
}

// ── Tests ──────────────────────────────────────────────────────
