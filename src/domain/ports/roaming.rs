//! Roaming CPO client ports (OCPI, OICP)

use std::fmt;

use async_trait::async_trait;

use crate::domain::charging_station::ChargingStation;
use crate::domain::tag::OcpiToken;
use crate::domain::transaction::Transaction;
use crate::domain::DomainResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoamingProtocol {
    Ocpi,
    Oicp,
}

impl RoamingProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ocpi => "ocpi",
            Self::Oicp => "oicp",
        }
    }
}

impl fmt::Display for RoamingProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OCPI client acting as CPO towards an eMSP
#[async_trait]
pub trait OcpiCpoClient: Send + Sync {
    async fn start_session(
        &self,
        token: &OcpiToken,
        station: &ChargingStation,
        transaction: &Transaction,
        authorization_id: &str,
    ) -> DomainResult<()>;

    async fn update_session(&self, transaction: &Transaction) -> DomainResult<()>;

    async fn stop_session(&self, transaction: &Transaction) -> DomainResult<()>;

    async fn post_cdr(&self, transaction: &Transaction) -> DomainResult<()>;
}

/// OICP client acting as CPO towards Hubject
#[async_trait]
pub trait OicpCpoClient: Send + Sync {
    async fn start_session(
        &self,
        station: &ChargingStation,
        transaction: &Transaction,
        session_id: &str,
        identification: Option<&str>,
    ) -> DomainResult<()>;

    async fn update_session(&self, transaction: &Transaction) -> DomainResult<()>;

    async fn stop_session(&self, transaction: &Transaction) -> DomainResult<()>;

    async fn push_cdr(&self, transaction: &Transaction) -> DomainResult<()>;
}
