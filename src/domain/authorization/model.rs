//! Authorization domain entity
//!
//! Recorded for every Authorize request a station sends. Roaming START
//! looks these up to find the remote session they belong to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub id: String,
    pub charge_point_id: String,
    pub tag_id: String,
    pub timestamp: DateTime<Utc>,
    /// OCPI authorization id, doubles as the OCPI session id
    pub ocpi_authorization_id: Option<String>,
    pub oicp_session_id: Option<String>,
    pub oicp_identification: Option<String>,
}

impl Authorization {
    pub fn new(
        id: impl Into<String>,
        charge_point_id: impl Into<String>,
        tag_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            charge_point_id: charge_point_id.into(),
            tag_id: tag_id.into(),
            timestamp,
            ocpi_authorization_id: None,
            oicp_session_id: None,
            oicp_identification: None,
        }
    }
}

/// Authorizations of one tag on one station since `date_from`
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationFilter {
    pub charge_point_id: String,
    pub tag_id: String,
    pub date_from: DateTime<Utc>,
}

impl AuthorizationFilter {
    pub fn matches(&self, authorization: &Authorization) -> bool {
        authorization.charge_point_id == self.charge_point_id
            && authorization.tag_id == self.tag_id
            && authorization.timestamp >= self.date_from
    }
}
