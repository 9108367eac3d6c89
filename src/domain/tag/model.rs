//! Tag domain entity

use serde::{Deserialize, Serialize};

/// Token record received from an OCPI eMSP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcpiToken {
    pub uid: String,
    pub auth_id: String,
    pub issuer: String,
}

/// RFID card / authorization token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// The tag value (RFID card number)
    pub id: String,
    pub user_id: Option<String>,
    /// Present when the tag was pushed by an OCPI partner
    pub ocpi_token: Option<OcpiToken>,
}

impl Tag {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            ocpi_token: None,
        }
    }
}
