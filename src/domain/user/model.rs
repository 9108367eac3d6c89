//! User domain entity

use serde::{Deserialize, Serialize};

/// Who issued the user's identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserOrigin {
    /// Issued by this organization
    #[default]
    Local,
    /// Federated through an OCPI partner
    Ocpi,
    /// Federated through Hubject OICP
    Oicp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub origin: UserOrigin,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, origin: UserOrigin) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            origin,
        }
    }

    /// Issued by a roaming partner rather than locally
    pub fn is_federated(&self) -> bool {
        self.origin != UserOrigin::Local
    }
}
