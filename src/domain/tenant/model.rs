//! Tenant domain entity

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Optional feature set a tenant can switch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenantComponent {
    Organization,
    Pricing,
    Billing,
    Ocpi,
    Oicp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub components: HashSet<TenantComponent>,
}

impl Tenant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            components: HashSet::new(),
        }
    }

    pub fn with_component(mut self, component: TenantComponent) -> Self {
        self.components.insert(component);
        self
    }

    pub fn is_component_active(&self, component: TenantComponent) -> bool {
        self.components.contains(&component)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_are_opt_in() {
        let tenant = Tenant::new("t1", "Tenant").with_component(TenantComponent::Ocpi);
        assert!(tenant.is_component_active(TenantComponent::Ocpi));
        assert!(!tenant.is_component_active(TenantComponent::Oicp));
        assert!(!tenant.is_component_active(TenantComponent::Organization));
    }
}
