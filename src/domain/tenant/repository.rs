//! Tenant repository interface

use async_trait::async_trait;

use super::model::Tenant;
use crate::domain::DomainResult;

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn get_tenant(&self, id: &str) -> DomainResult<Option<Tenant>>;
    async fn save_tenant(&self, tenant: Tenant) -> DomainResult<()>;
}
