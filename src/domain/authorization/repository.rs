//! Authorization repository interface

use async_trait::async_trait;

use super::model::{Authorization, AuthorizationFilter};
use crate::domain::DomainResult;

#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    async fn save_authorization(&self, authorization: Authorization) -> DomainResult<()>;
    /// Matching authorizations, oldest first
    async fn find_authorizations(
        &self,
        filter: &AuthorizationFilter,
    ) -> DomainResult<Vec<Authorization>>;
}
