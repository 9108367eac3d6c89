//! Site area repository interface

use async_trait::async_trait;

use super::model::SiteArea;
use crate::domain::DomainResult;

#[async_trait]
pub trait SiteAreaRepository: Send + Sync {
    async fn get_site_area(&self, id: &str) -> DomainResult<Option<SiteArea>>;
    async fn save_site_area(&self, site_area: SiteArea) -> DomainResult<()>;
}
