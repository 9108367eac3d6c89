//! Tag repository interface

use async_trait::async_trait;

use super::model::Tag;
use crate::domain::DomainResult;

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn get_tag(&self, id: &str) -> DomainResult<Option<Tag>>;
    async fn save_tag(&self, tag: Tag) -> DomainResult<()>;
}
