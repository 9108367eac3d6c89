//! User repository interface

use async_trait::async_trait;

use super::model::User;
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: &str) -> DomainResult<Option<User>>;
    async fn save_user(&self, user: User) -> DomainResult<()>;
}
