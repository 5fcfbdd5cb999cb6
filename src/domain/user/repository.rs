use async_trait::async_trait;

use super::{CreateUserDto, GetUserDto, UpdateUserDto, User};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

/// Persistence port for users.
///
/// Implementations hash any password they receive before it is stored;
/// callers always pass plaintext.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Whether another user already owns `email`. The match is exact:
    /// callers normalize case beforehand.
    async fn is_email_taken(&self, email: &str, exclude_user_id: Option<&str>) -> DomainResult<bool>;

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    /// Returns `false` when no user had that id.
    async fn delete_user(&self, id: &str) -> DomainResult<bool>;
}
