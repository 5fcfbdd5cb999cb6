//! User management service: application-layer orchestration
//!
//! All user-related business logic lives here.
//! HTTP handlers should be thin wrappers that delegate to this service.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info};
use validator::Validate;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, GetUserDto, UpdateUserDto, User,
    UserRepositoryInterface,
};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::shared::PaginatedResult;

/// Canonical form of an email address: trimmed and lowercased.
///
/// The repository's uniqueness check compares emails verbatim, so every
/// email is passed through here first.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash compared against when the email is unknown, so a miss costs the
/// same bcrypt round as a wrong password.
fn unknown_user_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password("unknown-user-0").unwrap_or_default())
}

/// User service: orchestrates all identity / user-management use-cases.
///
/// Generic over `R: UserRepositoryInterface` so it stays decoupled from
/// the concrete persistence layer.
pub struct UserService<R: UserRepositoryInterface> {
    repo: Arc<R>,
}

impl<R: UserRepositoryInterface> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    // ── Authentication ──────────────────────────────────────────

    /// Resolve a user by email + password.
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> DomainResult<User> {
        let user = self.repo.get_user_by_email(&normalize_email(email)).await?;

        let authenticated = match user {
            Some(user) => user.is_password_match(password).then_some(user),
            None => {
                let _ = verify_password(password, unknown_user_hash());
                None
            }
        };

        match authenticated {
            Some(user) => {
                info!(user_id = %user.id, "User logged in");
                Ok(user)
            }
            None => {
                debug!("Rejected login attempt");
                Err(DomainError::Unauthorized(
                    "Incorrect email or password".into(),
                ))
            }
        }
    }

    // ── Registration ────────────────────────────────────────────

    /// Self-service sign-up; the role is always `user`.
    pub async fn register(&self, mut dto: CreateUserDto) -> DomainResult<User> {
        dto.role = None;
        self.create_user(dto).await
    }

    /// Normalize, validate, check email uniqueness, then persist.
    pub async fn create_user(&self, mut dto: CreateUserDto) -> DomainResult<User> {
        dto.name = dto.name.trim().to_string();
        dto.email = normalize_email(&dto.email);
        dto.validate()?;

        if self.repo.is_email_taken(&dto.email, None).await? {
            return Err(DomainError::EmailTaken);
        }

        let user = self.repo.create_user(dto).await?;

        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// List users with filtering, sorting and pagination.
    pub async fn query_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>> {
        self.repo.list_users(dto).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> DomainResult<User> {
        self.repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    pub async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.repo.get_user_by_email(&normalize_email(email)).await
    }

    // ── Commands (mutations) ────────────────────────────────────

    pub async fn update_user_by_id(&self, id: &str, mut dto: UpdateUserDto) -> DomainResult<User> {
        dto.name = dto.name.map(|name| name.trim().to_string());
        dto.email = dto.email.as_deref().map(normalize_email);
        dto.validate()?;

        // 404 takes precedence over a conflicting email
        self.get_user_by_id(id).await?;

        if let Some(email) = dto.email.as_deref() {
            if self.repo.is_email_taken(email, Some(id)).await? {
                return Err(DomainError::EmailTaken);
            }
        }

        let user = self
            .repo
            .update_user(id, dto)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    pub async fn delete_user_by_id(&self, id: &str) -> DomainResult<()> {
        if !self.repo.delete_user(id).await? {
            return Err(DomainError::user_not_found(id));
        }

        info!(user_id = id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infrastructure::database::repositories::UserRepository;
    use crate::infrastructure::database::test_database;

    async fn service() -> UserService<UserRepository> {
        UserService::new(Arc::new(UserRepository::new(test_database().await)))
    }

    fn dto(email: &str) -> CreateUserDto {
        CreateUserDto {
            name: "Jane Doe".to_string(),
            email: email.to_string(),
            password: "password1".to_string(),
            role: Some("admin".to_string()),
        }
    }

    #[tokio::test]
    async fn register_forces_the_user_role() {
        let svc = service().await;

        let user = svc.register(dto("jane@example.com")).await.unwrap();

        assert_eq!(user.role, UserRole::User);
    }

    #[tokio::test]
    async fn create_rejects_taken_email_regardless_of_case() {
        let svc = service().await;
        svc.create_user(dto("jane@example.com")).await.unwrap();

        let err = svc.create_user(dto("  JANE@example.com")).await.unwrap_err();

        assert!(matches!(err, DomainError::EmailTaken));
    }

    #[tokio::test]
    async fn create_normalizes_before_validating() {
        let svc = service().await;

        let user = svc
            .create_user(CreateUserDto {
                name: "  Jane Doe ".to_string(),
                ..dto("  Jane@Example.com ")
            })
            .await
            .unwrap();

        assert_eq!(user.name, "Jane Doe");
        assert_eq!(user.email, "jane@example.com");
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let svc = service().await;

        let err = svc
            .create_user(CreateUserDto {
                name: "   ".to_string(),
                ..dto("jane@example.com")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidFields(ref f) if f[0].starts_with("name: ")));

        let jane = svc.create_user(dto("jane@example.com")).await.unwrap();
        let err = svc
            .update_user_by_id(
                &jane.id,
                UpdateUserDto {
                    name: Some(" \t ".to_string()),
                    ..UpdateUserDto::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidFields(ref f) if f[0].starts_with("name: ")));
        assert_eq!(svc.get_user_by_id(&jane.id).await.unwrap().name, "Jane Doe");
    }

    #[tokio::test]
    async fn create_validates_before_touching_storage() {
        let svc = service().await;

        let err = svc
            .create_user(CreateUserDto {
                password: "password".to_string(),
                ..dto("not-an-email")
            })
            .await
            .unwrap_err();

        let DomainError::InvalidFields(fields) = err else {
            panic!("expected field errors, got {:?}", err);
        };
        assert_eq!(fields.len(), 2);
        assert!(fields[0].starts_with("email: "));
        assert!(fields[1].starts_with("password: "));
        assert!(svc
            .get_user_by_email("not-an-email")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn login_checks_the_password() {
        let svc = service().await;
        svc.create_user(dto("jane@example.com")).await.unwrap();

        let user = svc
            .login_with_email_and_password("Jane@Example.com", "password1")
            .await
            .unwrap();
        assert_eq!(user.email, "jane@example.com");

        for (email, password) in [
            ("jane@example.com", "password2"),
            ("john@example.com", "password1"),
        ] {
            let err = svc
                .login_with_email_and_password(email, password)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Unauthorized(ref m) if m == "Incorrect email or password"));
        }
    }

    #[test]
    fn unknown_user_hash_is_a_real_bcrypt_hash() {
        let hash = unknown_user_hash();

        assert!(hash.starts_with("$2b$10$"));
        assert!(!verify_password("password1", hash).unwrap());
    }

    #[tokio::test]
    async fn update_allows_keeping_own_email() {
        let svc = service().await;
        let jane = svc.create_user(dto("jane@example.com")).await.unwrap();
        svc.create_user(dto("john@example.com")).await.unwrap();

        let same = svc
            .update_user_by_id(
                &jane.id,
                UpdateUserDto {
                    email: Some("jane@example.com".to_string()),
                    ..UpdateUserDto::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same.email, "jane@example.com");

        let err = svc
            .update_user_by_id(
                &jane.id,
                UpdateUserDto {
                    email: Some("John@example.com".to_string()),
                    ..UpdateUserDto::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmailTaken));
    }

    #[tokio::test]
    async fn missing_users_are_not_found() {
        let svc = service().await;

        assert!(matches!(
            svc.get_user_by_id("missing").await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            svc.update_user_by_id("missing", UpdateUserDto::default()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            svc.delete_user_by_id("missing").await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
