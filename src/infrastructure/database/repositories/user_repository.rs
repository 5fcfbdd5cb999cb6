use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::user::{SortOrder, UserSortField};
use crate::domain::{
    CreateUserDto, DomainError, DomainResult, GetUserDto, UpdateUserDto, User, UserRepositoryInterface,
    UserRole,
};
use crate::infrastructure::database::entities::user;
use crate::shared::{validate_pagination, PaginatedResult};

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::User => UserRole::User,
        user::UserRole::Admin => UserRole::Admin,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::User => user::UserRole::User,
        UserRole::Admin => user::UserRole::Admin,
    }
}

/// Roles reaching the repository were validated upstream; anything else
/// falls back to the least privileged role.
fn parse_role(role: Option<&str>) -> user::UserRole {
    role.and_then(|r| r.parse::<UserRole>().ok())
        .map_or(user::UserRole::User, domain_role_to_entity)
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password,
        role: entity_role_to_domain(model.role),
        is_email_verified: model.is_email_verified,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Hashing failures surface from `before_save` as a custom `DbErr`; they
/// are not a storage problem.
fn save_err(e: sea_orm::DbErr) -> DomainError {
    match e {
        sea_orm::DbErr::Custom(msg) if msg.starts_with(user::HASH_FAILURE) => {
            DomainError::Hashing(msg)
        }
        other => DomainError::Persistence(other),
    }
}

fn sort_column(field: UserSortField) -> user::Column {
    match field {
        UserSortField::Name => user::Column::Name,
        UserSortField::Email => user::Column::Email,
        UserSortField::Role => user::Column::Role,
        UserSortField::CreatedAt => user::Column::CreatedAt,
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let now = Utc::now();

        // `before_save` hashes the password and normalizes the email.
        let new_user = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(dto.name.trim().to_string()),
            email: Set(dto.email),
            password: Set(dto.password),
            role: Set(parse_role(dto.role.as_deref())),
            is_email_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = new_user.insert(&self.db).await.map_err(save_err)?;
        Ok(user_model_to_domain(model))
    }

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>> {
        let (page, limit) = validate_pagination(dto.page, dto.limit);

        let mut query = user::Entity::find();

        if let Some(ref name) = dto.name {
            query = query.filter(user::Column::Name.eq(name.as_str()));
        }
        if let Some(role) = dto.role {
            query = query.filter(user::Column::Role.eq(domain_role_to_entity(role)));
        }

        if dto.sort.is_empty() {
            query = query.order_by_asc(user::Column::CreatedAt);
        }
        for criterion in &dto.sort {
            let order = match criterion.order {
                SortOrder::Asc => Order::Asc,
                SortOrder::Desc => Order::Desc,
            };
            query = query.order_by(sort_column(criterion.field), order);
        }
        // Stable paging when the sort keys tie
        query = query.order_by_asc(user::Column::Id);

        let total = query.clone().count(&self.db).await?;

        let offset = u64::from(page - 1) * u64::from(limit);
        let models = query
            .offset(offset)
            .limit(u64::from(limit))
            .all(&self.db)
            .await?;

        let items: Vec<User> = models.into_iter().map(user_model_to_domain).collect();

        Ok(PaginatedResult::new(items, total, page, limit))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;

        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(model.map(user_model_to_domain))
    }

    async fn is_email_taken(&self, email: &str, exclude_user_id: Option<&str>) -> DomainResult<bool> {
        let mut query = user::Entity::find().filter(user::Column::Email.eq(email));

        if let Some(id) = exclude_user_id {
            query = query.filter(user::Column::Id.ne(id));
        }

        Ok(query.count(&self.db).await? > 0)
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let existing = user::Entity::find_by_id(id).one(&self.db).await?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        if dto.is_empty() {
            return Ok(Some(user_model_to_domain(existing)));
        }

        // Untouched fields stay `Unchanged`, so an update without a new
        // password leaves the stored hash alone.
        let mut active: user::ActiveModel = existing.into();

        if let Some(name) = dto.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(email) = dto.email {
            active.email = Set(email);
        }
        if let Some(password) = dto.password {
            active.password = Set(password);
        }
        if let Some(role) = dto.role {
            active.role = Set(parse_role(Some(&role)));
        }

        let updated = active.update(&self.db).await.map_err(save_err)?;

        Ok(Some(user_model_to_domain(updated)))
    }

    async fn delete_user(&self, id: &str) -> DomainResult<bool> {
        let Some(existing) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(false);
        };

        existing.delete(&self.db).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserSort;
    use crate::infrastructure::database::test_database;

    fn new_user(name: &str, email: &str) -> CreateUserDto {
        CreateUserDto {
            name: name.to_string(),
            email: email.to_string(),
            password: "password1".to_string(),
            role: None,
        }
    }

    async fn repo() -> UserRepository {
        UserRepository::new(test_database().await)
    }

    #[tokio::test]
    async fn create_stores_a_hash_not_the_plaintext() {
        let repo = repo().await;

        let user = repo
            .create_user(new_user("Jane", "Jane@Example.com"))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "password1");
        assert!(user.is_password_match("password1"));
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.role, UserRole::User);

        let stored = repo.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn email_taken_respects_exclusion() {
        let repo = repo().await;
        let jane = repo
            .create_user(new_user("Jane", "jane@example.com"))
            .await
            .unwrap();

        assert!(repo.is_email_taken("jane@example.com", None).await.unwrap());
        assert!(!repo
            .is_email_taken("jane@example.com", Some(&jane.id))
            .await
            .unwrap());
        assert!(!repo.is_email_taken("john@example.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn email_taken_does_not_normalize_case() {
        let repo = repo().await;
        repo.create_user(new_user("Jane", "jane@example.com"))
            .await
            .unwrap();

        assert!(!repo.is_email_taken("JANE@example.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn update_without_password_keeps_the_hash() {
        let repo = repo().await;
        let jane = repo
            .create_user(new_user("Jane", "jane@example.com"))
            .await
            .unwrap();

        let updated = repo
            .update_user(
                &jane.id,
                UpdateUserDto {
                    name: Some("Jane Roe".to_string()),
                    ..UpdateUserDto::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Jane Roe");
        assert_eq!(updated.password_hash, jane.password_hash);
    }

    #[tokio::test]
    async fn update_with_password_rehashes() {
        let repo = repo().await;
        let jane = repo
            .create_user(new_user("Jane", "jane@example.com"))
            .await
            .unwrap();

        let updated = repo
            .update_user(
                &jane.id,
                UpdateUserDto {
                    password: Some("newpassword2".to_string()),
                    ..UpdateUserDto::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_ne!(updated.password_hash, jane.password_hash);
        assert_ne!(updated.password_hash, "newpassword2");
        assert!(updated.is_password_match("newpassword2"));
        assert!(!updated.is_password_match("password1"));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_persistence_error() {
        let repo = repo().await;
        repo.create_user(new_user("Jane", "jane@example.com"))
            .await
            .unwrap();

        let err = repo
            .create_user(new_user("Impostor", "jane@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Persistence(_)));
    }

    #[test]
    fn hashing_failures_are_not_persistence_errors() {
        let err = save_err(sea_orm::DbErr::Custom(format!(
            "{}: invalid cost",
            user::HASH_FAILURE
        )));
        assert!(matches!(err, DomainError::Hashing(_)));

        let err = save_err(sea_orm::DbErr::Custom("something else".to_string()));
        assert!(matches!(err, DomainError::Persistence(_)));
    }

    #[tokio::test]
    async fn list_filters_sorts_and_paginates() {
        let repo = repo().await;
        for (name, email) in [
            ("Carol", "carol@example.com"),
            ("Alice", "alice@example.com"),
            ("Bob", "bob@example.com"),
        ] {
            repo.create_user(new_user(name, email)).await.unwrap();
        }
        repo.create_user(CreateUserDto {
            role: Some("admin".to_string()),
            ..new_user("Dave", "dave@example.com")
        })
        .await
        .unwrap();

        let page = repo
            .list_users(GetUserDto {
                role: Some(UserRole::User),
                sort: UserSort::parse_list("name:asc"),
                page: Some(2),
                limit: Some(2),
                ..GetUserDto::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        let names: Vec<&str> = page.items.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Carol"]);

        let admins = repo
            .list_users(GetUserDto {
                role: Some(UserRole::Admin),
                ..GetUserDto::default()
            })
            .await
            .unwrap();
        assert_eq!(admins.items.len(), 1);
        assert_eq!(admins.items[0].email, "dave@example.com");
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_existed() {
        let repo = repo().await;
        let jane = repo
            .create_user(new_user("Jane", "jane@example.com"))
            .await
            .unwrap();

        assert!(repo.delete_user(&jane.id).await.unwrap());
        assert!(!repo.delete_user(&jane.id).await.unwrap());
        assert!(repo.get_user_by_id(&jane.id).await.unwrap().is_none());
    }
}
