//! User entity for database
//!
//! Persistence rules live in [`ActiveModelBehavior::before_save`]: the email
//! is normalized and a modified password is replaced by its bcrypt hash, so
//! a stored row never holds a plaintext password.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::infrastructure::crypto::password::hash_password;

/// Prefix of the `DbErr::Custom` raised when hashing fails in `before_save`
pub const HASH_FAILURE: &str = "Failed to hash password";

/// User role
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// User model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// bcrypt hash
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    pub is_email_verified: bool,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut model = self;

        normalize_email(&mut model.email);
        hash_password_if_modified(&mut model.password)
            .map_err(|e| DbErr::Custom(format!("{}: {}", HASH_FAILURE, e)))?;

        let now = Utc::now();
        if insert && !model.created_at.is_set() {
            model.created_at = ActiveValue::Set(now);
        }
        model.updated_at = ActiveValue::Set(now);

        Ok(model)
    }
}

/// Replace a modified plaintext password with its hash.
///
/// Only `Set` counts as modified. `Unchanged` and `NotSet` are left exactly
/// as they are and `Ok(false)` is returned.
pub fn hash_password_if_modified(
    password: &mut ActiveValue<String>,
) -> Result<bool, bcrypt::BcryptError> {
    let ActiveValue::Set(plain) = password else {
        return Ok(false);
    };

    let hashed = hash_password(plain)?;
    *password = ActiveValue::Set(hashed);
    Ok(true)
}

fn normalize_email(email: &mut ActiveValue<String>) {
    if let ActiveValue::Set(value) = email {
        let normalized = value.trim().to_lowercase();
        *value = normalized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::password::verify_password;
    use crate::infrastructure::database::test_database;

    #[test]
    fn unchanged_password_is_left_byte_identical() {
        let stored = hash_password("password1").unwrap();
        let mut field = ActiveValue::Unchanged(stored.clone());

        let hashed = hash_password_if_modified(&mut field).unwrap();

        assert!(!hashed);
        assert_eq!(field, ActiveValue::Unchanged(stored));
    }

    #[test]
    fn unset_password_stays_unset() {
        let mut field: ActiveValue<String> = ActiveValue::NotSet;

        assert!(!hash_password_if_modified(&mut field).unwrap());
        assert_eq!(field, ActiveValue::NotSet);
    }

    #[test]
    fn modified_password_is_replaced_by_its_hash() {
        let mut field = ActiveValue::Set("password1".to_string());

        assert!(hash_password_if_modified(&mut field).unwrap());

        let ActiveValue::Set(hash) = field else {
            panic!("password should still be marked as modified");
        };
        assert_ne!(hash, "password1");
        assert!(verify_password("password1", &hash).unwrap());
    }

    fn draft() -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set("3f1c8c34-5b2e-4d7f-9a3c-0e5f6a7b8c9d".to_string()),
            name: ActiveValue::Set("Jane Doe".to_string()),
            email: ActiveValue::Set("  Jane@Example.COM ".to_string()),
            password: ActiveValue::Set("password1".to_string()),
            role: ActiveValue::Set(UserRole::User),
            is_email_verified: ActiveValue::Set(false),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn before_save_hashes_and_normalizes_on_insert() {
        let db = test_database().await;

        let saved = draft().before_save(&db, true).await.unwrap();

        assert_eq!(
            saved.email,
            ActiveValue::Set("jane@example.com".to_string())
        );
        let ActiveValue::Set(hash) = &saved.password else {
            panic!("password should be set");
        };
        assert!(verify_password("password1", hash).unwrap());
        assert!(saved.created_at.is_set());
        assert!(saved.updated_at.is_set());
    }

    #[tokio::test]
    async fn before_save_keeps_an_unmodified_hash() {
        let db = test_database().await;
        let stored = hash_password("password1").unwrap();
        let mut model = draft();
        model.password = ActiveValue::Unchanged(stored.clone());

        let saved = model.before_save(&db, false).await.unwrap();

        assert_eq!(saved.password, ActiveValue::Unchanged(stored));
    }

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(UserRole::default(), UserRole::User);
        assert_eq!(serde_json::to_value(UserRole::default()).unwrap(), "user");
    }

    #[test]
    fn serialized_model_omits_password() {
        let model = Model {
            id: "u-1".to_string(),
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: hash_password("password1").unwrap(),
            role: UserRole::Admin,
            is_email_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&model).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["role"], "admin");
        assert_eq!(json["is_email_verified"], true);
    }
}
