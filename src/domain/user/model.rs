use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::infrastructure::crypto::password::verify_password;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

/// Permission granted by a role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Right {
    GetUsers,
    ManageUsers,
}

impl UserRole {
    pub const ALL: [UserRole; 2] = [UserRole::User, UserRole::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn rights(self) -> &'static [Right] {
        match self {
            UserRole::User => &[],
            UserRole::Admin => &[Right::GetUsers, Right::ManageUsers],
        }
    }

    pub fn has_right(self, right: Right) -> bool {
        self.rights().contains(&right)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role '{}'", s))
    }
}

/// User model
///
/// `password_hash` and the timestamps are internal: they never appear in
/// the serialized form, however the value was obtained.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_email_verified: bool,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check a plaintext candidate against the stored hash.
    ///
    /// A malformed stored hash never matches.
    pub fn is_password_match(&self, candidate: &str) -> bool {
        verify_password(candidate, &self.password_hash).unwrap_or(false)
    }
}
