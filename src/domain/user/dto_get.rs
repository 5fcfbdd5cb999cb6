use std::str::FromStr;

use super::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Name,
    Email,
    Role,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One `field:order` criterion of a `sort_by` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSort {
    pub field: UserSortField,
    pub order: SortOrder,
}

impl UserSort {
    /// Parse `name:desc,role:asc`. Unknown fields and orders are skipped;
    /// an omitted order means ascending.
    pub fn parse_list(raw: &str) -> Vec<UserSort> {
        raw.split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect()
    }
}

impl FromStr for UserSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = s.split_once(':').unwrap_or((s, "asc"));
        let field = match field.trim() {
            "name" => UserSortField::Name,
            "email" => UserSortField::Email,
            "role" => UserSortField::Role,
            "created_at" => UserSortField::CreatedAt,
            _ => return Err(()),
        };
        let order = match order.trim() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return Err(()),
        };
        Ok(UserSort { field, order })
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetUserDto {
    /// Exact name match
    pub name: Option<String>,
    pub role: Option<UserRole>,
    /// Empty means oldest first
    pub sort: Vec<UserSort>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
