//! Borrower identity model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Identity roles: `Borrower` accounts come from the directory sync or
/// self-registration, `Staff` accounts are provisioned administratively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Borrower,
    Staff,
}

/// User model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    /// Directory-synced borrowers carry no usable credential
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// User profile with current circulation counts
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub active_borrows: i64,
    pub overdue_borrows: i64,
}

/// Staff provisioning request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaff {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
}

/// User listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserQuery {
    /// Matches username, first or last name
    pub q: Option<String>,
    pub role: Option<Role>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_trims_empty_last_name() {
        let user = User {
            id: 1,
            username: "mcs231234".into(),
            first_name: "Asha".into(),
            last_name: "".into(),
            email: "mcs231234@iitd.ac.in".into(),
            role: Role::Borrower,
            password_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(user.display_name(), "Asha");
    }
}
