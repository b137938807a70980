use chrono::DateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROFILE_PICTURE: &str = "/uploads/default-avatar.svg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<chrono::Utc>,
}

/// Fields required to insert a user; id and timestamps are assigned here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
