use crate::models::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public-safe projection used in friend and request lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    #[serde(with = "serde_str")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_picture: user.profile_picture,
        }
    }
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary::from(user.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    #[serde(with = "serde_str")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    #[serde(flatten)]
    pub user: PublicUser,
    pub friends_count: usize,
    pub friends: Vec<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub friends_count: usize,
    pub member_since: DateTime<Utc>,
}
