//! Storage seams for users and relationships.
//!
//! Handlers only see the traits; `main` picks [`PgStore`] or [`MemoryStore`]
//! from configuration.

pub mod memory;
pub mod postgres;

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::{
    errors::AppError,
    models::{NewUser, User},
    relationships::{FriendAction, PairState, UserId},
    types::UserSummary,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const SEARCH_LIMIT: usize = 10;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`AppError::UserAlreadyExists`] when the email is taken.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Case-insensitive substring match on the name, ordered by [`by_name`].
    async fn search(
        &self,
        query: &str,
        exclude: UserId,
        limit: usize,
    ) -> Result<Vec<UserSummary>, AppError>;
}

#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Current state of the pair. Unknown ids read as [`PairState::None`].
    async fn pair_state(&self, a: UserId, b: UserId) -> Result<PairState, AppError>;

    /// Applies `action` from `actor` towards `other`. Both sides of the
    /// relationship are updated together or not at all.
    async fn apply(
        &self,
        actor: UserId,
        other: UserId,
        action: FriendAction,
    ) -> Result<PairState, AppError>;

    async fn friends_of(&self, user: UserId) -> Result<Vec<UserSummary>, AppError>;

    async fn requests_received(&self, user: UserId) -> Result<Vec<UserSummary>, AppError>;

    async fn requests_sent(&self, user: UserId) -> Result<Vec<UserSummary>, AppError>;

    async fn friends_count(&self, user: UserId) -> Result<usize, AppError> {
        Ok(self.friends_of(user).await?.len())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// List order for user summaries: ASCII-case-folded name, then byte order,
/// then id. `PgStore` sorts with `lower(name COLLATE "C"), id`, which gives
/// the same order.
pub fn by_name(a: &UserSummary, b: &UserSummary) -> Ordering {
    a.name
        .to_ascii_lowercase()
        .cmp(&b.name.to_ascii_lowercase())
        .then(a.id.cmp(&b.id))
}
