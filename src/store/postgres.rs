//! PostgreSQL store.
//!
//! Relationships live in one row per unordered pair (see `migrations/`).
//! Transitions lock both user rows in id order before reading the pair, so
//! concurrent transitions on the same pair serialize while disjoint pairs
//! proceed independently.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::{
    auth::generate_id,
    errors::AppError,
    models::{NewUser, Relationship, RelationshipKind, User, user::DEFAULT_PROFILE_PICTURE},
    relationships::{self, FriendAction, PairState, RelationshipError, UserId},
    store::{RelationshipStore, UserStore, normalize_email},
    types::UserSummary,
};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so user input only matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, profile_picture, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, profile_picture, created_at
            "#,
        )
        .bind(generate_id())
        .bind(new_user.name.trim())
        .bind(normalize_email(&new_user.email))
        .bind(&new_user.password_hash)
        .bind(DEFAULT_PROFILE_PICTURE)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AppError::UserAlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, profile_picture, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, profile_picture, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn search(
        &self,
        query: &str,
        exclude: UserId,
        limit: usize,
    ) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, name, email, profile_picture
            FROM users
            WHERE name ILIKE $1 AND id <> $2
            ORDER BY lower(name COLLATE "C"), id
            LIMIT $3
            "#,
        )
        .bind(like_pattern(query))
        .bind(exclude)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

#[async_trait]
impl RelationshipStore for PgStore {
    async fn pair_state(&self, a: UserId, b: UserId) -> Result<PairState, AppError> {
        let (low, high) = relationships::pair_key(a, b);
        let row = sqlx::query_as::<_, Relationship>(
            r#"
            SELECT user_low, user_high, requester_id, kind, created_at, updated_at
            FROM relationships
            WHERE user_low = $1 AND user_high = $2
            "#,
        )
        .bind(low)
        .bind(high)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.pair_state()).unwrap_or_default())
    }

    async fn apply(
        &self,
        actor: UserId,
        other: UserId,
        action: FriendAction,
    ) -> Result<PairState, AppError> {
        relationships::ensure_distinct(actor, other)?;
        let (low, high) = relationships::pair_key(actor, other);

        let mut tx = self.pool.begin().await?;

        let locked: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM users
            WHERE id = $1 OR id = $2
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(low)
        .bind(high)
        .fetch_all(&mut *tx)
        .await?;

        for id in [actor, other] {
            if !locked.contains(&id) {
                return Err(RelationshipError::UserNotFound(id).into());
            }
        }

        let current = sqlx::query_as::<_, Relationship>(
            r#"
            SELECT user_low, user_high, requester_id, kind, created_at, updated_at
            FROM relationships
            WHERE user_low = $1 AND user_high = $2
            "#,
        )
        .bind(low)
        .bind(high)
        .fetch_optional(&mut *tx)
        .await?
        .map(|r| r.pair_state())
        .unwrap_or_default();

        let next = relationships::transition(action, actor, other, current)?;

        match next {
            PairState::None => {
                sqlx::query("DELETE FROM relationships WHERE user_low = $1 AND user_high = $2")
                    .bind(low)
                    .bind(high)
                    .execute(&mut *tx)
                    .await?;
            }
            PairState::Pending { from } => {
                upsert(&mut tx, low, high, from, RelationshipKind::Pending).await?;
            }
            PairState::Friends => {
                // The original requester stays recorded on the row.
                let requester = match current {
                    PairState::Pending { from } => from,
                    _ => other,
                };
                upsert(&mut tx, low, high, requester, RelationshipKind::Friends).await?;
            }
        }

        tx.commit().await?;

        Ok(next)
    }

    async fn friends_of(&self, user: UserId) -> Result<Vec<UserSummary>, AppError> {
        let friends = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.profile_picture
            FROM relationships r
            INNER JOIN users u
                ON u.id = CASE WHEN r.user_low = $1 THEN r.user_high ELSE r.user_low END
            WHERE (r.user_low = $1 OR r.user_high = $1)
                AND r.kind = 'friends'
            ORDER BY lower(u.name COLLATE "C"), u.id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn requests_received(&self, user: UserId) -> Result<Vec<UserSummary>, AppError> {
        let senders = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.profile_picture
            FROM relationships r
            INNER JOIN users u ON u.id = r.requester_id
            WHERE (r.user_low = $1 OR r.user_high = $1)
                AND r.kind = 'pending'
                AND r.requester_id <> $1
            ORDER BY lower(u.name COLLATE "C"), u.id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(senders)
    }

    async fn requests_sent(&self, user: UserId) -> Result<Vec<UserSummary>, AppError> {
        let recipients = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.profile_picture
            FROM relationships r
            INNER JOIN users u
                ON u.id = CASE WHEN r.user_low = $1 THEN r.user_high ELSE r.user_low END
            WHERE r.requester_id = $1
                AND r.kind = 'pending'
            ORDER BY lower(u.name COLLATE "C"), u.id
            "#,
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(recipients)
    }

    async fn friends_count(&self, user: UserId) -> Result<usize, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM relationships
            WHERE (user_low = $1 OR user_high = $1) AND kind = 'friends'
            "#,
        )
        .bind(user)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }
}

async fn upsert(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    low: UserId,
    high: UserId,
    requester: UserId,
    kind: RelationshipKind,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO relationships (user_low, user_high, requester_id, kind, created_at, updated_at)
        VALUES ($1, $2, $3, $4, now(), now())
        ON CONFLICT (user_low, user_high)
        DO UPDATE SET requester_id = EXCLUDED.requester_id,
                      kind = EXCLUDED.kind,
                      updated_at = now()
        "#,
    )
    .bind(low)
    .bind(high)
    .bind(requester)
    .bind(kind)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
