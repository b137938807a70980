use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

use crate::relationships::PairState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "relationship_kind", rename_all = "lowercase")]
pub enum RelationshipKind {
    Pending,
    Friends,
}

/// One row per related pair, keyed by `(user_low, user_high)` with
/// `user_low < user_high`. A missing row means the pair is unrelated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Relationship {
    pub user_low: i64,
    pub user_high: i64,
    pub requester_id: i64,
    pub kind: RelationshipKind,
    pub created_at: DateTime<chrono::Utc>,
    pub updated_at: DateTime<chrono::Utc>,
}

impl Relationship {
    pub fn pair_state(&self) -> PairState {
        match self.kind {
            RelationshipKind::Pending => PairState::Pending {
                from: self.requester_id,
            },
            RelationshipKind::Friends => PairState::Friends,
        }
    }
}
