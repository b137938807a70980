//! Friendship state machine.
//!
//! Every pair of users is in exactly one [`PairState`]. Transitions are
//! computed here without touching storage; the stores load the current
//! state, call [`transition`] and persist the result for both users at once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type UserId = i64;

/// Relationship between two distinct users, independent of who is looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairState {
    #[default]
    None,
    /// `from` sent a request that the other user hasn't answered yet.
    Pending { from: UserId },
    Friends,
}

impl PairState {
    /// The relationship as seen by `viewer`, who must be part of the pair.
    pub fn status_for(self, viewer: UserId) -> RelationshipStatus {
        match self {
            PairState::None => RelationshipStatus::None,
            PairState::Friends => RelationshipStatus::Friends,
            PairState::Pending { from } if from == viewer => RelationshipStatus::RequestSent,
            PairState::Pending { .. } => RelationshipStatus::RequestReceived,
        }
    }
}

/// What the presentation layer needs to pick the right action for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipStatus {
    #[serde(rename = "SELF")]
    Myself,
    Friends,
    RequestSent,
    RequestReceived,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendAction {
    SendRequest,
    Accept,
    Reject,
    Remove,
}

impl FriendAction {
    pub fn as_str(self) -> &'static str {
        match self {
            FriendAction::SendRequest => "send_request",
            FriendAction::Accept => "accept",
            FriendAction::Reject => "reject",
            FriendAction::Remove => "remove",
        }
    }
}

/// Client-facing classes of relationship failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidOperation,
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelationshipError {
    #[error("You can't be friends with yourself.")]
    SelfRelationship,
    #[error("User {0} doesn't exist.")]
    UserNotFound(UserId),
    #[error("You are already friends with this user.")]
    AlreadyFriends,
    #[error("You already sent a friend request to this user.")]
    RequestAlreadySent,
    #[error("This user already sent you a friend request.")]
    RequestAlreadyReceived,
    #[error("There is no pending friend request from this user.")]
    NoPendingRequest,
    #[error("You are not friends with this user.")]
    NotFriends,
}

impl RelationshipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelationshipError::SelfRelationship => ErrorKind::InvalidOperation,
            RelationshipError::UserNotFound(_) => ErrorKind::NotFound,
            RelationshipError::AlreadyFriends
            | RelationshipError::RequestAlreadySent
            | RelationshipError::RequestAlreadyReceived
            | RelationshipError::NoPendingRequest
            | RelationshipError::NotFriends => ErrorKind::Conflict,
        }
    }
}

pub fn ensure_distinct(actor: UserId, other: UserId) -> Result<(), RelationshipError> {
    if actor == other {
        return Err(RelationshipError::SelfRelationship);
    }
    Ok(())
}

/// Computes the state `actor` moves the pair into by performing `action`
/// towards `other`. Fails without side effects when the current state
/// doesn't allow it.
pub fn transition(
    action: FriendAction,
    actor: UserId,
    other: UserId,
    current: PairState,
) -> Result<PairState, RelationshipError> {
    ensure_distinct(actor, other)?;

    match (action, current) {
        (FriendAction::SendRequest, PairState::None) => Ok(PairState::Pending { from: actor }),
        (FriendAction::SendRequest, PairState::Friends) => Err(RelationshipError::AlreadyFriends),
        (FriendAction::SendRequest, PairState::Pending { from }) if from == actor => {
            Err(RelationshipError::RequestAlreadySent)
        }
        (FriendAction::SendRequest, PairState::Pending { .. }) => {
            Err(RelationshipError::RequestAlreadyReceived)
        }

        (FriendAction::Accept, PairState::Pending { from }) if from == other => {
            Ok(PairState::Friends)
        }
        (FriendAction::Reject, PairState::Pending { from }) if from == other => {
            Ok(PairState::None)
        }
        (FriendAction::Accept | FriendAction::Reject, _) => {
            Err(RelationshipError::NoPendingRequest)
        }

        (FriendAction::Remove, PairState::Friends) => Ok(PairState::None),
        (FriendAction::Remove, _) => Err(RelationshipError::NotFriends),
    }
}

/// Resolves `getStatus` for two ids, short-circuiting when they're equal.
pub fn status_between(viewer: UserId, other: UserId, state: PairState) -> RelationshipStatus {
    if viewer == other {
        return RelationshipStatus::Myself;
    }
    state.status_for(viewer)
}

/// Orders a pair the way pair-keyed storage indexes it.
pub fn pair_key(a: UserId, b: UserId) -> (UserId, UserId) {
    if a < b { (a, b) } else { (b, a) }
}
