//! In-process store keeping the three relationship sets on each user.
//!
//! A single mutex guards users and relationship sets together, so a
//! transition reads the pair, validates it and rewrites both sides inside one
//! critical section. Nothing here awaits while the lock is held.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::{
    auth::generate_id,
    errors::AppError,
    models::{NewUser, User, user::DEFAULT_PROFILE_PICTURE},
    relationships::{self, FriendAction, PairState, RelationshipError, UserId},
    store::{RelationshipStore, UserStore, by_name, normalize_email},
    types::UserSummary,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRelations {
    pub friends: HashSet<UserId>,
    pub requests_sent: HashSet<UserId>,
    pub requests_received: HashSet<UserId>,
}

impl UserRelations {
    /// Reads the pair state from `me`'s side only.
    pub fn state_with(&self, me: UserId, other: UserId) -> PairState {
        if self.friends.contains(&other) {
            PairState::Friends
        } else if self.requests_sent.contains(&other) {
            PairState::Pending { from: me }
        } else if self.requests_received.contains(&other) {
            PairState::Pending { from: other }
        } else {
            PairState::None
        }
    }

    fn forget(&mut self, other: UserId) {
        self.friends.remove(&other);
        self.requests_sent.remove(&other);
        self.requests_received.remove(&other);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    SelfRelationship { user: UserId },
    AsymmetricFriendship { user: UserId, other: UserId },
    AsymmetricRequest { sender: UserId, recipient: UserId },
    OverlappingStates { user: UserId, other: UserId },
    DanglingReference { user: UserId, other: UserId },
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, User>,
    relations: HashMap<UserId, UserRelations>,
}

impl Inner {
    fn summaries(&self, ids: &HashSet<UserId>) -> Vec<UserSummary> {
        let mut summaries: Vec<UserSummary> = ids
            .iter()
            .filter_map(|id| self.users.get(id))
            .map(UserSummary::from)
            .collect();
        summaries.sort_by(by_name);
        summaries
    }

    fn relations(&self, user: UserId) -> UserRelations {
        self.relations.get(&user).cloned().unwrap_or_default()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one user's relationship sets.
    pub fn relations_of(&self, user: UserId) -> UserRelations {
        self.inner.lock().relations(user)
    }

    /// Every pair that breaks the symmetry, exclusivity or no-self rules.
    /// Empty when the store is consistent.
    pub fn invariant_violations(&self) -> Vec<InvariantViolation> {
        let inner = self.inner.lock();
        let mut violations = Vec::new();

        for (&user, rel) in &inner.relations {
            let all = rel
                .friends
                .iter()
                .chain(&rel.requests_sent)
                .chain(&rel.requests_received);
            for &other in all {
                if other == user {
                    violations.push(InvariantViolation::SelfRelationship { user });
                } else if !inner.users.contains_key(&other) {
                    violations.push(InvariantViolation::DanglingReference { user, other });
                }
            }

            let theirs = |other: UserId| inner.relations(other);

            for &other in &rel.friends {
                if !theirs(other).friends.contains(&user) {
                    violations.push(InvariantViolation::AsymmetricFriendship { user, other });
                }
            }
            for &other in &rel.requests_sent {
                if !theirs(other).requests_received.contains(&user) {
                    violations.push(InvariantViolation::AsymmetricRequest {
                        sender: user,
                        recipient: other,
                    });
                }
            }
            for &other in &rel.requests_received {
                if !theirs(other).requests_sent.contains(&user) {
                    violations.push(InvariantViolation::AsymmetricRequest {
                        sender: other,
                        recipient: user,
                    });
                }
            }

            let overlapping = rel
                .friends
                .intersection(&rel.requests_sent)
                .chain(rel.friends.intersection(&rel.requests_received))
                .chain(rel.requests_sent.intersection(&rel.requests_received));
            for &other in overlapping {
                violations.push(InvariantViolation::OverlappingStates { user, other });
            }
        }

        violations
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let email = normalize_email(&new_user.email);
        let mut inner = self.inner.lock();

        if inner.users.values().any(|u| u.email == email) {
            return Err(AppError::UserAlreadyExists);
        }

        let user = User {
            id: generate_id(),
            name: new_user.name.trim().to_string(),
            email,
            password_hash: new_user.password_hash,
            profile_picture: Some(DEFAULT_PROFILE_PICTURE.to_string()),
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        inner.relations.insert(user.id, UserRelations::default());

        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self.inner.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = normalize_email(email);
        Ok(self
            .inner
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn search(
        &self,
        query: &str,
        exclude: UserId,
        limit: usize,
    ) -> Result<Vec<UserSummary>, AppError> {
        let needle = query.to_lowercase();
        let inner = self.inner.lock();

        let mut found: Vec<UserSummary> = inner
            .users
            .values()
            .filter(|u| u.id != exclude && u.name.to_lowercase().contains(&needle))
            .map(UserSummary::from)
            .collect();
        found.sort_by(by_name);
        found.truncate(limit);

        Ok(found)
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn pair_state(&self, a: UserId, b: UserId) -> Result<PairState, AppError> {
        Ok(self.inner.lock().relations(a).state_with(a, b))
    }

    async fn apply(
        &self,
        actor: UserId,
        other: UserId,
        action: FriendAction,
    ) -> Result<PairState, AppError> {
        relationships::ensure_distinct(actor, other)?;

        let mut inner = self.inner.lock();
        for id in [actor, other] {
            if !inner.users.contains_key(&id) {
                return Err(RelationshipError::UserNotFound(id).into());
            }
        }

        let current = inner.relations(actor).state_with(actor, other);
        let next = relationships::transition(action, actor, other, current)?;

        // Rewrite the pair from scratch on both sides so no stale marker survives.
        let mut mine = inner.relations(actor);
        let mut theirs = inner.relations(other);
        mine.forget(other);
        theirs.forget(actor);

        match next {
            PairState::None => {}
            PairState::Pending { from } if from == actor => {
                mine.requests_sent.insert(other);
                theirs.requests_received.insert(actor);
            }
            PairState::Pending { .. } => {
                mine.requests_received.insert(other);
                theirs.requests_sent.insert(actor);
            }
            PairState::Friends => {
                mine.friends.insert(other);
                theirs.friends.insert(actor);
            }
        }

        inner.relations.insert(actor, mine);
        inner.relations.insert(other, theirs);

        Ok(next)
    }

    async fn friends_of(&self, user: UserId) -> Result<Vec<UserSummary>, AppError> {
        let inner = self.inner.lock();
        Ok(inner.summaries(&inner.relations(user).friends))
    }

    async fn requests_received(&self, user: UserId) -> Result<Vec<UserSummary>, AppError> {
        let inner = self.inner.lock();
        Ok(inner.summaries(&inner.relations(user).requests_received))
    }

    async fn requests_sent(&self, user: UserId) -> Result<Vec<UserSummary>, AppError> {
        let inner = self.inner.lock();
        Ok(inner.summaries(&inner.relations(user).requests_sent))
    }

    async fn friends_count(&self, user: UserId) -> Result<usize, AppError> {
        Ok(self.inner.lock().relations(user).friends.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::RelationshipStatus;

    async fn user(store: &MemoryStore, name: &str) -> UserId {
        store
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: "not-a-real-hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    async fn status(store: &MemoryStore, viewer: UserId, other: UserId) -> RelationshipStatus {
        let state = store.pair_state(viewer, other).await.unwrap();
        relationships::status_between(viewer, other, state)
    }

    #[tokio::test]
    async fn request_accept_remove_scenario() {
        let store = MemoryStore::new();
        let u1 = user(&store, "Ana").await;
        let u2 = user(&store, "Bruno").await;

        store.apply(u1, u2, FriendAction::SendRequest).await.unwrap();
        assert!(store.relations_of(u2).requests_received.contains(&u1));
        assert_eq!(status(&store, u1, u2).await, RelationshipStatus::RequestSent);
        assert_eq!(status(&store, u2, u1).await, RelationshipStatus::RequestReceived);

        store.apply(u2, u1, FriendAction::Accept).await.unwrap();
        let (r1, r2) = (store.relations_of(u1), store.relations_of(u2));
        assert!(r1.friends.contains(&u2) && r2.friends.contains(&u1));
        assert!(r1.requests_sent.is_empty() && r1.requests_received.is_empty());
        assert!(r2.requests_sent.is_empty() && r2.requests_received.is_empty());

        store.apply(u1, u2, FriendAction::Remove).await.unwrap();
        assert!(store.relations_of(u1).friends.is_empty());
        assert!(store.relations_of(u2).friends.is_empty());
        assert!(store.invariant_violations().is_empty());
    }

    #[tokio::test]
    async fn reject_clears_both_sides() {
        let store = MemoryStore::new();
        let a = user(&store, "Ana").await;
        let b = user(&store, "Bruno").await;

        store.apply(a, b, FriendAction::SendRequest).await.unwrap();
        store.apply(b, a, FriendAction::Reject).await.unwrap();

        assert_eq!(store.relations_of(a), UserRelations::default());
        assert_eq!(store.relations_of(b), UserRelations::default());
        assert_eq!(status(&store, a, b).await, RelationshipStatus::None);
    }

    #[tokio::test]
    async fn duplicate_request_leaves_state_unchanged() {
        let store = MemoryStore::new();
        let a = user(&store, "Ana").await;
        let b = user(&store, "Bruno").await;

        store.apply(a, b, FriendAction::SendRequest).await.unwrap();
        let before = (store.relations_of(a), store.relations_of(b));

        let err = store
            .apply(a, b, FriendAction::SendRequest)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Relationship(RelationshipError::RequestAlreadySent)
        ));
        assert_eq!(before, (store.relations_of(a), store.relations_of(b)));

        let err = store
            .apply(b, a, FriendAction::SendRequest)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Relationship(RelationshipError::RequestAlreadyReceived)
        ));
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let store = MemoryStore::new();
        let a = user(&store, "Ana").await;

        let err = store
            .apply(a, 424242, FriendAction::SendRequest)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Relationship(RelationshipError::UserNotFound(424242))
        ));
        assert_eq!(store.relations_of(a), UserRelations::default());
    }

    #[tokio::test]
    async fn self_request_never_mutates() {
        let store = MemoryStore::new();
        let a = user(&store, "Ana").await;

        let err = store
            .apply(a, a, FriendAction::SendRequest)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Relationship(RelationshipError::SelfRelationship)
        ));
        assert_eq!(store.relations_of(a), UserRelations::default());
    }

    #[tokio::test]
    async fn lists_are_sorted_by_name() {
        let store = MemoryStore::new();
        let me = user(&store, "Me").await;
        let zed = user(&store, "Zed").await;
        let amy = user(&store, "Amy").await;

        store.apply(zed, me, FriendAction::SendRequest).await.unwrap();
        store.apply(amy, me, FriendAction::SendRequest).await.unwrap();

        let names: Vec<String> = store
            .requests_received(me)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Amy", "Zed"]);
        assert_eq!(store.requests_sent(amy).await.unwrap()[0].id, me);
    }

    #[tokio::test]
    async fn lists_ignore_name_case() {
        let store = MemoryStore::new();
        let me = user(&store, "Me").await;
        for name in ["Zed", "amy", "Bob", "bea"] {
            let id = user(&store, name).await;
            store.apply(id, me, FriendAction::SendRequest).await.unwrap();
        }

        let names: Vec<String> = store
            .requests_received(me)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["amy", "bea", "Bob", "Zed"]);

        let found: Vec<String> = store
            .search("b", me, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(found, ["bea", "Bob"]);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        user(&store, "Ana").await;

        let err = store
            .create_user(NewUser {
                name: "Other Ana".to_string(),
                email: "  ANA@example.com ".to_string(),
                password_hash: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn search_excludes_caller_and_limits() {
        let store = MemoryStore::new();
        let me = user(&store, "Maria Eduarda").await;
        for i in 0..12 {
            user(&store, &format!("Maria {i:02}")).await;
        }

        let found = store.search("maria", me, 10).await.unwrap();
        assert_eq!(found.len(), 10);
        assert!(found.iter().all(|s| s.id != me));
        assert_eq!(found[0].name, "Maria 00");
    }

    #[test]
    fn audit_reports_one_sided_friendship() {
        let store = MemoryStore::new();
        {
            let mut inner = store.inner.lock();
            let mut rel = UserRelations::default();
            rel.friends.insert(2);
            inner.relations.insert(1, rel);
            inner.relations.insert(2, UserRelations::default());
        }

        let violations = store.invariant_violations();
        assert!(violations.contains(&InvariantViolation::AsymmetricFriendship { user: 1, other: 2 }));
    }
}
