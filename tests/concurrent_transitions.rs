//! Competing transitions on one pair must serialize: exactly one of them
//! wins and both sides of the pair stay in step.

use std::sync::Arc;

use kinship::{
    errors::AppError,
    models::NewUser,
    relationships::{FriendAction, PairState, RelationshipError},
    store::{MemoryStore, RelationshipStore, UserStore},
};

const ROUNDS: usize = 200;

async fn user(store: &MemoryStore, round: usize, name: &str) -> i64 {
    store
        .create_user(NewUser {
            name: name.to_string(),
            email: format!("{}.{round}@example.com", name.to_lowercase()),
            password_hash: "unused".to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn race(
    store: &Arc<MemoryStore>,
    moves: Vec<(i64, i64, FriendAction)>,
) -> Vec<Result<PairState, AppError>> {
    let handles: Vec<_> = moves
        .into_iter()
        .map(|(actor, other, action)| {
            let store = store.clone();
            tokio::spawn(async move { store.apply(actor, other, action).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn accept_and_reject_race_on_one_request() {
    let store = Arc::new(MemoryStore::new());

    for round in 0..ROUNDS {
        let a = user(&store, round, "Ana").await;
        let b = user(&store, round, "Bruno").await;
        store.apply(a, b, FriendAction::SendRequest).await.unwrap();

        let results = race(
            &store,
            vec![
                (b, a, FriendAction::Accept),
                (b, a, FriendAction::Reject),
                (b, a, FriendAction::Accept),
            ],
        )
        .await;

        let winners: Vec<&PairState> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1, "round {round}: {results:?}");
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                matches!(
                    err,
                    AppError::Relationship(RelationshipError::NoPendingRequest)
                ),
                "round {round}: {err:?}"
            );
        }

        let settled = store.pair_state(a, b).await.unwrap();
        assert_eq!(&settled, winners[0]);
        assert_eq!(settled, store.pair_state(b, a).await.unwrap());
    }

    assert!(store.invariant_violations().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crossing_requests_leave_one_pending() {
    let store = Arc::new(MemoryStore::new());

    for round in 0..ROUNDS {
        let a = user(&store, round, "Ana").await;
        let b = user(&store, round, "Bruno").await;

        let results = race(
            &store,
            vec![
                (a, b, FriendAction::SendRequest),
                (b, a, FriendAction::SendRequest),
            ],
        )
        .await;

        assert_eq!(
            results.iter().filter(|r| r.is_ok()).count(),
            1,
            "round {round}: {results:?}"
        );
        assert!(matches!(
            store.pair_state(a, b).await.unwrap(),
            PairState::Pending { .. }
        ));
    }

    assert!(store.invariant_violations().is_empty());
}
