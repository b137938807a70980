use std::sync::Arc;

use crate::{
    auth::Keys,
    store::{RelationshipStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub relationships: Arc<dyn RelationshipStore>,
    pub keys: Arc<Keys>,
    pub access_token_ttl_seconds: i64,
}

impl AppState {
    /// Wires one backend into both store seams.
    pub fn new<S>(store: Arc<S>, keys: Keys, access_token_ttl_seconds: i64) -> Self
    where
        S: UserStore + RelationshipStore + 'static,
    {
        Self {
            users: store.clone(),
            relationships: store,
            keys: Arc::new(keys),
            access_token_ttl_seconds,
        }
    }
}

