#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use kinship::{
    auth::{Keys, issue_access_token},
    models::NewUser,
    state::AppState,
    store::{MemoryStore, UserStore},
};
use serde_json::Value;
use tower::ServiceExt;

pub const TOKEN_TTL_SECONDS: i64 = 900;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), Keys::new(b"test-secret"), TOKEN_TTL_SECONDS);
        let router = kinship::app(state.clone());

        Self {
            router,
            store,
            state,
        }
    }

    /// Inserts a user straight into the store and signs a token for it,
    /// skipping the password hash the register route would compute.
    pub async fn user(&self, name: &str) -> TestUser {
        let user = self
            .store
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();
        let (token, _) = issue_access_token(&self.state.keys, user.id, TOKEN_TTL_SECONDS).unwrap();

        TestUser { id: user.id, token }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, value)
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(&user.token), None).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(&user.token), None).await
    }

    pub async fn status_between(&self, viewer: &TestUser, other: &TestUser) -> String {
        let (code, body) = self
            .get(&format!("/friends/status/{}", other.id), viewer)
            .await;
        assert_eq!(code, StatusCode::OK, "{body}");
        body["status"].as_str().unwrap().to_string()
    }
}

/// Ids in a summary list, in response order.
pub fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().parse().unwrap())
        .collect()
}
