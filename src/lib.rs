pub mod auth;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod relationships;
pub mod state;
pub mod store;
pub mod types;

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{
        accept_request, get_profile, get_stats, list_friends, list_requests, list_sent_requests,
        login, me, register, reject_request, relationship_status, remove_friend, search_users,
        send_request,
    },
    state::AppState,
};

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/friends", get(list_friends))
        .route("/friends/requests", get(list_requests))
        .route("/friends/requests/sent", get(list_sent_requests))
        .route("/friends/status/{user_id}", get(relationship_status))
        .route("/friends/request/{target_id}", post(send_request))
        .route("/friends/accept/{sender_id}", post(accept_request))
        .route("/friends/reject/{sender_id}", post(reject_request))
        .route("/friends/remove/{friend_id}", delete(remove_friend))
        .route("/users/search", get(search_users))
        .route("/users/{user_id}", get(get_profile))
        .route("/users/{user_id}/stats", get(get_stats))
}

/// Builds the full application. Routes are served both at the root and
/// under `/api`, where the browser client expects them.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .fallback(handler_404)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
