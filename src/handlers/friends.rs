use axum::{Json, extract::State};

use crate::{
    auth::AuthorizedUser,
    errors::AppError,
    extractors::UserIdPath,
    relationships::{self, FriendAction, RelationshipError},
    state::AppState,
    types::{FriendActionResponse, StatusResponse, UserSummary},
};

async fn act(
    state: &AppState,
    user: &AuthorizedUser,
    other: i64,
    action: FriendAction,
    message: &str,
) -> Result<Json<FriendActionResponse>, AppError> {
    let next = state.relationships.apply(user.id, other, action).await?;

    tracing::info!(
        actor = user.id,
        actor_name = %user.name,
        other,
        action = action.as_str(),
        state = ?next,
        "relationship updated"
    );

    Ok(Json(FriendActionResponse {
        message: message.to_string(),
        status: next.status_for(user.id),
    }))
}

pub async fn send_request(
    State(state): State<AppState>,
    user: AuthorizedUser,
    UserIdPath(target_id): UserIdPath,
) -> Result<Json<FriendActionResponse>, AppError> {
    act(
        &state,
        &user,
        target_id,
        FriendAction::SendRequest,
        "Friend request sent.",
    )
    .await
}

pub async fn accept_request(
    State(state): State<AppState>,
    user: AuthorizedUser,
    UserIdPath(sender_id): UserIdPath,
) -> Result<Json<FriendActionResponse>, AppError> {
    act(&state, &user, sender_id, FriendAction::Accept, "Friend added.").await
}

pub async fn reject_request(
    State(state): State<AppState>,
    user: AuthorizedUser,
    UserIdPath(sender_id): UserIdPath,
) -> Result<Json<FriendActionResponse>, AppError> {
    act(
        &state,
        &user,
        sender_id,
        FriendAction::Reject,
        "Friend request rejected.",
    )
    .await
}

pub async fn remove_friend(
    State(state): State<AppState>,
    user: AuthorizedUser,
    UserIdPath(friend_id): UserIdPath,
) -> Result<Json<FriendActionResponse>, AppError> {
    act(
        &state,
        &user,
        friend_id,
        FriendAction::Remove,
        "Friendship removed.",
    )
    .await
}

pub async fn list_friends(
    State(state): State<AppState>,
    user: AuthorizedUser,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(state.relationships.friends_of(user.id).await?))
}

pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthorizedUser,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(state.relationships.requests_received(user.id).await?))
}

pub async fn list_sent_requests(
    State(state): State<AppState>,
    user: AuthorizedUser,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    Ok(Json(state.relationships.requests_sent(user.id).await?))
}

pub async fn relationship_status(
    State(state): State<AppState>,
    user: AuthorizedUser,
    UserIdPath(other_id): UserIdPath,
) -> Result<Json<StatusResponse>, AppError> {
    if other_id != user.id && state.users.find_by_id(other_id).await?.is_none() {
        return Err(RelationshipError::UserNotFound(other_id).into());
    }

    let pair = state.relationships.pair_state(user.id, other_id).await?;

    Ok(Json(StatusResponse {
        status: relationships::status_between(user.id, other_id, pair),
    }))
}
