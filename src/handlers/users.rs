use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::{
    auth::AuthorizedUser,
    errors::{AppError, Resource},
    extractors::{UserIdPath, ValidatedQuery},
    state::AppState,
    store::SEARCH_LIMIT,
    types::{PublicProfile, PublicUser, UserStats, UserSummary},
};

pub const MIN_SEARCH_LENGTH: usize = 2;

#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(max = 100, message = "Must be at most 100 characters."))]
    pub q: Option<String>,
}

pub async fn search_users(
    State(state): State<AppState>,
    user: AuthorizedUser,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    let query = params.q.as_deref().unwrap_or_default().trim();
    if query.chars().count() < MIN_SEARCH_LENGTH {
        return Err(AppError::SearchQueryTooShort(MIN_SEARCH_LENGTH));
    }

    let found = state.users.search(query, user.id, SEARCH_LIMIT).await?;

    Ok(Json(found))
}

pub async fn get_profile(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> Result<Json<PublicProfile>, AppError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::ResourceNotFound(Resource::User))?;
    let friends = state.relationships.friends_of(user_id).await?;

    Ok(Json(PublicProfile {
        user: PublicUser::from(user),
        friends_count: friends.len(),
        friends,
    }))
}

pub async fn get_stats(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> Result<Json<UserStats>, AppError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::ResourceNotFound(Resource::User))?;

    Ok(Json(UserStats {
        friends_count: state.relationships.friends_count(user_id).await?,
        member_since: user.created_at,
    }))
}
