use axum::{Json, extract::State};

use crate::{
    auth::{
        AuthResponse, AuthorizedUser, LoginPayload, RegisterPayload, hash_password,
        issue_access_token, verify_password,
    },
    errors::{AppError, Resource},
    extractors::ValidatedJson,
    models::NewUser,
    state::AppState,
    types::PublicUser,
};

fn auth_response(state: &AppState, user: PublicUser) -> Result<AuthResponse, AppError> {
    let (access_token, expires_in) =
        issue_access_token(&state.keys, user.id, state.access_token_ttl_seconds)?;

    Ok(AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in,
        user,
    })
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    // Checked up front so a taken email doesn't cost a password hash.
    if state.users.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::UserAlreadyExists);
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .users
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email: payload.email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, "registered user");

    Ok(Json(auth_response(&state, PublicUser::from(user))?))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or(AppError::WrongCredentials)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::WrongCredentials);
    }

    Ok(Json(auth_response(&state, PublicUser::from(user))?))
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthorizedUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or(AppError::ResourceNotFound(Resource::User))?;

    Ok(Json(PublicUser::from(user)))
}
