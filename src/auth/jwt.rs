use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{errors::AppError, state::AppState};

pub const ACCESS_TOKEN_EXPIRATION_SECONDS: i64 = 15 * 60; // 15 minutes

pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

// --- Access Token Claims ---
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: i64,
    pub exp: usize,
    pub iat: usize,
}

/// Signs an access token for `user_id`. Returns the token and its lifetime
/// in seconds.
pub fn issue_access_token(
    keys: &Keys,
    user_id: i64,
    ttl_seconds: i64,
) -> Result<(String, usize), AppError> {
    let now = Utc::now();
    let claims = AccessTokenClaims {
        sub: user_id,
        exp: (now + chrono::Duration::seconds(ttl_seconds)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    let token = jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &keys.encoding)
        .map_err(|_| AppError::TokenCreation)?;

    Ok((token, ttl_seconds as usize))
}

// --- Extractor for Authenticated User Data ---
// The acting user of every protected route comes from here, never from the
// request path or body.
#[derive(Debug, Clone)]
pub struct AuthorizedUser {
    pub id: i64,
    pub name: String,
}

impl<S> FromRequestParts<S> for AuthorizedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::InvalidToken)?;

        // Validation::default() checks 'exp'
        let token_data = decode::<AccessTokenClaims>(
            bearer.token(),
            &app_state.keys.decoding,
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::ExpiredToken,
            _ => {
                tracing::warn!("Access token decoding failed: {:?}", e);
                AppError::InvalidToken
            }
        })?;

        // The account may have been removed after the token was issued.
        let user = app_state
            .users
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Ok(AuthorizedUser {
            id: user.id,
            name: user.name,
        })
    }
}
