use std::fmt::Formatter;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

use crate::relationships::{ErrorKind, RelationshipError};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ErrorDetails {
    pub code: i64,
    pub message: String,
    pub details: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResponseError {
    pub error: ErrorDetails,
}

#[derive(Debug, Error)]
pub enum Resource {
    User,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Wrong credentials were provided.")]
    WrongCredentials,
    #[error("Token creation failed.")]
    TokenCreation,
    #[error("Invalid access token provided.")]
    InvalidToken,
    #[error("Expired token provided.")]
    ExpiredToken,
    #[error("Couldn't find resource: {0}.")]
    ResourceNotFound(Resource),
    #[error("User with this email already exists.")]
    UserAlreadyExists,
    #[error("Invalid user id: {0}.")]
    InvalidUserId(String),
    #[error("Search query must have at least {0} characters.")]
    SearchQueryTooShort(usize),
    #[error("{0}")]
    Relationship(#[from] RelationshipError),
    #[error("Database error: {0}.")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Password hashing failed.")]
    PasswordHashingFailed(#[from] argon2::password_hash::Error),
    #[error("Invalid JSON body: {0}.")]
    JsonRejection(#[from] JsonRejection),
    #[error("Invalid query parameters: {0}.")]
    QueryRejection(#[from] QueryRejection),
    #[error("Invalid path parameters: {0}.")]
    PathRejection(#[from] PathRejection),
    #[error("Invalid body: {0}.")]
    InvalidJson(#[from] ValidationErrors),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::WrongCredentials | AppError::InvalidToken | AppError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UserAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidUserId(_)
            | AppError::SearchQueryTooShort(_)
            | AppError::InvalidJson(_)
            | AppError::QueryRejection(_)
            | AppError::PathRejection(_) => StatusCode::BAD_REQUEST,
            AppError::Relationship(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidOperation => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
            },
            AppError::JsonRejection(e) => match e {
                JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                JsonRejection::JsonDataError(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::TokenCreation
            | AppError::DatabaseError(_)
            | AppError::PasswordHashingFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (client_message, internal_details) = match &self {
            AppError::WrongCredentials => (
                "Email or password is incorrect.".to_string(),
                self.to_string(),
            ),
            AppError::InvalidToken => (
                "Authentication token is invalid.".to_string(),
                self.to_string(),
            ),
            AppError::ExpiredToken => (
                "Authentication token has expired.".to_string(),
                self.to_string(),
            ),
            AppError::TokenCreation => (
                "Failed to create authentication token.".to_string(),
                self.to_string(),
            ),
            AppError::ResourceNotFound(res) => (
                "Resource not found.".to_string(),
                format!("Resource {} wasn't found.", res),
            ),
            AppError::UserAlreadyExists => (
                "User with this email already exists.".to_string(),
                self.to_string(),
            ),
            AppError::InvalidUserId(_) => ("Invalid user id.".to_string(), self.to_string()),
            AppError::SearchQueryTooShort(_) => (self.to_string(), self.to_string()),
            // Relationship messages are written for the end user already.
            AppError::Relationship(e) => (e.to_string(), format!("{:?}", e)),
            AppError::DatabaseError(e) => (
                "Something went wrong. Please try again later.".to_string(),
                format!("Database error: {}", e),
            ),
            AppError::PasswordHashingFailed(e) => (
                "Something went wrong. Please try again later.".to_string(),
                format!("Password hashing error: {}", e),
            ),
            AppError::InvalidJson(e) => (
                "Invalid form body.".to_string(),
                format!("Invalid body provided (validation): {}.", e),
            ),

            // Extractor Rejection Mappings
            AppError::JsonRejection(e) => {
                let message = match e {
                    JsonRejection::MissingJsonContentType(_) => {
                        "Content-Type header must be application/json."
                    }
                    JsonRejection::JsonSyntaxError(_) => "Malformed JSON in request body.",
                    JsonRejection::JsonDataError(_) => {
                        "Request body is valid JSON but has incorrect fields."
                    }
                    _ => "Invalid JSON request.",
                };
                (message.to_string(), e.to_string())
            }
            AppError::QueryRejection(e) => {
                ("Invalid query parameters.".to_string(), e.to_string())
            }
            AppError::PathRejection(e) => ("Invalid path parameters.".to_string(), e.to_string()),
        };

        if status.is_server_error() {
            tracing::error!("{}", internal_details);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", internal_details);
        }

        let error_body = Json(ResponseError {
            error: ErrorDetails {
                code: status.as_u16() as i64,
                message: client_message,
                details: internal_details,
            },
        });

        (status, error_body).into_response()
    }
}
