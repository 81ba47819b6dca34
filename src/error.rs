use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repository::RepoError;

/// AppError
///
/// Every outcome a handler can surface besides success. All of them are local to the
/// request: nothing is retried and nothing is persisted when one is returned.
#[derive(Debug, Error)]
pub enum AppError {
    /// No identity on a route that requires one. Carries the path to resume after login.
    #[error("authentication required")]
    Unauthenticated { login_url: String, next: String },

    /// The requester does not own the entity. Rendered exactly like `NotFound`.
    #[error("not found")]
    NotOwner,

    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("{message}")]
    BannedContent { message: String },

    #[error("{message}")]
    DuplicateSlug { slug: String, message: String },

    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Status code used for this error's response.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated { .. } => StatusCode::FOUND,
            AppError::NotOwner | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::BannedContent { .. }
            | AppError::DuplicateSlug { .. }
            | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::UsernameTaken(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Form field the error belongs to, if it is a field-level error.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AppError::BannedContent { .. } => Some("text"),
            AppError::DuplicateSlug { .. } => Some("slug"),
            AppError::Validation { field, .. } => Some(*field),
            AppError::UsernameTaken(_) => Some("username"),
            _ => None,
        }
    }
}

/// Builds `<login_url>?next=<path>`, keeping `/` readable in the query value.
pub fn login_redirect_location(login_url: &str, next: &str) -> String {
    let encoded = urlencoding::encode(next).replace("%2F", "/");
    format!("{}?next={}", login_url, encoded)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::Unauthenticated { login_url, next } = &self {
            let location = login_redirect_location(login_url, next);
            return (status, [(header::LOCATION, location)]).into_response();
        }

        let message = match &self {
            AppError::Database(detail) | AppError::Internal(detail) => {
                // Internal details stay in the logs.
                tracing::error!("request failed: {}", detail);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = match self.field() {
            Some(field) => json!({
                "error": message,
                "status": status.as_u16(),
                "field": field,
            }),
            None => json!({
                "error": message,
                "status": status.as_u16(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound,
            RepoError::DuplicateSlug(slug) => crate::policy::slug::duplicate_slug(&slug),
            RepoError::DuplicateUsername(username) => AppError::UsernameTaken(username),
            RepoError::Database(detail) => AppError::Database(detail),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("token error: {}", err))
    }
}
