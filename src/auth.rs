use std::convert::Infallible;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::SaltString,
};
use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::{AppError, AppResult},
    models::roles,
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the bearer tokens issued by `POST /auth/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// Expiration time (seconds since the epoch).
    pub exp: usize,
    /// Issued at.
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    /// 'user' or 'admin'.
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == roles::ADMIN
    }
}

/// Requester
///
/// Who is making a request on a route that is open to everyone.
#[derive(Debug, Clone, PartialEq)]
pub enum Requester {
    Anonymous,
    User(AuthUser),
}

impl Requester {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Requester::User(user) => Some(user),
            Requester::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

/// Path and query the client originally asked for, before any `nest` stripped a prefix.
fn requested_path(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

/// AuthUser Extractor Implementation
///
/// Resolution order:
/// 1. `Env::Local` only: an `x-user-id` header naming an existing user.
/// 2. `Authorization: Bearer <jwt>` signed with the configured secret, whose subject
///    still exists.
///
/// Rejection: `AppError::Unauthenticated`, i.e. a redirect to the login entry point
/// that remembers the requested path.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);
        let unauthenticated = || AppError::Unauthenticated {
            login_url: config.login_url.clone(),
            next: requested_path(parts),
        };

        // Local development bypass.
        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| Uuid::parse_str(raw).ok());
            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.get_user(user_id).await? {
                    return Ok(AuthUser {
                        id: user.id,
                        role: user.role,
                    });
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(unauthenticated)?;

        let claims = decode_token(token, &config).map_err(|e| {
            tracing::debug!("rejected bearer token: {}", e);
            unauthenticated()
        })?;

        // The account may have been removed after the token was issued.
        let user = repo
            .get_user(claims.sub)
            .await?
            .ok_or_else(unauthenticated)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}

/// Requester Extractor Implementation
///
/// Never rejects: anything that would fail `AuthUser` resolves to `Anonymous`.
impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(Requester::User(user)),
            Err(AppError::Unauthenticated { .. }) => Ok(Requester::Anonymous),
            Err(e) => {
                tracing::warn!("identity lookup failed, treating requester as anonymous: {}", e);
                Ok(Requester::Anonymous)
            }
        }
    }
}

/// Signs a token for `user_id` valid for `config.token_ttl_secs`.
pub fn issue_token(user_id: Uuid, config: &AppConfig) -> AppResult<String> {
    let now = chrono::Utc::now().timestamp().max(0) as usize;
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now.saturating_add(usize::try_from(config.token_ttl_secs).unwrap_or(usize::MAX)),
    };
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

pub fn decode_token(token: &str, config: &AppConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<Claims>(token, &key, &validation).map(|data| data.claims)
}

/// Argon2id hash in PHC string format.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::Internal("failed to hash password".to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<()> {
    let parsed = PasswordHash::new(hash).map_err(|_| AppError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AppError::InvalidCredentials)
}

/// safe_next
///
/// Keeps a post-login destination only if it stays on this site: a path starting
/// with a single `/`.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    next.map(str::trim)
        .filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
        .map(str::to_string)
}
