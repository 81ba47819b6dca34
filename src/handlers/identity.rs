use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::{AppError, AppResult},
    handlers::{FormBody, read_form},
    models::{
        FormDescriptor, LoginPage, LoginRequest, Message, NewUser, SignupRequest, TokenResponse,
        User, roles,
    },
};

const USERNAME_MAX_LENGTH: usize = 150;
const PASSWORD_MIN_LENGTH: usize = 8;

/// NextQuery
///
/// `?next=` as appended by the login redirect.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NextQuery {
    /// Path to continue to after login.
    pub next: Option<String>,
}

fn validate_username(username: &str) -> AppResult<()> {
    let length = username.chars().count();
    if length == 0 || length > USERNAME_MAX_LENGTH {
        return Err(AppError::validation(
            "username",
            format!("Username must be 1 to {} characters.", USERNAME_MAX_LENGTH),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(AppError::validation(
            "username",
            "Username may contain only letters, digits and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

/// login_page
///
/// [Public Route] The login form, echoing the destination to resume afterwards.
#[utoipa::path(
    get,
    path = "/auth/login",
    params(NextQuery),
    responses((status = 200, description = "Login form", body = LoginPage))
)]
pub async fn login_page(Query(query): Query<NextQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        form: FormDescriptor::post("/auth/login", &["username", "password", "next"]),
        next: auth::safe_next(query.next.as_deref()),
    })
}

/// login
///
/// [Public Route] Exchanges credentials for a bearer token. Unknown users and wrong
/// passwords are reported identically.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: FormBody<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let payload = read_form(body)?;
    let record = state
        .repo
        .find_user_by_username(payload.username.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    auth::verify_password(&payload.password, &record.password_hash)?;
    let token = auth::issue_token(record.id, &state.config)?;

    tracing::info!(user_id = %record.id, "user logged in");
    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        next: auth::safe_next(payload.next.as_deref()),
    }))
}

/// logout
///
/// [Public Route] Tokens are stateless; the client discards its token.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Logged out", body = Message))
)]
pub async fn logout() -> Json<Message> {
    Json(Message::new("You have been logged out."))
}

/// signup_page
///
/// [Public Route] The registration form.
#[utoipa::path(
    get,
    path = "/auth/signup",
    responses((status = 200, description = "Signup form", body = FormDescriptor))
)]
pub async fn signup_page() -> Json<FormDescriptor> {
    Json(FormDescriptor::post("/auth/signup", &["username", "password"]))
}

/// signup
///
/// [Public Route] Creates a regular account. The password is hashed with Argon2id
/// before it reaches the repository.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Invalid form"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    body: FormBody<SignupRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let payload = read_form(body)?;
    let username = payload.username.trim().to_string();
    validate_username(&username)?;
    if payload.password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(AppError::validation(
            "password",
            format!("Password must be at least {} characters.", PASSWORD_MIN_LENGTH),
        ));
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(NewUser {
            username,
            password_hash,
            role: roles::USER.to_string(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// get_me
///
/// [Authenticated Route] The requester's account.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = User))
)]
pub async fn get_me(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<User>> {
    let profile = state
        .repo
        .get_user(user.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(profile))
}
