use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role names stored in `users.role`.
pub mod roles {
    pub const USER: &str = "user";
    pub const ADMIN: &str = "admin";
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Public view of an account from the `users` table. The password hash lives only on
/// [`UserRecord`] and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    // 'user' or 'admin'.
    pub role: String,
}

/// UserRecord
///
/// Full `users` row, including the argon2 hash. Only the identity handlers read it.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub password_hash: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            role: record.role,
        }
    }
}

/// Insert payload for a new account. The hash is computed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

/// News
///
/// A news item from the `news` table. News items have no owner and are never edited
/// through the public API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct News {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Publication date, fixed at creation.
    #[ts(type = "string")]
    pub date: NaiveDate,
}

/// Comment
///
/// A row from the `comments` table, augmented with the author's username (a join).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub author_id: Uuid,
    pub text: String,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
    // Loaded via a JOIN in the repository query.
    #[sqlx(default)]
    pub author_username: Option<String>,
}

/// Note
///
/// A private note from the `notes` table, addressed by its unique slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub author_id: Uuid,
}

/// Insert/update payload for a note once its slug has been assigned.
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub slug: String,
}

/// --- Request Payloads (Input Schemas) ---
///
/// Absent fields deserialize as empty so the handlers report them as field errors.

/// CommentForm
///
/// Input payload for posting or editing a comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CommentForm {
    pub text: String,
}

/// NoteForm
///
/// Input payload for creating or editing a note. An absent or blank `slug` is derived
/// from the title.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct NoteForm {
    pub title: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// CreateNewsRequest
///
/// Admin payload for publishing a news item. `date` defaults to today (UTC).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct CreateNewsRequest {
    pub title: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub date: Option<NaiveDate>,
}

/// SignupRequest
///
/// Input payload for account creation (POST /auth/signup).
/// The password is hashed before it reaches the repository and is never logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// LoginRequest
///
/// Input payload for POST /auth/login. `next` carries the destination the requester
/// was redirected away from.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// --- Response Schemas (Output) ---

/// TokenResponse
///
/// Bearer token issued on login, plus the sanitized post-login destination.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub next: Option<String>,
}

/// FormDescriptor
///
/// Describes a form a client should render: where to submit it and which fields it takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FormDescriptor {
    pub action: String,
    pub method: String,
    pub fields: Vec<String>,
}

impl FormDescriptor {
    pub fn post(action: impl Into<String>, fields: &[&str]) -> Self {
        Self::with_method("POST", action, fields)
    }

    /// Edit forms submit with PUT to the entity's own route.
    pub fn put(action: impl Into<String>, fields: &[&str]) -> Self {
        Self::with_method("PUT", action, fields)
    }

    fn with_method(method: &str, action: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            action: action.into(),
            method: method.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// NewsDetail
///
/// A news item with its comment thread. `comment_form` is only present for
/// authenticated requesters.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NewsDetail {
    pub news: News,
    /// Oldest first.
    pub comments: Vec<Comment>,
    pub comment_form: Option<FormDescriptor>,
}

/// CommentEditPage
///
/// GET /comments/{id}: the comment and its edit form. Owner only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentEditPage {
    pub comment: Comment,
    pub form: FormDescriptor,
}

/// NoteEditPage
///
/// GET /edit/{slug}: the note and its edit form. Owner only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NoteEditPage {
    pub note: Note,
    pub form: FormDescriptor,
}

/// LoginPage
///
/// GET /auth/login: the login form and the echoed `next` destination.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginPage {
    pub form: FormDescriptor,
    pub next: Option<String>,
}

/// AdminDashboardStats
///
/// Output schema for the administrative statistics dashboard (GET /admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_users: i64,
    pub total_news: i64,
    pub total_comments: i64,
    pub total_notes: i64,
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
