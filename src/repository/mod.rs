use crate::models::{
    AdminDashboardStats, Comment, News, NewUser, Note, NoteDraft, User, UserRecord,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// RepoError
///
/// Persistence failures the handlers care to tell apart. Unique-constraint
/// violations are surfaced as their own variants so they can become field errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,

    #[error("slug already in use: {0}")]
    DuplicateSlug(String),

    #[error("username already in use: {0}")]
    DuplicateUsername(String),

    #[error("{0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// Repository Trait
///
/// Abstract contract for all persistence operations. Handlers only see
/// `Arc<dyn Repository>`, so the Postgres and in-memory backends are interchangeable.
///
/// Owner-scoped mutations take the requester's id and only touch rows that author
/// owns; they return `None`/`false` when nothing matched.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>>;
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;

    // --- News ---
    // Newest first, at most `limit` items.
    async fn list_news(&self, limit: usize) -> RepoResult<Vec<News>>;
    async fn get_news(&self, id: i64) -> RepoResult<Option<News>>;
    async fn create_news(&self, title: String, text: String, date: NaiveDate) -> RepoResult<News>;

    // --- Comments ---
    // Oldest first.
    async fn get_comments(&self, news_id: i64) -> RepoResult<Vec<Comment>>;
    async fn get_comment(&self, id: i64) -> RepoResult<Option<Comment>>;
    async fn add_comment(&self, news_id: i64, author_id: Uuid, text: String) -> RepoResult<Comment>;
    async fn update_comment(&self, id: i64, author_id: Uuid, text: String) -> RepoResult<Option<Comment>>;
    async fn delete_comment(&self, id: i64, author_id: Uuid) -> RepoResult<bool>;
    /// Admin override: no ownership check.
    async fn delete_comment_admin(&self, id: i64) -> RepoResult<bool>;

    // --- Notes ---
    async fn get_notes_by_author(&self, author_id: Uuid) -> RepoResult<Vec<Note>>;
    async fn get_note_by_slug(&self, slug: &str) -> RepoResult<Option<Note>>;
    /// Whether a note other than `excluding` already uses `slug`.
    async fn slug_taken(&self, slug: &str, excluding: Option<i64>) -> RepoResult<bool>;
    async fn create_note(&self, author_id: Uuid, draft: NoteDraft) -> RepoResult<Note>;
    async fn update_note(&self, id: i64, author_id: Uuid, draft: NoteDraft) -> RepoResult<Option<Note>>;
    async fn delete_note(&self, id: i64, author_id: Uuid) -> RepoResult<bool>;
    /// Admin override: no ownership check.
    async fn delete_note_admin(&self, id: i64) -> RepoResult<bool>;

    // --- Admin ---
    async fn get_stats(&self) -> RepoResult<AdminDashboardStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
