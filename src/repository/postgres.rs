use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository};
use crate::models::{
    AdminDashboardStats, Comment, News, NewUser, Note, NoteDraft, User, UserRecord,
};

const COMMENT_COLUMNS: &str = "c.id, c.news_id, c.author_id, c.text, c.created, u.username AS author_username";

/// PostgresRepository
///
/// The production implementation of `Repository`. Queries are checked at runtime so
/// the crate builds without a live database. Ownership and slug uniqueness are
/// enforced in SQL (`WHERE author_id = $n`, `UNIQUE (slug)`).
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations under `./migrations`.
    pub async fn migrate(&self) -> RepoResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    // `table` is always one of our own literals.
    async fn count_rows(&self, table: &'static str) -> RepoResult<i64> {
        let query = format!("SELECT COUNT(*) FROM {table}");
        let count = sqlx::query_scalar::<_, i64>(&query)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, role, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// create_user
    ///
    /// Relies on `UNIQUE (username)`; a violation becomes `DuplicateUsername`.
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, username, password_hash, role)
               VALUES ($1, $2, $3, $4)
               RETURNING id, username, role"#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::DuplicateUsername(user.username.clone())
            } else {
                tracing::error!("create_user error: {:?}", e);
                e.into()
            }
        })
    }

    /// list_news
    ///
    /// Ties on `date` fall back to insertion order (`id`).
    async fn list_news(&self, limit: usize) -> RepoResult<Vec<News>> {
        let news = sqlx::query_as::<_, News>(
            "SELECT id, title, text, date FROM news ORDER BY date DESC, id ASC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(news)
    }

    async fn get_news(&self, id: i64) -> RepoResult<Option<News>> {
        let news = sqlx::query_as::<_, News>("SELECT id, title, text, date FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(news)
    }

    async fn create_news(&self, title: String, text: String, date: NaiveDate) -> RepoResult<News> {
        let news = sqlx::query_as::<_, News>(
            "INSERT INTO news (title, text, date) VALUES ($1, $2, $3) RETURNING id, title, text, date",
        )
        .bind(title)
        .bind(text)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(news)
    }

    async fn get_comments(&self, news_id: i64) -> RepoResult<Vec<Comment>> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id \
             WHERE c.news_id = $1 ORDER BY c.created ASC, c.id ASC"
        );
        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(news_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    async fn get_comment(&self, id: i64) -> RepoResult<Option<Comment>> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id WHERE c.id = $1"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    /// add_comment
    ///
    /// Inserts and joins the author's username back in one statement.
    async fn add_comment(&self, news_id: i64, author_id: Uuid, text: String) -> RepoResult<Comment> {
        let query = format!(
            r#"WITH c AS (
                   INSERT INTO comments (news_id, author_id, text) VALUES ($1, $2, $3)
                   RETURNING id, news_id, author_id, text, created
               )
               SELECT {COMMENT_COLUMNS} FROM c JOIN users u ON u.id = c.author_id"#
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(news_id)
            .bind(author_id)
            .bind(text)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("add_comment error: {:?}", e);
                RepoError::from(e)
            })?;
        Ok(comment)
    }

    async fn update_comment(&self, id: i64, author_id: Uuid, text: String) -> RepoResult<Option<Comment>> {
        let query = format!(
            r#"WITH c AS (
                   UPDATE comments SET text = $3 WHERE id = $1 AND author_id = $2
                   RETURNING id, news_id, author_id, text, created
               )
               SELECT {COMMENT_COLUMNS} FROM c JOIN users u ON u.id = c.author_id"#
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(author_id)
            .bind(text)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64, author_id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_comment_admin(&self, id: i64) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_notes_by_author(&self, author_id: Uuid) -> RepoResult<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT id, title, text, slug, author_id FROM notes WHERE author_id = $1 ORDER BY id ASC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    async fn get_note_by_slug(&self, slug: &str) -> RepoResult<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT id, title, text, slug, author_id FROM notes WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn slug_taken(&self, slug: &str, excluding: Option<i64>) -> RepoResult<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM notes WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// create_note
    ///
    /// The `UNIQUE (slug)` constraint is the last word on uniqueness; a race past
    /// `slug_taken` still ends in `DuplicateSlug`.
    async fn create_note(&self, author_id: Uuid, draft: NoteDraft) -> RepoResult<Note> {
        sqlx::query_as::<_, Note>(
            r#"INSERT INTO notes (title, text, slug, author_id) VALUES ($1, $2, $3, $4)
               RETURNING id, title, text, slug, author_id"#,
        )
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(&draft.slug)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::DuplicateSlug(draft.slug.clone())
            } else {
                tracing::error!("create_note error: {:?}", e);
                e.into()
            }
        })
    }

    async fn update_note(&self, id: i64, author_id: Uuid, draft: NoteDraft) -> RepoResult<Option<Note>> {
        sqlx::query_as::<_, Note>(
            r#"UPDATE notes SET title = $3, text = $4, slug = $5
               WHERE id = $1 AND author_id = $2
               RETURNING id, title, text, slug, author_id"#,
        )
        .bind(id)
        .bind(author_id)
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(&draft.slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoError::DuplicateSlug(draft.slug.clone())
            } else {
                tracing::error!("update_note error: {:?}", e);
                e.into()
            }
        })
    }

    async fn delete_note(&self, id: i64, author_id: Uuid) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM notes WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_note_admin(&self, id: i64) -> RepoResult<bool> {
        let res = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_stats(&self) -> RepoResult<AdminDashboardStats> {
        Ok(AdminDashboardStats {
            total_users: self.count_rows("users").await?,
            total_news: self.count_rows("news").await?,
            total_comments: self.count_rows("comments").await?,
            total_notes: self.count_rows("notes").await?,
        })
    }
}
