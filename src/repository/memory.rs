use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository};
use crate::{
    models::{AdminDashboardStats, Comment, News, NewUser, Note, NoteDraft, User, UserRecord},
    policy::ordering,
};

#[derive(Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    news: Vec<News>,
    comments: Vec<Comment>,
    notes: Vec<Note>,
    last_news_id: i64,
    last_comment_id: i64,
    last_note_id: i64,
}

impl MemoryState {
    fn username_of(&self, id: Uuid) -> Option<String> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.clone())
    }

    // Fills in the joined username the way the SQL backend does.
    fn joined(&self, comment: &Comment) -> Comment {
        Comment {
            author_username: self.username_of(comment.author_id),
            ..comment.clone()
        }
    }

    fn slug_taken(&self, slug: &str, excluding: Option<i64>) -> bool {
        self.notes
            .iter()
            .any(|n| n.slug == slug && Some(n.id) != excluding)
    }
}

/// InMemoryRepository
///
/// A process-local implementation of `Repository` that mirrors the constraints of the
/// Postgres schema (unique usernames and slugs, owner-scoped writes, foreign keys).
/// Used by the test suites and by local runs without `DATABASE_URL`.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// add_comment_at
    ///
    /// Inserts a comment with an explicit creation timestamp, for seeding threads whose
    /// order is known in advance.
    pub async fn add_comment_at(
        &self,
        news_id: i64,
        author_id: Uuid,
        text: impl Into<String>,
        created: DateTime<Utc>,
    ) -> RepoResult<Comment> {
        let mut state = self.state.write().await;
        if !state.news.iter().any(|n| n.id == news_id) {
            return Err(RepoError::NotFound);
        }
        if !state.users.iter().any(|u| u.id == author_id) {
            return Err(RepoError::NotFound);
        }
        state.last_comment_id += 1;
        let comment = Comment {
            id: state.last_comment_id,
            news_id,
            author_id,
            text: text.into(),
            created,
            author_username: None,
        };
        state.comments.push(comment.clone());
        Ok(state.joined(&comment))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .map(User::from))
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::DuplicateUsername(user.username));
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            role: user.role,
            password_hash: user.password_hash,
        };
        state.users.push(record.clone());
        Ok(record.into())
    }

    async fn list_news(&self, limit: usize) -> RepoResult<Vec<News>> {
        let state = self.state.read().await;
        Ok(ordering::news_page(state.news.clone(), limit))
    }

    async fn get_news(&self, id: i64) -> RepoResult<Option<News>> {
        let state = self.state.read().await;
        Ok(state.news.iter().find(|n| n.id == id).cloned())
    }

    async fn create_news(&self, title: String, text: String, date: NaiveDate) -> RepoResult<News> {
        let mut state = self.state.write().await;
        state.last_news_id += 1;
        let news = News {
            id: state.last_news_id,
            title,
            text,
            date,
        };
        state.news.push(news.clone());
        Ok(news)
    }

    async fn get_comments(&self, news_id: i64) -> RepoResult<Vec<Comment>> {
        let state = self.state.read().await;
        let thread = state
            .comments
            .iter()
            .filter(|c| c.news_id == news_id)
            .map(|c| state.joined(c))
            .collect();
        Ok(ordering::comment_thread(thread))
    }

    async fn get_comment(&self, id: i64) -> RepoResult<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .find(|c| c.id == id)
            .map(|c| state.joined(c)))
    }

    async fn add_comment(&self, news_id: i64, author_id: Uuid, text: String) -> RepoResult<Comment> {
        self.add_comment_at(news_id, author_id, text, Utc::now()).await
    }

    async fn update_comment(&self, id: i64, author_id: Uuid, text: String) -> RepoResult<Option<Comment>> {
        let mut state = self.state.write().await;
        let Some(comment) = state
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.author_id == author_id)
        else {
            return Ok(None);
        };
        comment.text = text;
        let updated = comment.clone();
        Ok(Some(state.joined(&updated)))
    }

    async fn delete_comment(&self, id: i64, author_id: Uuid) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state
            .comments
            .retain(|c| !(c.id == id && c.author_id == author_id));
        Ok(state.comments.len() < before)
    }

    async fn delete_comment_admin(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        Ok(state.comments.len() < before)
    }

    async fn get_notes_by_author(&self, author_id: Uuid) -> RepoResult<Vec<Note>> {
        let state = self.state.read().await;
        Ok(state
            .notes
            .iter()
            .filter(|n| n.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn get_note_by_slug(&self, slug: &str) -> RepoResult<Option<Note>> {
        let state = self.state.read().await;
        Ok(state.notes.iter().find(|n| n.slug == slug).cloned())
    }

    async fn slug_taken(&self, slug: &str, excluding: Option<i64>) -> RepoResult<bool> {
        let state = self.state.read().await;
        Ok(state.slug_taken(slug, excluding))
    }

    async fn create_note(&self, author_id: Uuid, draft: NoteDraft) -> RepoResult<Note> {
        let mut state = self.state.write().await;
        if state.slug_taken(&draft.slug, None) {
            return Err(RepoError::DuplicateSlug(draft.slug));
        }
        if !state.users.iter().any(|u| u.id == author_id) {
            return Err(RepoError::NotFound);
        }
        state.last_note_id += 1;
        let note = Note {
            id: state.last_note_id,
            title: draft.title,
            text: draft.text,
            slug: draft.slug,
            author_id,
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: i64, author_id: Uuid, draft: NoteDraft) -> RepoResult<Option<Note>> {
        let mut state = self.state.write().await;
        if state.slug_taken(&draft.slug, Some(id)) {
            return Err(RepoError::DuplicateSlug(draft.slug));
        }
        let Some(note) = state
            .notes
            .iter_mut()
            .find(|n| n.id == id && n.author_id == author_id)
        else {
            return Ok(None);
        };
        note.title = draft.title;
        note.text = draft.text;
        note.slug = draft.slug;
        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, id: i64, author_id: Uuid) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        let before = state.notes.len();
        state
            .notes
            .retain(|n| !(n.id == id && n.author_id == author_id));
        Ok(state.notes.len() < before)
    }

    async fn delete_note_admin(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.state.write().await;
        let before = state.notes.len();
        state.notes.retain(|n| n.id != id);
        Ok(state.notes.len() < before)
    }

    async fn get_stats(&self) -> RepoResult<AdminDashboardStats> {
        let state = self.state.read().await;
        Ok(AdminDashboardStats {
            total_users: state.users.len() as i64,
            total_news: state.news.len() as i64,
            total_comments: state.comments.len() as i64,
            total_notes: state.notes.len() as i64,
        })
    }
}
