use crate::{
    AppState,
    handlers::{comments, identity, notes},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Everything a signed-in user can do with their own content. The `auth_middleware`
/// layered on this router redirects anonymous requesters to the login entry point;
/// handlers then receive a validated `AuthUser` for the owner checks.
///
/// Owner routes answer 404 to non-owners, the same as for a missing record.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The current user's account.
        .route("/me", get(identity::get_me))
        // --- Comments ---
        // POST /news/{id}/comments
        // Adds a comment to a news item after the content filter accepts it.
        .route("/news/{id}/comments", post(comments::add_comment))
        // GET/PUT/DELETE /comments/{id}
        // Owner-only edit page, edit and delete.
        .route(
            "/comments/{id}",
            get(comments::get_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        // --- Notes ---
        // GET/POST /notes
        // The requester's notes, and note creation with slug assignment.
        .route("/notes", get(notes::list_notes).post(notes::create_note))
        // GET /add
        // Note creation form.
        .route("/add", get(notes::add_note_page))
        // GET /edit/{slug}
        // Owner-only note edit form.
        .route("/edit/{slug}", get(notes::edit_note_page))
        // GET/PUT/DELETE /notes/{slug}
        .route(
            "/notes/{slug}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        // GET /done
        // Success page after a note operation.
        .route("/done", get(notes::done))
}
