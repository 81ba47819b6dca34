use crate::{AppState, handlers::admin};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Routes for users with the 'admin' role, nested under `/admin`. Authentication is
/// enforced by the layer in `create_router`; the role check sits in each handler
/// and answers 403 to everyone else.
///
/// Admins may also force-delete comments and notes through the regular owner
/// routes, see `ownership::authorize_delete`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /admin/news
        // Publishes a news item. News is read-only everywhere else.
        .route("/news", post(admin::create_news))
        // GET /admin/stats
        // Counts of users, news, comments and notes.
        .route("/stats", get(admin::get_admin_stats))
}
