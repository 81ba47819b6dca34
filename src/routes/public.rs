use crate::{
    AppState,
    handlers::{self, identity, news},
};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without credentials. News detail still looks at the requester
/// (through `Requester`) to decide whether to offer the comment form.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Service name and version.
        .route("/", get(handlers::home))
        // GET /news
        // Home feed: NEWS_COUNT_ON_HOME_PAGE items, newest date first.
        .route("/news", get(news::get_news_feed))
        // GET /news/{id}
        // One news item with its comments in chronological order.
        .route("/news/{id}", get(news::get_news_detail))
        // --- Identity ---
        // GET/POST /auth/login
        // Login form (echoing ?next=) and credential exchange for a bearer token.
        .route(
            "/auth/login",
            get(identity::login_page).post(identity::login),
        )
        // GET/POST /auth/logout
        .route(
            "/auth/logout",
            get(identity::logout).post(identity::logout),
        )
        // GET/POST /auth/signup
        .route(
            "/auth/signup",
            get(identity::signup_page).post(identity::signup),
        )
}
