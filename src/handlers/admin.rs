use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    handlers::{FormBody, read_form},
    models::{AdminDashboardStats, CreateNewsRequest, News},
};

const NEWS_TITLE_MAX_LENGTH: usize = 200;

fn require_admin(user: &AuthUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// create_news
///
/// [Admin Route] Publishes a news item. The publication date defaults to today (UTC)
/// and is never changed afterwards.
#[utoipa::path(
    post,
    path = "/admin/news",
    request_body = CreateNewsRequest,
    responses(
        (status = 201, description = "Published", body = News),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_news(
    user: AuthUser,
    State(state): State<AppState>,
    body: FormBody<CreateNewsRequest>,
) -> AppResult<(StatusCode, Json<News>)> {
    require_admin(&user)?;
    let payload = read_form(body)?;

    let title = payload.title.trim();
    if title.is_empty() || title.chars().count() > NEWS_TITLE_MAX_LENGTH {
        return Err(AppError::validation(
            "title",
            format!("Title must be 1 to {} characters.", NEWS_TITLE_MAX_LENGTH),
        ));
    }
    if payload.text.trim().is_empty() {
        return Err(AppError::validation("text", "This field is required."));
    }

    let date = payload.date.unwrap_or_else(|| Utc::now().date_naive());
    let news = state
        .repo
        .create_news(title.to_string(), payload.text.trim().to_string(), date)
        .await?;

    tracing::info!(news_id = news.id, %date, "news published");
    Ok((StatusCode::CREATED, Json(news)))
}

/// get_admin_stats
///
/// [Admin Route] Entity counters for the dashboard.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "Stats", body = AdminDashboardStats),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_admin_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<AdminDashboardStats>> {
    require_admin(&user)?;
    Ok(Json(state.repo.get_stats().await?))
}
