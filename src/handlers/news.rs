use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    auth::Requester,
    error::{AppError, AppResult},
    models::{FormDescriptor, News, NewsDetail},
};

/// get_news_feed
///
/// [Public Route] The home feed: at most `NEWS_COUNT_ON_HOME_PAGE` items, newest
/// publication date first.
#[utoipa::path(
    get,
    path = "/news",
    responses((status = 200, description = "News feed", body = [News]))
)]
pub async fn get_news_feed(State(state): State<AppState>) -> AppResult<Json<Vec<News>>> {
    let news = state
        .repo
        .list_news(state.config.news_count_on_home_page)
        .await?;
    Ok(Json(news))
}

/// get_news_detail
///
/// [Public Route] A news item with its comments, oldest first. The comment form is
/// only offered to authenticated requesters.
#[utoipa::path(
    get,
    path = "/news/{id}",
    params(("id" = i64, Path, description = "News ID")),
    responses(
        (status = 200, description = "Found", body = NewsDetail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_news_detail(
    requester: Requester,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<NewsDetail>> {
    let news = state.repo.get_news(id).await?.ok_or(AppError::NotFound)?;
    let comments = state.repo.get_comments(id).await?;

    let comment_form = requester
        .is_authenticated()
        .then(|| FormDescriptor::post(format!("/news/{}/comments", id), &["text"]));

    Ok(Json(NewsDetail {
        news,
        comments,
        comment_form,
    }))
}
