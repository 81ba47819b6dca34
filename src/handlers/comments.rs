use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    handlers::{FormBody, read_form},
    models::{Comment, CommentEditPage, CommentForm, FormDescriptor},
    policy::{
        moderation::clean_comment_text,
        ownership::{ensure_may_delete, ensure_owner},
    },
};

async fn load_comment(state: &AppState, id: i64) -> AppResult<Comment> {
    state.repo.get_comment(id).await?.ok_or(AppError::NotFound)
}

/// add_comment
///
/// [Authenticated Route] Posts a comment under a news item. The text goes through the
/// content filter; a rejected submission stores nothing.
#[utoipa::path(
    post,
    path = "/news/{id}/comments",
    params(("id" = i64, Path, description = "News ID")),
    request_body = CommentForm,
    responses(
        (status = 201, description = "Comment Added", body = Comment),
        (status = 400, description = "Banned words or empty text"),
        (status = 404, description = "News Not Found")
    )
)]
pub async fn add_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(news_id): Path<i64>,
    body: FormBody<CommentForm>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    state
        .repo
        .get_news(news_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let form = read_form(body)?;
    let text = clean_comment_text(&form.text)?;
    let comment = state.repo.add_comment(news_id, user.id, text).await?;

    tracing::info!(comment_id = comment.id, news_id, author = %user.id, "comment created");
    Ok((StatusCode::CREATED, Json(comment)))
}

/// get_comment
///
/// [Owner Route] The comment edit page: the comment and the form that edits it.
/// Non-owners get 404, indistinguishable from a missing comment.
#[utoipa::path(
    get,
    path = "/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Found", body = CommentEditPage),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CommentEditPage>> {
    let comment = load_comment(&state, id).await?;
    ensure_owner(&user, &comment)?;

    let form = FormDescriptor::put(format!("/comments/{}", comment.id), &["text"]);
    Ok(Json(CommentEditPage { comment, form }))
}

/// update_comment
///
/// [Owner Route] Replaces a comment's text. Ownership is checked before the content
/// filter, so a non-owner learns nothing about the comment.
#[utoipa::path(
    put,
    path = "/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    request_body = CommentForm,
    responses(
        (status = 200, description = "Updated", body = Comment),
        (status = 400, description = "Banned words or empty text"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: FormBody<CommentForm>,
) -> AppResult<Json<Comment>> {
    let comment = load_comment(&state, id).await?;
    ensure_owner(&user, &comment)?;

    let form = read_form(body)?;
    let text = clean_comment_text(&form.text)?;
    let updated = state
        .repo
        .update_comment(comment.id, user.id, text)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(comment_id = id, "comment edited");
    Ok(Json(updated))
}

/// delete_comment
///
/// [Owner Route] Deletes a comment. Administrators may delete any comment.
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let comment = load_comment(&state, id).await?;
    ensure_may_delete(&user, &comment)?;

    let deleted = if user.is_admin() {
        state.repo.delete_comment_admin(comment.id).await?
    } else {
        state.repo.delete_comment(comment.id, user.id).await?
    };

    if deleted {
        tracing::info!(comment_id = id, by_admin = user.is_admin(), "comment deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
