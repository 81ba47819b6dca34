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
    models::{FormDescriptor, Message, Note, NoteDraft, NoteEditPage, NoteForm},
    policy::{
        ownership::{ensure_may_delete, ensure_owner},
        slug::{SLUG_MAX_LENGTH, assign_slug},
    },
};

/// Title column width; the slug column shares it.
const TITLE_MAX_LENGTH: usize = SLUG_MAX_LENGTH;

const NOTE_FIELDS: [&str; 3] = ["title", "text", "slug"];

async fn load_note(state: &AppState, slug: &str) -> AppResult<Note> {
    state
        .repo
        .get_note_by_slug(slug)
        .await?
        .ok_or(AppError::NotFound)
}

// Trimmed title and text, both required.
fn clean_note_fields(form: &NoteForm) -> AppResult<(String, String)> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title", "This field is required."));
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        return Err(AppError::validation(
            "title",
            format!("Ensure this value has at most {} characters.", TITLE_MAX_LENGTH),
        ));
    }
    let text = form.text.trim();
    if text.is_empty() {
        return Err(AppError::validation("text", "This field is required."));
    }
    Ok((title.to_string(), text.to_string()))
}

/// list_notes
///
/// [Authenticated Route] The requester's own notes. Other users' notes never appear.
#[utoipa::path(
    get,
    path = "/notes",
    responses((status = 200, description = "My Notes", body = [Note]))
)]
pub async fn list_notes(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Note>>> {
    Ok(Json(state.repo.get_notes_by_author(user.id).await?))
}

/// create_note
///
/// [Authenticated Route] Creates a note owned by the requester. Without an explicit
/// slug one is derived from the title; a slug already in use rejects the submission.
#[utoipa::path(
    post,
    path = "/notes",
    request_body = NoteForm,
    responses(
        (status = 201, description = "Created", body = Note),
        (status = 400, description = "Invalid form or duplicate slug")
    )
)]
pub async fn create_note(
    user: AuthUser,
    State(state): State<AppState>,
    body: FormBody<NoteForm>,
) -> AppResult<(StatusCode, Json<Note>)> {
    let form = read_form(body)?;
    let (title, text) = clean_note_fields(&form)?;
    let slug = assign_slug(state.repo.as_ref(), &title, form.slug.as_deref(), None).await?;

    let note = state
        .repo
        .create_note(user.id, NoteDraft { title, text, slug })
        .await?;

    tracing::info!(note_id = note.id, slug = %note.slug, author = %user.id, "note created");
    Ok((StatusCode::CREATED, Json(note)))
}

/// add_note_page
///
/// [Authenticated Route] The note creation form.
#[utoipa::path(
    get,
    path = "/add",
    responses((status = 200, description = "Note form", body = FormDescriptor))
)]
pub async fn add_note_page(_user: AuthUser) -> Json<FormDescriptor> {
    Json(FormDescriptor::post("/notes", &NOTE_FIELDS))
}

/// edit_note_page
///
/// [Owner Route] The note edit form, addressed to the note's current slug.
/// Non-owners get 404.
#[utoipa::path(
    get,
    path = "/edit/{slug}",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 200, description = "Edit form", body = NoteEditPage),
        (status = 404, description = "Not Found")
    )
)]
pub async fn edit_note_page(
    user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<NoteEditPage>> {
    let note = load_note(&state, &slug).await?;
    ensure_owner(&user, &note)?;

    let form = FormDescriptor::put(format!("/notes/{}", note.slug), &NOTE_FIELDS);
    Ok(Json(NoteEditPage { note, form }))
}

/// get_note
///
/// [Owner Route] A single note. Non-owners get 404.
#[utoipa::path(
    get,
    path = "/notes/{slug}",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 200, description = "Found", body = Note),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_note(
    user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Note>> {
    let note = load_note(&state, &slug).await?;
    ensure_owner(&user, &note)?;
    Ok(Json(note))
}

/// update_note
///
/// [Owner Route] Replaces title, text and slug. The note may keep its own slug; any
/// other note's slug is a conflict. The author never changes.
#[utoipa::path(
    put,
    path = "/notes/{slug}",
    params(("slug" = String, Path, description = "Note slug")),
    request_body = NoteForm,
    responses(
        (status = 200, description = "Updated", body = Note),
        (status = 400, description = "Invalid form or duplicate slug"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_note(
    user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    body: FormBody<NoteForm>,
) -> AppResult<Json<Note>> {
    let note = load_note(&state, &slug).await?;
    ensure_owner(&user, &note)?;

    let form = read_form(body)?;
    let (title, text) = clean_note_fields(&form)?;
    let new_slug =
        assign_slug(state.repo.as_ref(), &title, form.slug.as_deref(), Some(note.id)).await?;

    let updated = state
        .repo
        .update_note(
            note.id,
            user.id,
            NoteDraft {
                title,
                text,
                slug: new_slug,
            },
        )
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(note_id = note.id, slug = %updated.slug, "note edited");
    Ok(Json(updated))
}

/// delete_note
///
/// [Owner Route] Deletes a note. Administrators may delete any note.
#[utoipa::path(
    delete,
    path = "/notes/{slug}",
    params(("slug" = String, Path, description = "Note slug")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_note(
    user: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    let note = load_note(&state, &slug).await?;
    ensure_may_delete(&user, &note)?;

    let deleted = if user.is_admin() {
        state.repo.delete_note_admin(note.id).await?
    } else {
        state.repo.delete_note(note.id, user.id).await?
    };

    if deleted {
        tracing::info!(note_id = note.id, by_admin = user.is_admin(), "note deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// done
///
/// [Authenticated Route] Landing page after a successful note operation.
#[utoipa::path(
    get,
    path = "/done",
    responses((status = 200, description = "Success", body = Message))
)]
pub async fn done(_user: AuthUser) -> Json<Message> {
    Json(Message::new("Operation completed successfully."))
}
