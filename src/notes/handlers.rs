use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

use super::dto::{CreateNoteRequest, NoteResponse};
use super::repo::Note;

const MAX_TITLE_LEN: usize = 200;

pub fn note_routes() -> Router<AppState> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/:id", delete(delete_note))
}

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn list_notes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let notes = Note::list_by_user(&state.db, user.0.user_id).await?;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.user_id))]
pub async fn create_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<NoteResponse>)> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation("Title is too long".into()));
    }
    if payload.content.trim().is_empty() {
        return Err(ApiError::Validation("Content is required".into()));
    }

    let note = Note::create(&state.db, user.0.user_id, title, &payload.content).await?;
    info!(note_id = %note.id, "note created");
    Ok((StatusCode::CREATED, Json(note.into())))
}

#[instrument(skip(state, user), fields(user_id = %user.0.user_id))]
pub async fn delete_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let deleted = Note::delete_owned(&state.db, user.0.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Note not found".into()));
    }
    info!(note_id = %id, "note deleted");
    Ok(Json(json!({ "success": true })))
}
