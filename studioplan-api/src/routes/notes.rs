/// Note endpoints
///
/// ```text
/// GET    /notes         -> { notes }
/// POST   /notes         -> 201 { note }
/// GET    /notes/:id     -> { note }
/// PUT    /notes/:id     -> { note }
/// DELETE /notes/:id     -> { success }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, JsonBody},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use studioplan_shared::auth::AuthContext;
use studioplan_shared::models::envelopes::{DeleteResponse, NoteResponse, NotesResponse};
use studioplan_shared::models::note::{CreateNote, NewNote, UpdateNote};
use tracing::info;
use uuid::Uuid;

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<NotesResponse>> {
    let notes = state.store.list_notes(auth.user_id).await?;
    Ok(Json(NotesResponse { notes }))
}

/// Title defaults to "Untitled Note" and content to ""
pub async fn create_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(req): JsonBody<CreateNote>,
) -> ApiResult<(StatusCode, Json<NoteResponse>)> {
    let note = state
        .store
        .create_note(auth.user_id, NewNote::from(req))
        .await?;

    info!(note_id = %note.id, user_id = %auth.user_id, "Note created");
    Ok((StatusCode::CREATED, Json(NoteResponse { note })))
}

pub async fn get_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<NoteResponse>> {
    let note = state
        .store
        .get_note(auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Note"))?;
    Ok(Json(NoteResponse { note }))
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(patch): JsonBody<UpdateNote>,
) -> ApiResult<Json<NoteResponse>> {
    let note = state
        .store
        .update_note(auth.user_id, id, patch.normalized())
        .await?
        .ok_or_else(|| ApiError::not_found("Note"))?;
    Ok(Json(NoteResponse { note }))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    if !state.store.delete_note(auth.user_id, id).await? {
        return Err(ApiError::not_found("Note"));
    }

    info!(note_id = %id, user_id = %auth.user_id, "Note deleted");
    Ok(Json(DeleteResponse::ok()))
}
