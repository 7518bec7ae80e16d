/// Video project endpoints
///
/// ```text
/// GET    /video-projects       -> { projects }
/// POST   /video-projects       -> 201 { project }
/// GET    /video-projects/:id   -> { project }
/// PUT    /video-projects/:id   -> { project }
/// DELETE /video-projects/:id   -> { success }  (checklist items go too)
/// ```
///
/// Creation never waits on concept generation; clients trigger that through
/// `POST /video-projects/generate-concept`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, JsonBody},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use studioplan_shared::auth::AuthContext;
use studioplan_shared::models::envelopes::{DeleteResponse, ProjectResponse, ProjectsResponse};
use studioplan_shared::models::patch::is_blank;
use studioplan_shared::models::video_project::{
    CreateVideoProject, NewVideoProject, UpdateVideoProject,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProjectsResponse>> {
    let projects = state.store.list_video_projects(auth.user_id).await?;
    Ok(Json(ProjectsResponse { projects }))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(req): JsonBody<CreateVideoProject>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    if is_blank(&req.title) {
        return Err(ApiError::validation("Title is required"));
    }
    req.validate()?;

    let project = state
        .store
        .create_video_project(auth.user_id, NewVideoProject::from(req))
        .await?;

    info!(project_id = %project.id, user_id = %auth.user_id, "Video project created");
    Ok((StatusCode::CREATED, Json(ProjectResponse { project })))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .store
        .get_video_project(auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video project"))?;
    Ok(Json(ProjectResponse { project }))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(patch): JsonBody<UpdateVideoProject>,
) -> ApiResult<Json<ProjectResponse>> {
    if patch.title.as_deref().is_some_and(is_blank) {
        return Err(ApiError::validation("Title cannot be empty"));
    }
    patch.validate()?;

    let project = state
        .store
        .update_video_project(auth.user_id, id, patch.normalized())
        .await?
        .ok_or_else(|| ApiError::not_found("Video project"))?;
    Ok(Json(ProjectResponse { project }))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    if !state.store.delete_video_project(auth.user_id, id).await? {
        return Err(ApiError::not_found("Video project"));
    }

    info!(project_id = %id, user_id = %auth.user_id, "Video project deleted with its checklist");
    Ok(Json(DeleteResponse::ok()))
}
