/// Task endpoints
///
/// ```text
/// GET    /tasks?status=todo  -> { tasks }
/// POST   /tasks              -> 201 { task }
/// GET    /tasks/:id          -> { task }
/// PUT    /tasks/:id          -> { task }
/// DELETE /tasks/:id          -> { success }
/// ```
///
/// A task needs a non-blank title on create, and a present title must stay
/// non-blank on update.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ApiQuery, JsonBody},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use studioplan_shared::auth::AuthContext;
use studioplan_shared::models::envelopes::{
    DeleteResponse, TaskFilter, TaskResponse, TasksResponse,
};
use studioplan_shared::models::patch::is_blank;
use studioplan_shared::models::task::{CreateTask, NewTask, UpdateTask};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(filter): ApiQuery<TaskFilter>,
) -> ApiResult<Json<TasksResponse>> {
    let tasks = state.store.list_tasks(auth.user_id, filter.status).await?;
    Ok(Json(TasksResponse { tasks }))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(req): JsonBody<CreateTask>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    if is_blank(&req.title) {
        return Err(ApiError::validation("Title is required"));
    }
    req.validate()?;

    let task = state
        .store
        .create_task(auth.user_id, NewTask::from(req))
        .await?;

    info!(task_id = %task.id, user_id = %auth.user_id, status = %task.status, "Task created");
    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state
        .store
        .get_task(auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;
    Ok(Json(TaskResponse { task }))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    JsonBody(patch): JsonBody<UpdateTask>,
) -> ApiResult<Json<TaskResponse>> {
    if patch.title.as_deref().is_some_and(is_blank) {
        return Err(ApiError::validation("Title cannot be empty"));
    }
    patch.validate()?;

    let task = state
        .store
        .update_task(auth.user_id, id, patch.normalized())
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;
    Ok(Json(TaskResponse { task }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    if !state.store.delete_task(auth.user_id, id).await? {
        return Err(ApiError::not_found("Task"));
    }

    info!(task_id = %id, user_id = %auth.user_id, "Task deleted");
    Ok(Json(DeleteResponse::ok()))
}
