/// Checklist endpoints, nested under a video project
///
/// ```text
/// GET    /video-projects/:id/checklist           -> { items }
/// POST   /video-projects/:id/checklist           -> 201 { item } new, 200 { item } existing
/// PUT    /video-projects/:id/checklist           -> { item }   body carries item_id
/// DELETE /video-projects/:id/checklist/:item_id  -> { success }
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, JsonBody},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use studioplan_shared::auth::AuthContext;
use studioplan_shared::checklist::create_idempotent;
use studioplan_shared::models::checklist_item::CreateChecklistItem;
use studioplan_shared::models::envelopes::{
    ChecklistItemResponse, ChecklistItemsResponse, DeleteResponse, UpdateChecklistItemRequest,
};
use studioplan_shared::models::patch::is_blank;
use tracing::{debug, info};
use uuid::Uuid;

pub async fn list_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<ChecklistItemsResponse>> {
    if state
        .store
        .get_video_project(auth.user_id, project_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Video project"));
    }

    let items = state
        .store
        .list_checklist_items(auth.user_id, project_id)
        .await?;
    Ok(Json(ChecklistItemsResponse { items }))
}

/// Idempotent: a duplicate (text, category) returns the existing row
pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    JsonBody(req): JsonBody<CreateChecklistItem>,
) -> ApiResult<(StatusCode, Json<ChecklistItemResponse>)> {
    let outcome = create_idempotent(state.store.as_ref(), auth.user_id, project_id, req).await?;

    let status = if outcome.created {
        info!(item_id = %outcome.item.id, project_id = %project_id, "Checklist item created");
        StatusCode::CREATED
    } else {
        debug!(item_id = %outcome.item.id, project_id = %project_id, "Returned existing checklist item");
        StatusCode::OK
    };

    Ok((status, Json(ChecklistItemResponse { item: outcome.item })))
}

pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    JsonBody(req): JsonBody<UpdateChecklistItemRequest>,
) -> ApiResult<Json<ChecklistItemResponse>> {
    let item_id = req
        .item_id
        .ok_or_else(|| ApiError::validation("item_id is required"))?;

    if req.patch.text.as_deref().is_some_and(is_blank) {
        return Err(ApiError::validation("Item text cannot be empty"));
    }
    if req.patch.category.as_deref().is_some_and(is_blank) {
        return Err(ApiError::validation("Category cannot be empty"));
    }

    let item = state
        .store
        .update_checklist_item(auth.user_id, project_id, item_id, req.patch.normalized())
        .await?
        .ok_or_else(|| ApiError::not_found("Checklist item"))?;
    Ok(Json(ChecklistItemResponse { item }))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath((project_id, item_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<DeleteResponse>> {
    if !state
        .store
        .delete_checklist_item(auth.user_id, project_id, item_id)
        .await?
    {
        return Err(ApiError::not_found("Checklist item"));
    }

    Ok(Json(DeleteResponse::ok()))
}
