/// Settings endpoints
///
/// The stored Gemini key is write-only from the client's point of view:
/// responses carry `"***"` when a key is set and `null` otherwise.

use crate::{app::AppState, error::ApiResult, extract::JsonBody};
use axum::{extract::State, Extension, Json};
use studioplan_shared::auth::AuthContext;
use studioplan_shared::models::envelopes::SettingsResponse;
use studioplan_shared::models::user_settings::{UpdateSettings, UserSettingsView};
use tracing::info;

pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<SettingsResponse>> {
    let settings = state
        .store
        .get_settings(auth.user_id)
        .await?
        .map(|row| row.masked())
        .unwrap_or_else(|| UserSettingsView::empty(auth.user_id));

    Ok(Json(SettingsResponse { settings }))
}

/// Upserts; a null or blank key clears the stored one
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(req): JsonBody<UpdateSettings>,
) -> ApiResult<Json<SettingsResponse>> {
    let row = state
        .store
        .upsert_settings(auth.user_id, req.normalized())
        .await?;

    info!(user_id = %auth.user_id, has_key = row.api_key().is_some(), "Settings saved");
    Ok(Json(SettingsResponse {
        settings: row.masked(),
    }))
}
