/// Concept generation endpoint
///
/// ```text
/// POST /video-projects/generate-concept
///   { video_project_id, title, hook?, rough_sketch? } -> { concept, project | null }
/// ```
///
/// # Flow
///
/// 1. Confirm the caller owns the project
/// 2. Resolve the API key (user key, then the shared key if allowed)
/// 3. One generation call
/// 4. Save the text onto the project
///
/// A failed save still returns the concept with `project: null`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::JsonBody,
};
use axum::{extract::State, Extension, Json};
use studioplan_shared::auth::AuthContext;
use studioplan_shared::genai::{prompt::concept_prompt, resolve_api_key};
use studioplan_shared::models::envelopes::{GenerateConceptRequest, GenerateConceptResponse};
use studioplan_shared::models::patch::is_blank;
use studioplan_shared::models::video_project::UpdateVideoProject;
use tracing::{error, info, warn};

pub async fn generate_concept(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(req): JsonBody<GenerateConceptRequest>,
) -> ApiResult<Json<GenerateConceptResponse>> {
    let project_id = match req.video_project_id {
        Some(id) if !is_blank(&req.title) => id,
        _ => return Err(ApiError::validation("video_project_id and title are required")),
    };

    if state
        .store
        .get_video_project(auth.user_id, project_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Video project"));
    }

    let settings = state.store.get_settings(auth.user_id).await?;
    let (api_key, source) = resolve_api_key(settings.as_ref(), &state.config.gemini.shared_key)?;

    let prompt = concept_prompt(&req.title, req.hook.as_deref(), req.rough_sketch.as_deref());
    let concept = state.generator.generate(&api_key, &prompt).await?;

    info!(
        project_id = %project_id,
        user_id = %auth.user_id,
        key_source = ?source,
        concept_len = concept.len(),
        "Concept generated"
    );

    let project = match state
        .store
        .update_video_project(auth.user_id, project_id, UpdateVideoProject::concept(&concept))
        .await
    {
        Ok(Some(project)) => Some(project),
        Ok(None) => {
            warn!(project_id = %project_id, "Project disappeared before the concept was saved");
            None
        }
        Err(e) => {
            error!(project_id = %project_id, error = %e, "Failed to save generated concept");
            None
        }
    };

    Ok(Json(GenerateConceptResponse { concept, project }))
}
