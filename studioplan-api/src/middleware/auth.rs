/// Session authentication layer
///
/// Reads the session token from `Authorization: Bearer <jwt>` or, failing
/// that, the identity provider's session cookie. A valid token puts an
/// [`AuthContext`] into the request extensions; anything else is a 401
/// before any handler or datastore code runs.
///
/// ```no_run
/// use axum::Extension;
/// use studioplan_shared::auth::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use studioplan_shared::auth::session::{extract_token, validate_token, SessionError};
use studioplan_shared::auth::AuthContext;
use tracing::debug;

pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = &state.config.auth;
    let headers = req.headers();

    let token = extract_token(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::COOKIE).and_then(|v| v.to_str().ok()),
        &auth.session_cookie,
    )
    .ok_or(SessionError::Missing)?;

    let claims = validate_token(token, &auth.jwt_secret, &auth.audience).map_err(|e| {
        debug!(error = %e, "Rejected session token");
        e
    })?;

    let context = AuthContext::from(claims);
    debug!(user_id = %context.user_id, "Authenticated request");
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
