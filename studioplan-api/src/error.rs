/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Each failure maps to one status code
/// and a `{"error": "<message>"}` body.
///
/// | Variant         | Status |
/// |-----------------|--------|
/// | `Unauthorized`  | 401    |
/// | `Validation`    | 400    |
/// | `NotFound`      | 404    |
/// | `Upstream`      | 500    |
/// | `Configuration` | 500    |
///
/// `Upstream` detail is logged and replaced by a generic message;
/// `Configuration` messages are meant for the user and pass through.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use studioplan_shared::auth::session::SessionError;
use studioplan_shared::checklist::ChecklistError;
use studioplan_shared::genai::GenerationError;
use studioplan_shared::models::envelopes::ErrorBody;
use studioplan_shared::store::StoreError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Missing, invalid or expired session
    Unauthorized(String),

    /// Bad input, malformed JSON or malformed path ids
    Validation(String),

    /// Absent, or owned by someone else
    NotFound(String),

    /// Datastore or generation service failure
    Upstream(String),

    /// Deployment is missing a required secret
    Configuration(String),
}

impl ApiError {
    pub fn not_found(resource: &str) -> Self {
        ApiError::NotFound(format!("{} not found", resource))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Upstream(msg) => write!(f, "Upstream failure: {}", msg),
            ApiError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Upstream(detail) => {
                tracing::error!(detail = %detail, "Upstream failure");
                "An internal error occurred".to_string()
            }
            ApiError::Configuration(msg) => {
                tracing::warn!(message = %msg, "Configuration error");
                msg
            }
            ApiError::Unauthorized(msg) | ApiError::Validation(msg) | ApiError::NotFound(msg) => {
                msg
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => {
                ApiError::Validation("An item with the same text already exists in this category".into())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Missing => ApiError::Unauthorized("Unauthorized".into()),
            SessionError::Expired => ApiError::Unauthorized("Session expired".into()),
            SessionError::Invalid(_) => ApiError::Unauthorized("Invalid session".into()),
            SessionError::Signing(detail) => ApiError::Upstream(detail),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::MissingKey => ApiError::Configuration(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<ChecklistError> for ApiError {
    fn from(err: ChecklistError) -> Self {
        match err {
            ChecklistError::Validation(msg) => ApiError::Validation(msg),
            ChecklistError::ProjectNotFound => ApiError::not_found("Video project"),
            ChecklistError::Store(store) => store.into(),
        }
    }
}

/// First field message, for a single-line `error` body
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", e.code))
            })
            .collect();
        messages.sort();

        ApiError::Validation(
            messages
                .into_iter()
                .next()
                .unwrap_or_else(|| "Validation failed".to_string()),
        )
    }
}
