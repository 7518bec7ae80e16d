/// Concept generation
///
/// Turns a project's title, hook and rough sketch into a short-form video
/// script via an external generative-text service.
///
/// - [`ConceptGenerator`]: the seam the API calls; [`GeminiClient`] is the
///   production implementation
/// - [`resolve_api_key`]: picks the key a request is billed to
/// - [`prompt`]: the script template
///
/// # Key resolution
///
/// ```text
/// user key set?      ── yes ──> user key
///        │ no
/// shared key allowed and configured? ── yes ──> shared key
///        │ no
///        v
/// GenerationError::MissingKey
/// ```

pub mod gemini;
pub mod prompt;

pub use gemini::{GeminiClient, GeminiConfig};

use crate::models::user_settings::UserSettings;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No key is available for this caller
    #[error("Gemini API key not configured. Please add your API key in Settings.")]
    MissingKey,

    #[error("Generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the service
    #[error("Generation service returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[async_trait]
pub trait ConceptGenerator: Send + Sync {
    /// Runs one generation call; an absent text part yields `""`
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, GenerationError>;
}

/// Shared deployment key and whether it may be used
#[derive(Clone, Default)]
pub struct SharedKeyPolicy {
    pub key: Option<String>,
    pub allow_fallback: bool,
}

impl std::fmt::Debug for SharedKeyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeyPolicy")
            .field("key", &self.key.as_ref().map(|_| "***"))
            .field("allow_fallback", &self.allow_fallback)
            .finish()
    }
}

/// Source of the resolved key, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    User,
    Shared,
}

/// Chooses the key for a generation call
pub fn resolve_api_key(
    settings: Option<&UserSettings>,
    policy: &SharedKeyPolicy,
) -> Result<(String, KeySource), GenerationError> {
    if let Some(key) = settings.and_then(UserSettings::api_key) {
        return Ok((key.to_string(), KeySource::User));
    }

    if policy.allow_fallback {
        if let Some(key) = policy
            .key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            return Ok((key.to_string(), KeySource::Shared));
        }
    }

    Err(GenerationError::MissingKey)
}
