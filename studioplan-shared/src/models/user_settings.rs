/// Per-user settings
///
/// Holds the user's own Gemini API key. The key never leaves the server in
/// plaintext: handlers return [`UserSettingsView`], which carries the
/// [`MASKED_SECRET`] sentinel instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

/// Returned in place of a stored secret
pub const MASKED_SECRET: &str = "***";

#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gemini_api_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for UserSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSettings")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| MASKED_SECRET),
            )
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Client-facing settings with the secret masked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettingsView {
    pub user_id: Uuid,
    pub gemini_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserSettingsView {
    /// View for a user who has never saved settings
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            gemini_api_key: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl UserSettings {
    /// Stored key with blank values treated as unset
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn masked(&self) -> UserSettingsView {
        UserSettingsView {
            user_id: self.user_id,
            gemini_api_key: self.api_key().map(|_| MASKED_SECRET.to_string()),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }

    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserSettings>(
            r#"
            SELECT id, user_id, gemini_api_key, created_at, updated_at
            FROM user_settings WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Inserts or replaces the user's row
    pub async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        update: UpdateSettings,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, UserSettings>(
            r#"
            INSERT INTO user_settings (user_id, gemini_api_key)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET gemini_api_key = EXCLUDED.gemini_api_key, updated_at = NOW()
            RETURNING id, user_id, gemini_api_key, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(update.gemini_api_key)
        .fetch_one(pool)
        .await
    }
}

/// PUT /settings body; a null or blank key clears the stored one
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSettings {
    #[serde(default)]
    pub gemini_api_key: Option<String>,
}

impl UpdateSettings {
    pub fn normalized(mut self) -> Self {
        self.gemini_api_key = super::patch::clean_text(self.gemini_api_key);
        self
    }
}

impl fmt::Debug for UpdateSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateSettings")
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| MASKED_SECRET),
            )
            .finish()
    }
}
