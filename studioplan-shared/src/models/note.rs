/// Note model and database operations
///
/// Notes are free-form text documents. Every query is owner-scoped.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     title TEXT NOT NULL DEFAULT 'Untitled Note',
///     content TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use super::patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Title given to notes created without one
pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";

const NOTE_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

/// A note owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload as sent by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Normalized insert values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

impl From<CreateNote> for NewNote {
    fn from(data: CreateNote) -> Self {
        let title = data
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_NOTE_TITLE.to_string());

        Self {
            title,
            content: data.content.unwrap_or_default(),
        }
    }
}

/// Partial update; absent fields are left untouched, `content: null` empties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "patch::null_as_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<String>,
}

impl UpdateNote {
    /// Trims the title the way creates do
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self
    }

    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Field-level merge: fields present in `newer` win
    pub fn merge(&mut self, newer: UpdateNote) {
        if newer.title.is_some() {
            self.title = newer.title;
        }
        if newer.content.is_some() {
            self.content = newer.content;
        }
    }

    /// Applies present fields to an in-memory note
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
    }
}

impl Note {
    /// Lists the owner's notes, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Finds a note by id with owner isolation
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Inserts a note for the owner
    pub async fn create(pool: &PgPool, user_id: Uuid, data: NewNote) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Note>(&format!(
            "INSERT INTO notes (user_id, title, content) VALUES ($1, $2, $3) RETURNING {NOTE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(data.title)
        .bind(data.content)
        .fetch_one(pool)
        .await
    }

    /// Applies a partial update, always refreshing `updated_at`
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateNote,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE notes SET updated_at = NOW()");

        if let Some(title) = data.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(content) = data.content {
            query.push(", content = ").push_bind(content);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(" RETURNING ")
            .push(NOTE_COLUMNS);

        query.build_query_as::<Note>().fetch_optional(pool).await
    }

    /// Deletes a note; returns whether a row matched
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
