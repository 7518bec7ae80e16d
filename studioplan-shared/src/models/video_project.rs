/// Video project model and database operations
///
/// A video project moves through production stages and optionally carries a
/// generated script (`generated_concept`) that is written after creation.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE video_status AS ENUM ('ideation', 'filming', 'editing', 'publishing', 'completed');
///
/// CREATE TABLE video_projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     title TEXT NOT NULL,
///     hook TEXT,
///     rough_sketch TEXT,
///     generated_concept TEXT,
///     status video_status NOT NULL DEFAULT 'ideation',
///     progress INTEGER NOT NULL DEFAULT 0,
///     notes TEXT,
///     production_date DATE,
///     release_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Checklist rows reference projects without a foreign key; `delete` removes
/// them in the same transaction.

use super::patch;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

const PROJECT_COLUMNS: &str = "id, user_id, title, hook, rough_sketch, generated_concept, status, \
                               progress, notes, production_date, release_date, created_at, updated_at";

/// Production stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "video_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    #[default]
    Ideation,
    Filming,
    Editing,
    Publishing,
    Completed,
}

impl VideoStatus {
    pub const ALL: [VideoStatus; 5] = [
        VideoStatus::Ideation,
        VideoStatus::Filming,
        VideoStatus::Editing,
        VideoStatus::Publishing,
        VideoStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Ideation => "ideation",
            VideoStatus::Filming => "filming",
            VideoStatus::Editing => "editing",
            VideoStatus::Publishing => "publishing",
            VideoStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VideoStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown video status '{}'", s))
    }
}

/// A video project owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoProject {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub hook: Option<String>,
    pub rough_sketch: Option<String>,
    /// Script text written by concept generation
    pub generated_concept: Option<String>,
    pub status: VideoStatus,
    pub progress: i32,
    pub notes: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub release_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateVideoProject {
    #[serde(default)]
    #[validate(length(max = 500, message = "Title must be at most 500 characters"))]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rough_sketch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(
        default,
        deserialize_with = "patch::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub production_date: Option<NaiveDate>,

    #[serde(
        default,
        deserialize_with = "patch::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideoProject {
    pub title: String,
    pub hook: Option<String>,
    pub rough_sketch: Option<String>,
    pub status: VideoStatus,
    pub progress: i32,
    pub notes: Option<String>,
    pub production_date: Option<NaiveDate>,
    pub release_date: Option<NaiveDate>,
}

impl From<CreateVideoProject> for NewVideoProject {
    fn from(data: CreateVideoProject) -> Self {
        Self {
            title: data.title.trim().to_string(),
            hook: patch::clean_text(data.hook),
            rough_sketch: patch::clean_text(data.rough_sketch),
            status: data.status.unwrap_or_default(),
            progress: data.progress.unwrap_or(0),
            notes: patch::non_empty(data.notes),
            production_date: data.production_date,
            release_date: data.release_date,
        }
    }
}

/// Partial update
///
/// Nullable fields use `Option<Option<_>>`: outer `None` leaves the column
/// alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateVideoProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Title must be at most 500 characters"))]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub hook: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub rough_sketch: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_concept: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "patch::nullable_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub production_date: Option<Option<NaiveDate>>,

    #[serde(
        default,
        deserialize_with = "patch::nullable_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<Option<NaiveDate>>,
}

impl UpdateVideoProject {
    /// Only sets the generated script
    pub fn concept(text: impl Into<String>) -> Self {
        Self {
            generated_concept: Some(Some(text.into())),
            ..Default::default()
        }
    }

    /// Trims short text fields; blank clears. Notes keep their whitespace.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.hook = patch::clean_patch_text(self.hook);
        self.rough_sketch = patch::clean_patch_text(self.rough_sketch);
        self.generated_concept = patch::clean_patch_text(self.generated_concept);
        self.notes = self.notes.map(patch::non_empty);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Field-level merge: fields present in `newer` win
    pub fn merge(&mut self, newer: UpdateVideoProject) {
        fn take<T>(slot: &mut Option<T>, newer: Option<T>) {
            if newer.is_some() {
                *slot = newer;
            }
        }

        take(&mut self.title, newer.title);
        take(&mut self.hook, newer.hook);
        take(&mut self.rough_sketch, newer.rough_sketch);
        take(&mut self.generated_concept, newer.generated_concept);
        take(&mut self.status, newer.status);
        take(&mut self.progress, newer.progress);
        take(&mut self.notes, newer.notes);
        take(&mut self.production_date, newer.production_date);
        take(&mut self.release_date, newer.release_date);
    }

    /// Applies present fields to an in-memory project
    pub fn apply_to(&self, project: &mut VideoProject) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(hook) = &self.hook {
            project.hook = hook.clone();
        }
        if let Some(sketch) = &self.rough_sketch {
            project.rough_sketch = sketch.clone();
        }
        if let Some(concept) = &self.generated_concept {
            project.generated_concept = concept.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(progress) = self.progress {
            project.progress = progress;
        }
        if let Some(notes) = &self.notes {
            project.notes = notes.clone();
        }
        if let Some(date) = self.production_date {
            project.production_date = date;
        }
        if let Some(date) = self.release_date {
            project.release_date = date;
        }
    }
}

impl VideoProject {
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, VideoProject>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM video_projects WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, VideoProject>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM video_projects WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: NewVideoProject,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, VideoProject>(&format!(
            r#"
            INSERT INTO video_projects (user_id, title, hook, rough_sketch, status, progress,
                                        notes, production_date, release_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(data.title)
        .bind(data.hook)
        .bind(data.rough_sketch)
        .bind(data.status)
        .bind(data.progress)
        .bind(data.notes)
        .bind(data.production_date)
        .bind(data.release_date)
        .fetch_one(pool)
        .await
    }

    /// Applies a partial update, always refreshing `updated_at`
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateVideoProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE video_projects SET updated_at = NOW()");

        if let Some(title) = data.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(hook) = data.hook {
            query.push(", hook = ").push_bind(hook);
        }
        if let Some(sketch) = data.rough_sketch {
            query.push(", rough_sketch = ").push_bind(sketch);
        }
        if let Some(concept) = data.generated_concept {
            query.push(", generated_concept = ").push_bind(concept);
        }
        if let Some(status) = data.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(progress) = data.progress {
            query.push(", progress = ").push_bind(progress);
        }
        if let Some(notes) = data.notes {
            query.push(", notes = ").push_bind(notes);
        }
        if let Some(date) = data.production_date {
            query.push(", production_date = ").push_bind(date);
        }
        if let Some(date) = data.release_date {
            query.push(", release_date = ").push_bind(date);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(" RETURNING ")
            .push(PROJECT_COLUMNS);

        query
            .build_query_as::<VideoProject>()
            .fetch_optional(pool)
            .await
    }

    /// Deletes the project and its checklist items in one transaction
    ///
    /// Returns whether the project row matched. When it did not, nothing is
    /// removed.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query("DELETE FROM video_projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM video_checklist_items WHERE video_project_id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
