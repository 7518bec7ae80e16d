/// Task model and database operations
///
/// Tasks are kanban cards. Status moves freely between columns; there is no
/// enforced transition graph.
///
/// ```text
/// todo ⇄ in_progress ⇄ in_review ⇄ done
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'in_review', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     title TEXT NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     category TEXT,
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     progress INTEGER NOT NULL DEFAULT 0,
///     due_date DATE,
///     assignees TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use super::patch;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, user_id, title, description, status, category, tags, progress, \
                            due_date, assignees, created_at, updated_at";

/// Kanban column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    InReview,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Done,
    ];

    /// Wire and column representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::InReview => "in_review",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown task status '{}'", s))
    }
}

/// A task owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Percent complete, 0..=100
    pub progress: i32,
    pub due_date: Option<NaiveDate>,
    pub assignees: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload as sent by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateTask {
    #[serde(default)]
    #[validate(length(max = 500, message = "Title must be at most 500 characters"))]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,

    #[serde(
        default,
        deserialize_with = "patch::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

/// Normalized insert values with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub progress: i32,
    pub due_date: Option<NaiveDate>,
    pub assignees: Vec<String>,
}

impl From<CreateTask> for NewTask {
    fn from(data: CreateTask) -> Self {
        Self {
            title: data.title.trim().to_string(),
            description: patch::clean_text(data.description),
            status: data.status.unwrap_or_default(),
            category: patch::clean_text(data.category),
            tags: data.tags.unwrap_or_default(),
            progress: data.progress.unwrap_or(0),
            due_date: data.due_date,
            assignees: data.assignees.unwrap_or_default(),
        }
    }
}

/// Partial update; see `patch` for the absent/null distinction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Title must be at most 500 characters"))]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(
        default,
        deserialize_with = "patch::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "patch::null_as_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,

    #[serde(
        default,
        deserialize_with = "patch::nullable_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(
        default,
        deserialize_with = "patch::null_as_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignees: Option<Vec<String>>,
}

impl UpdateTask {
    /// Trims text fields; blank optional text clears the column
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.description = patch::clean_patch_text(self.description);
        self.category = patch::clean_patch_text(self.category);
        self
    }
}

impl Task {
    /// Lists the owner's tasks newest first, optionally filtered by status
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        query
            .push(TASK_COLUMNS)
            .push(" FROM tasks WHERE user_id = ")
            .push_bind(user_id);

        if let Some(status) = status {
            query.push(" AND status = ").push_bind(status);
        }

        query.push(" ORDER BY created_at DESC");

        query.build_query_as::<Task>().fetch_all(pool).await
    }

    /// Finds a task by id with owner isolation
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Inserts a task for the owner
    pub async fn create(pool: &PgPool, user_id: Uuid, data: NewTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, status, category, tags, progress,
                               due_date, assignees)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.category)
        .bind(data.tags)
        .bind(data.progress)
        .bind(data.due_date)
        .bind(data.assignees)
        .fetch_one(pool)
        .await
    }

    /// Applies a partial update, always refreshing `updated_at`
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = data.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(description) = data.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(status) = data.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(category) = data.category {
            query.push(", category = ").push_bind(category);
        }
        if let Some(tags) = data.tags {
            query.push(", tags = ").push_bind(tags);
        }
        if let Some(progress) = data.progress {
            query.push(", progress = ").push_bind(progress);
        }
        if let Some(due_date) = data.due_date {
            query.push(", due_date = ").push_bind(due_date);
        }
        if let Some(assignees) = data.assignees {
            query.push(", assignees = ").push_bind(assignees);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(" RETURNING ")
            .push(TASK_COLUMNS);

        query.build_query_as::<Task>().fetch_optional(pool).await
    }

    /// Deletes a task; returns whether a row matched
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
