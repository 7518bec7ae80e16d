/// Checklist item model and database operations
///
/// Items belong to a video project and are unique per
/// `(video_project_id, user_id, text, category)`. The idempotent create flow
/// built on these queries lives in `crate::checklist`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE video_checklist_items (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     video_project_id UUID NOT NULL,
///     text TEXT NOT NULL,
///     category TEXT NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     display_order INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT uq_checklist_item_identity UNIQUE (video_project_id, user_id, text, category)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const ITEM_COLUMNS: &str = "id, user_id, video_project_id, text, category, completed, \
                            display_order, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub video_project_id: Uuid,
    pub text: String,
    pub category: String,
    pub completed: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity of an item within a project
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChecklistKey {
    pub video_project_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub category: String,
}

/// Create payload as sent by clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateChecklistItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

/// Fully resolved insert values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChecklistItem {
    pub key: ChecklistKey,
    pub completed: bool,
    pub display_order: i32,
}

/// Partial update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

impl ChecklistItemPatch {
    pub fn toggle(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn normalized(mut self) -> Self {
        self.text = self.text.map(|t| t.trim().to_string());
        self.category = self.category.map(|c| c.trim().to_string());
        self
    }

    pub fn apply_to(&self, item: &mut ChecklistItem) {
        if let Some(text) = &self.text {
            item.text = text.clone();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
        if let Some(order) = self.display_order {
            item.display_order = order;
        }
    }
}

impl ChecklistItem {
    /// Items of one project, grouped by category in display order
    pub async fn list_by_project(
        pool: &PgPool,
        user_id: Uuid,
        video_project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM video_checklist_items
            WHERE video_project_id = $1 AND user_id = $2
            ORDER BY category ASC, display_order ASC, created_at ASC
            "#
        ))
        .bind(video_project_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_key(
        pool: &PgPool,
        key: &ChecklistKey,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM video_checklist_items
            WHERE video_project_id = $1 AND user_id = $2 AND text = $3 AND category = $4
            "#
        ))
        .bind(key.video_project_id)
        .bind(key.user_id)
        .bind(&key.text)
        .bind(&key.category)
        .fetch_optional(pool)
        .await
    }

    /// Highest display_order in the category, `None` when it is empty
    pub async fn max_display_order(
        pool: &PgPool,
        user_id: Uuid,
        video_project_id: Uuid,
        category: &str,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT MAX(display_order) FROM video_checklist_items
            WHERE video_project_id = $1 AND user_id = $2 AND category = $3
            "#,
        )
        .bind(video_project_id)
        .bind(user_id)
        .bind(category)
        .fetch_one(pool)
        .await
    }

    /// Atomic insert-if-absent
    ///
    /// Returns `None` when the identity constraint already holds a row.
    pub async fn insert_if_absent(
        pool: &PgPool,
        item: NewChecklistItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistItem>(&format!(
            r#"
            INSERT INTO video_checklist_items
                (video_project_id, user_id, text, category, completed, display_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ON CONSTRAINT uq_checklist_item_identity DO NOTHING
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.key.video_project_id)
        .bind(item.key.user_id)
        .bind(item.key.text)
        .bind(item.key.category)
        .bind(item.completed)
        .bind(item.display_order)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        video_project_id: Uuid,
        id: Uuid,
        data: ChecklistItemPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE video_checklist_items SET updated_at = NOW()");

        if let Some(text) = data.text {
            query.push(", text = ").push_bind(text);
        }
        if let Some(category) = data.category {
            query.push(", category = ").push_bind(category);
        }
        if let Some(completed) = data.completed {
            query.push(", completed = ").push_bind(completed);
        }
        if let Some(order) = data.display_order {
            query.push(", display_order = ").push_bind(order);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND video_project_id = ")
            .push_bind(video_project_id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(" RETURNING ")
            .push(ITEM_COLUMNS);

        query
            .build_query_as::<ChecklistItem>()
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(
        pool: &PgPool,
        user_id: Uuid,
        video_project_id: Uuid,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM video_checklist_items WHERE id = $1 AND video_project_id = $2 AND user_id = $3",
        )
        .bind(id)
        .bind(video_project_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
