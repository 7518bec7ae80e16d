/// Datastore abstraction
///
/// The API talks to the datastore only through [`Store`]. Every method is
/// scoped by the owner id so cross-tenant reads are impossible to express.
///
/// Two implementations ship:
///
/// - [`PgStore`]: PostgreSQL via sqlx, used by the server
/// - [`MemoryStore`]: in-process tables, used by tests and local demos
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use studioplan_shared::store::{MemoryStore, Store};
/// use studioplan_shared::models::note::CreateNote;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// let owner = Uuid::new_v4();
/// let note = store.create_note(owner, CreateNote::default().into()).await?;
/// assert!(store.get_note(owner, note.id).await?.is_some());
/// # Ok(())
/// # }
/// ```

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::checklist_item::{
    ChecklistItem, ChecklistItemPatch, ChecklistKey, NewChecklistItem,
};
use crate::models::note::{NewNote, Note, UpdateNote};
use crate::models::task::{NewTask, Task, TaskStatus, UpdateTask};
use crate::models::user_settings::{UpdateSettings, UserSettings};
use crate::models::video_project::{NewVideoProject, UpdateVideoProject, VideoProject};
use async_trait::async_trait;
use uuid::Uuid;

/// Datastore errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Write rejected by a uniqueness constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Non-SQL backend failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);

        if unique {
            StoreError::Conflict(err.to_string())
        } else {
            StoreError::Database(err)
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // Notes
    async fn list_notes(&self, owner: Uuid) -> StoreResult<Vec<Note>>;
    async fn get_note(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Note>>;
    async fn create_note(&self, owner: Uuid, note: NewNote) -> StoreResult<Note>;
    async fn update_note(&self, owner: Uuid, id: Uuid, patch: UpdateNote)
        -> StoreResult<Option<Note>>;
    async fn delete_note(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;

    // Tasks
    async fn list_tasks(&self, owner: Uuid, status: Option<TaskStatus>) -> StoreResult<Vec<Task>>;
    async fn get_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>>;
    async fn create_task(&self, owner: Uuid, task: NewTask) -> StoreResult<Task>;
    async fn update_task(&self, owner: Uuid, id: Uuid, patch: UpdateTask)
        -> StoreResult<Option<Task>>;
    async fn delete_task(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;

    // Video projects
    async fn list_video_projects(&self, owner: Uuid) -> StoreResult<Vec<VideoProject>>;
    async fn get_video_project(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<VideoProject>>;
    async fn create_video_project(
        &self,
        owner: Uuid,
        project: NewVideoProject,
    ) -> StoreResult<VideoProject>;
    async fn update_video_project(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: UpdateVideoProject,
    ) -> StoreResult<Option<VideoProject>>;
    /// Also removes the project's checklist items
    async fn delete_video_project(&self, owner: Uuid, id: Uuid) -> StoreResult<bool>;

    // Checklist items
    async fn list_checklist_items(
        &self,
        owner: Uuid,
        project_id: Uuid,
    ) -> StoreResult<Vec<ChecklistItem>>;
    async fn find_checklist_item(&self, key: &ChecklistKey) -> StoreResult<Option<ChecklistItem>>;
    async fn max_checklist_order(
        &self,
        owner: Uuid,
        project_id: Uuid,
        category: &str,
    ) -> StoreResult<Option<i32>>;
    /// `None` when an item with the same key already exists
    async fn insert_checklist_item(
        &self,
        item: NewChecklistItem,
    ) -> StoreResult<Option<ChecklistItem>>;
    async fn update_checklist_item(
        &self,
        owner: Uuid,
        project_id: Uuid,
        item_id: Uuid,
        patch: ChecklistItemPatch,
    ) -> StoreResult<Option<ChecklistItem>>;
    async fn delete_checklist_item(
        &self,
        owner: Uuid,
        project_id: Uuid,
        item_id: Uuid,
    ) -> StoreResult<bool>;

    // Settings
    async fn get_settings(&self, owner: Uuid) -> StoreResult<Option<UserSettings>>;
    async fn upsert_settings(&self, owner: Uuid, update: UpdateSettings)
        -> StoreResult<UserSettings>;

    /// Liveness probe for `/health`
    async fn health_check(&self) -> StoreResult<()>;
}
