/// PostgreSQL-backed store
///
/// Thin delegation to the model queries; the pool is cloned cheaply per call.

use super::{Store, StoreResult};
use crate::db::pool;
use crate::models::checklist_item::{
    ChecklistItem, ChecklistItemPatch, ChecklistKey, NewChecklistItem,
};
use crate::models::note::{NewNote, Note, UpdateNote};
use crate::models::task::{NewTask, Task, TaskStatus, UpdateTask};
use crate::models::user_settings::{UpdateSettings, UserSettings};
use crate::models::video_project::{NewVideoProject, UpdateVideoProject, VideoProject};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_notes(&self, owner: Uuid) -> StoreResult<Vec<Note>> {
        Ok(Note::list_by_user(&self.pool, owner).await?)
    }

    async fn get_note(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Note>> {
        Ok(Note::find_by_id_and_user(&self.pool, id, owner).await?)
    }

    async fn create_note(&self, owner: Uuid, note: NewNote) -> StoreResult<Note> {
        Ok(Note::create(&self.pool, owner, note).await?)
    }

    async fn update_note(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: UpdateNote,
    ) -> StoreResult<Option<Note>> {
        Ok(Note::update(&self.pool, id, owner, patch).await?)
    }

    async fn delete_note(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        Ok(Note::delete(&self.pool, id, owner).await?)
    }

    async fn list_tasks(&self, owner: Uuid, status: Option<TaskStatus>) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_user(&self.pool, owner, status).await?)
    }

    async fn get_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id_and_user(&self.pool, id, owner).await?)
    }

    async fn create_task(&self, owner: Uuid, task: NewTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, owner, task).await?)
    }

    async fn update_task(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: UpdateTask,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, owner, patch).await?)
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id, owner).await?)
    }

    async fn list_video_projects(&self, owner: Uuid) -> StoreResult<Vec<VideoProject>> {
        Ok(VideoProject::list_by_user(&self.pool, owner).await?)
    }

    async fn get_video_project(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<VideoProject>> {
        Ok(VideoProject::find_by_id_and_user(&self.pool, id, owner).await?)
    }

    async fn create_video_project(
        &self,
        owner: Uuid,
        project: NewVideoProject,
    ) -> StoreResult<VideoProject> {
        Ok(VideoProject::create(&self.pool, owner, project).await?)
    }

    async fn update_video_project(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: UpdateVideoProject,
    ) -> StoreResult<Option<VideoProject>> {
        Ok(VideoProject::update(&self.pool, id, owner, patch).await?)
    }

    async fn delete_video_project(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        Ok(VideoProject::delete(&self.pool, id, owner).await?)
    }

    async fn list_checklist_items(
        &self,
        owner: Uuid,
        project_id: Uuid,
    ) -> StoreResult<Vec<ChecklistItem>> {
        Ok(ChecklistItem::list_by_project(&self.pool, owner, project_id).await?)
    }

    async fn find_checklist_item(&self, key: &ChecklistKey) -> StoreResult<Option<ChecklistItem>> {
        Ok(ChecklistItem::find_by_key(&self.pool, key).await?)
    }

    async fn max_checklist_order(
        &self,
        owner: Uuid,
        project_id: Uuid,
        category: &str,
    ) -> StoreResult<Option<i32>> {
        Ok(ChecklistItem::max_display_order(&self.pool, owner, project_id, category).await?)
    }

    async fn insert_checklist_item(
        &self,
        item: NewChecklistItem,
    ) -> StoreResult<Option<ChecklistItem>> {
        Ok(ChecklistItem::insert_if_absent(&self.pool, item).await?)
    }

    async fn update_checklist_item(
        &self,
        owner: Uuid,
        project_id: Uuid,
        item_id: Uuid,
        patch: ChecklistItemPatch,
    ) -> StoreResult<Option<ChecklistItem>> {
        Ok(ChecklistItem::update(&self.pool, owner, project_id, item_id, patch).await?)
    }

    async fn delete_checklist_item(
        &self,
        owner: Uuid,
        project_id: Uuid,
        item_id: Uuid,
    ) -> StoreResult<bool> {
        Ok(ChecklistItem::delete(&self.pool, owner, project_id, item_id).await?)
    }

    async fn get_settings(&self, owner: Uuid) -> StoreResult<Option<UserSettings>> {
        Ok(UserSettings::find_by_user(&self.pool, owner).await?)
    }

    async fn upsert_settings(
        &self,
        owner: Uuid,
        update: UpdateSettings,
    ) -> StoreResult<UserSettings> {
        Ok(UserSettings::upsert(&self.pool, owner, update).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(pool::health_check(&self.pool).await?)
    }
}
