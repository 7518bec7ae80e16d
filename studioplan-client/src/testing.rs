/// In-memory [`PlannerApi`] for unit tests
///
/// Backed by the shared `MemoryStore`, so owner scoping, partial updates and
/// checklist idempotency behave as they do behind the real server. Calls
/// are recorded with their JSON payloads; individual operations can be made
/// to fail or to take a while.

use crate::api::PlannerApi;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use studioplan_shared::checklist::{create_idempotent, ChecklistError};
use studioplan_shared::models::checklist_item::{
    ChecklistItem, ChecklistItemPatch, CreateChecklistItem,
};
use studioplan_shared::models::envelopes::{GenerateConceptRequest, GenerateConceptResponse};
use studioplan_shared::models::note::{CreateNote, NewNote, Note, UpdateNote};
use studioplan_shared::models::task::{CreateTask, NewTask, Task, TaskStatus, UpdateTask};
use studioplan_shared::models::user_settings::{UpdateSettings, UserSettingsView};
use studioplan_shared::models::video_project::{
    CreateVideoProject, NewVideoProject, UpdateVideoProject, VideoProject,
};
use studioplan_shared::store::{MemoryStore, Store, StoreError};
use uuid::Uuid;

pub struct MockPlanner {
    pub store: MemoryStore,
    pub owner: Uuid,
    calls: Mutex<Vec<(String, Value)>>,
    failing: Mutex<HashSet<String>>,
    latency: Mutex<Duration>,
}

impl MockPlanner {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            owner: Uuid::new_v4(),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            latency: Mutex::new(Duration::ZERO),
        }
    }

    /// Makes every later call to `op` fail with a 500
    pub fn fail(&self, op: &str) {
        self.failing.lock().unwrap().insert(op.to_string());
    }

    pub fn recover(&self, op: &str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// Delay applied to every call before it touches the store
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn calls_to(&self, op: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == op)
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub async fn seed_project(&self, title: &str) -> VideoProject {
        self.store
            .create_video_project(
                self.owner,
                NewVideoProject::from(CreateVideoProject {
                    title: title.to_string(),
                    ..Default::default()
                }),
            )
            .await
            .unwrap()
    }

    pub async fn seed_note(&self, title: &str) -> Note {
        self.store
            .create_note(
                self.owner,
                NewNote::from(CreateNote {
                    title: Some(title.to_string()),
                    content: None,
                }),
            )
            .await
            .unwrap()
    }

    async fn enter(&self, op: &str, body: impl Serialize) -> ClientResult<()> {
        self.calls.lock().unwrap().push((
            op.to_string(),
            serde_json::to_value(body).unwrap_or(Value::Null),
        ));

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.failing.lock().unwrap().contains(op) {
            return Err(ClientError::api(500, "An internal error occurred"));
        }
        Ok(())
    }
}

fn store_err(e: StoreError) -> ClientError {
    ClientError::api(500, e.to_string())
}

fn found<T>(row: Option<T>, what: &str) -> ClientResult<T> {
    row.ok_or_else(|| ClientError::api(404, format!("{} not found", what)))
}

#[async_trait]
impl PlannerApi for MockPlanner {
    async fn list_notes(&self) -> ClientResult<Vec<Note>> {
        self.enter("list_notes", ()).await?;
        self.store.list_notes(self.owner).await.map_err(store_err)
    }

    async fn get_note(&self, id: Uuid) -> ClientResult<Note> {
        self.enter("get_note", id).await?;
        found(self.store.get_note(self.owner, id).await.map_err(store_err)?, "Note")
    }

    async fn create_note(&self, data: CreateNote) -> ClientResult<Note> {
        self.enter("create_note", &data).await?;
        self.store
            .create_note(self.owner, NewNote::from(data))
            .await
            .map_err(store_err)
    }

    async fn update_note(&self, id: Uuid, patch: UpdateNote) -> ClientResult<Note> {
        self.enter("update_note", &patch).await?;
        let row = self
            .store
            .update_note(self.owner, id, patch)
            .await
            .map_err(store_err)?;
        found(row, "Note")
    }

    async fn delete_note(&self, id: Uuid) -> ClientResult<()> {
        self.enter("delete_note", id).await?;
        self.store
            .delete_note(self.owner, id)
            .await
            .map_err(store_err)?
            .then_some(())
            .ok_or_else(|| ClientError::api(404, "Note not found"))
    }

    async fn list_tasks(&self, status: Option<TaskStatus>) -> ClientResult<Vec<Task>> {
        self.enter("list_tasks", status).await?;
        self.store
            .list_tasks(self.owner, status)
            .await
            .map_err(store_err)
    }

    async fn get_task(&self, id: Uuid) -> ClientResult<Task> {
        self.enter("get_task", id).await?;
        found(self.store.get_task(self.owner, id).await.map_err(store_err)?, "Task")
    }

    async fn create_task(&self, data: CreateTask) -> ClientResult<Task> {
        self.enter("create_task", &data).await?;
        self.store
            .create_task(self.owner, NewTask::from(data))
            .await
            .map_err(store_err)
    }

    async fn update_task(&self, id: Uuid, patch: UpdateTask) -> ClientResult<Task> {
        self.enter("update_task", &patch).await?;
        let row = self
            .store
            .update_task(self.owner, id, patch)
            .await
            .map_err(store_err)?;
        found(row, "Task")
    }

    async fn delete_task(&self, id: Uuid) -> ClientResult<()> {
        self.enter("delete_task", id).await?;
        self.store
            .delete_task(self.owner, id)
            .await
            .map_err(store_err)?
            .then_some(())
            .ok_or_else(|| ClientError::api(404, "Task not found"))
    }

    async fn list_projects(&self) -> ClientResult<Vec<VideoProject>> {
        self.enter("list_projects", ()).await?;
        self.store
            .list_video_projects(self.owner)
            .await
            .map_err(store_err)
    }

    async fn get_project(&self, id: Uuid) -> ClientResult<VideoProject> {
        self.enter("get_project", id).await?;
        let row = self
            .store
            .get_video_project(self.owner, id)
            .await
            .map_err(store_err)?;
        found(row, "Video project")
    }

    async fn create_project(&self, data: CreateVideoProject) -> ClientResult<VideoProject> {
        self.enter("create_project", &data).await?;
        self.store
            .create_video_project(self.owner, NewVideoProject::from(data))
            .await
            .map_err(store_err)
    }

    async fn update_project(
        &self,
        id: Uuid,
        patch: UpdateVideoProject,
    ) -> ClientResult<VideoProject> {
        self.enter("update_project", &patch).await?;
        let row = self
            .store
            .update_video_project(self.owner, id, patch)
            .await
            .map_err(store_err)?;
        found(row, "Video project")
    }

    async fn delete_project(&self, id: Uuid) -> ClientResult<()> {
        self.enter("delete_project", id).await?;
        self.store
            .delete_video_project(self.owner, id)
            .await
            .map_err(store_err)?
            .then_some(())
            .ok_or_else(|| ClientError::api(404, "Video project not found"))
    }

    async fn list_checklist(&self, project_id: Uuid) -> ClientResult<Vec<ChecklistItem>> {
        self.enter("list_checklist", project_id).await?;
        self.store
            .list_checklist_items(self.owner, project_id)
            .await
            .map_err(store_err)
    }

    async fn create_checklist_item(
        &self,
        project_id: Uuid,
        data: CreateChecklistItem,
    ) -> ClientResult<ChecklistItem> {
        self.enter("create_checklist_item", &data).await?;
        match create_idempotent(&self.store, self.owner, project_id, data).await {
            Ok(outcome) => Ok(outcome.item),
            Err(ChecklistError::Validation(msg)) => Err(ClientError::api(400, msg)),
            Err(ChecklistError::ProjectNotFound) => {
                Err(ClientError::api(404, "Video project not found"))
            }
            Err(ChecklistError::Store(e)) => Err(store_err(e)),
        }
    }

    async fn update_checklist_item(
        &self,
        project_id: Uuid,
        item_id: Uuid,
        patch: ChecklistItemPatch,
    ) -> ClientResult<ChecklistItem> {
        self.enter("update_checklist_item", &patch).await?;
        let row = self
            .store
            .update_checklist_item(self.owner, project_id, item_id, patch)
            .await
            .map_err(store_err)?;
        found(row, "Checklist item")
    }

    async fn delete_checklist_item(&self, project_id: Uuid, item_id: Uuid) -> ClientResult<()> {
        self.enter("delete_checklist_item", item_id).await?;
        self.store
            .delete_checklist_item(self.owner, project_id, item_id)
            .await
            .map_err(store_err)?
            .then_some(())
            .ok_or_else(|| ClientError::api(404, "Checklist item not found"))
    }

    async fn get_settings(&self) -> ClientResult<UserSettingsView> {
        self.enter("get_settings", ()).await?;
        Ok(self
            .store
            .get_settings(self.owner)
            .await
            .map_err(store_err)?
            .map(|row| row.masked())
            .unwrap_or_else(|| UserSettingsView::empty(self.owner)))
    }

    async fn update_settings(&self, data: UpdateSettings) -> ClientResult<UserSettingsView> {
        self.enter("update_settings", ()).await?;
        self.store
            .upsert_settings(self.owner, data.normalized())
            .await
            .map(|row| row.masked())
            .map_err(store_err)
    }

    /// Records the trigger only; tests write the concept themselves
    async fn generate_concept(
        &self,
        request: GenerateConceptRequest,
    ) -> ClientResult<GenerateConceptResponse> {
        self.enter("generate_concept", &request).await?;
        Ok(GenerateConceptResponse {
            concept: String::new(),
            project: None,
        })
    }
}
