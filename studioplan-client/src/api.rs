/// Typed accessors for the planner API
///
/// [`PlannerApi`] is the seam every client component works against. The
/// HTTP implementation unwraps the response envelopes (`{ note }`,
/// `{ tasks }`, ...) so callers only see domain rows; tests substitute an
/// in-memory implementation.
///
/// # Example
///
/// ```no_run
/// use studioplan_client::api::{HttpPlannerClient, PlannerApi};
///
/// # async fn example() -> Result<(), studioplan_client::ClientError> {
/// let client = HttpPlannerClient::new("http://localhost:8080", "session-jwt")?;
/// for note in client.list_notes().await? {
///     println!("{}", note.title);
/// }
/// # Ok(())
/// # }
/// ```

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use studioplan_shared::models::checklist_item::{
    ChecklistItem, ChecklistItemPatch, CreateChecklistItem,
};
use studioplan_shared::models::envelopes::{
    ChecklistItemResponse, ChecklistItemsResponse, DeleteResponse, ErrorBody,
    GenerateConceptRequest, GenerateConceptResponse, NoteResponse, NotesResponse,
    ProjectResponse, ProjectsResponse, SettingsResponse, TaskResponse, TasksResponse,
    UpdateChecklistItemRequest,
};
use studioplan_shared::models::note::{CreateNote, Note, UpdateNote};
use studioplan_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use studioplan_shared::models::user_settings::{UpdateSettings, UserSettingsView};
use studioplan_shared::models::video_project::{
    CreateVideoProject, UpdateVideoProject, VideoProject,
};
use tracing::debug;
use uuid::Uuid;

/// Default request timeout; concept generation is the slow path
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

#[async_trait]
pub trait PlannerApi: Send + Sync {
    async fn list_notes(&self) -> ClientResult<Vec<Note>>;
    async fn get_note(&self, id: Uuid) -> ClientResult<Note>;
    async fn create_note(&self, data: CreateNote) -> ClientResult<Note>;
    async fn update_note(&self, id: Uuid, patch: UpdateNote) -> ClientResult<Note>;
    async fn delete_note(&self, id: Uuid) -> ClientResult<()>;

    async fn list_tasks(&self, status: Option<TaskStatus>) -> ClientResult<Vec<Task>>;
    async fn get_task(&self, id: Uuid) -> ClientResult<Task>;
    async fn create_task(&self, data: CreateTask) -> ClientResult<Task>;
    async fn update_task(&self, id: Uuid, patch: UpdateTask) -> ClientResult<Task>;
    async fn delete_task(&self, id: Uuid) -> ClientResult<()>;

    async fn list_projects(&self) -> ClientResult<Vec<VideoProject>>;
    async fn get_project(&self, id: Uuid) -> ClientResult<VideoProject>;
    async fn create_project(&self, data: CreateVideoProject) -> ClientResult<VideoProject>;
    async fn update_project(
        &self,
        id: Uuid,
        patch: UpdateVideoProject,
    ) -> ClientResult<VideoProject>;
    async fn delete_project(&self, id: Uuid) -> ClientResult<()>;

    async fn list_checklist(&self, project_id: Uuid) -> ClientResult<Vec<ChecklistItem>>;
    /// Idempotent: an identical (text, category) returns the existing item
    async fn create_checklist_item(
        &self,
        project_id: Uuid,
        data: CreateChecklistItem,
    ) -> ClientResult<ChecklistItem>;
    async fn update_checklist_item(
        &self,
        project_id: Uuid,
        item_id: Uuid,
        patch: ChecklistItemPatch,
    ) -> ClientResult<ChecklistItem>;
    async fn delete_checklist_item(&self, project_id: Uuid, item_id: Uuid) -> ClientResult<()>;

    async fn get_settings(&self) -> ClientResult<UserSettingsView>;
    async fn update_settings(&self, data: UpdateSettings) -> ClientResult<UserSettingsView>;

    async fn generate_concept(
        &self,
        request: GenerateConceptRequest,
    ) -> ClientResult<GenerateConceptResponse>;
}

/// reqwest-backed [`PlannerApi`]
#[derive(Clone)]
pub struct HttpPlannerClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for HttpPlannerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlannerClient")
            .field("base_url", &self.base_url)
            .field("token", &"***")
            .finish()
    }
}

impl HttpPlannerClient {
    /// Builds a client that sends `token` as a Bearer session
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
        };
        debug!(status = status.as_u16(), message = %message, "API request failed");
        Err(ClientError::api(status.as_u16(), message))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn write<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.request(method, path).json(body)).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let _: DeleteResponse = self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

#[async_trait]
impl PlannerApi for HttpPlannerClient {
    async fn list_notes(&self) -> ClientResult<Vec<Note>> {
        let body: NotesResponse = self.get("/notes").await?;
        Ok(body.notes)
    }

    async fn get_note(&self, id: Uuid) -> ClientResult<Note> {
        let body: NoteResponse = self.get(&format!("/notes/{}", id)).await?;
        Ok(body.note)
    }

    async fn create_note(&self, data: CreateNote) -> ClientResult<Note> {
        let body: NoteResponse = self.write(Method::POST, "/notes", &data).await?;
        Ok(body.note)
    }

    async fn update_note(&self, id: Uuid, patch: UpdateNote) -> ClientResult<Note> {
        let body: NoteResponse = self
            .write(Method::PUT, &format!("/notes/{}", id), &patch)
            .await?;
        Ok(body.note)
    }

    async fn delete_note(&self, id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/notes/{}", id)).await
    }

    async fn list_tasks(&self, status: Option<TaskStatus>) -> ClientResult<Vec<Task>> {
        let path = match status {
            Some(status) => format!("/tasks?status={}", status.as_str()),
            None => "/tasks".to_string(),
        };
        let body: TasksResponse = self.get(&path).await?;
        Ok(body.tasks)
    }

    async fn get_task(&self, id: Uuid) -> ClientResult<Task> {
        let body: TaskResponse = self.get(&format!("/tasks/{}", id)).await?;
        Ok(body.task)
    }

    async fn create_task(&self, data: CreateTask) -> ClientResult<Task> {
        let body: TaskResponse = self.write(Method::POST, "/tasks", &data).await?;
        Ok(body.task)
    }

    async fn update_task(&self, id: Uuid, patch: UpdateTask) -> ClientResult<Task> {
        let body: TaskResponse = self
            .write(Method::PUT, &format!("/tasks/{}", id), &patch)
            .await?;
        Ok(body.task)
    }

    async fn delete_task(&self, id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/tasks/{}", id)).await
    }

    async fn list_projects(&self) -> ClientResult<Vec<VideoProject>> {
        let body: ProjectsResponse = self.get("/video-projects").await?;
        Ok(body.projects)
    }

    async fn get_project(&self, id: Uuid) -> ClientResult<VideoProject> {
        let body: ProjectResponse = self.get(&format!("/video-projects/{}", id)).await?;
        Ok(body.project)
    }

    async fn create_project(&self, data: CreateVideoProject) -> ClientResult<VideoProject> {
        let body: ProjectResponse = self.write(Method::POST, "/video-projects", &data).await?;
        Ok(body.project)
    }

    async fn update_project(
        &self,
        id: Uuid,
        patch: UpdateVideoProject,
    ) -> ClientResult<VideoProject> {
        let body: ProjectResponse = self
            .write(Method::PUT, &format!("/video-projects/{}", id), &patch)
            .await?;
        Ok(body.project)
    }

    async fn delete_project(&self, id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/video-projects/{}", id)).await
    }

    async fn list_checklist(&self, project_id: Uuid) -> ClientResult<Vec<ChecklistItem>> {
        let body: ChecklistItemsResponse = self
            .get(&format!("/video-projects/{}/checklist", project_id))
            .await?;
        Ok(body.items)
    }

    async fn create_checklist_item(
        &self,
        project_id: Uuid,
        data: CreateChecklistItem,
    ) -> ClientResult<ChecklistItem> {
        let body: ChecklistItemResponse = self
            .write(
                Method::POST,
                &format!("/video-projects/{}/checklist", project_id),
                &data,
            )
            .await?;
        Ok(body.item)
    }

    async fn update_checklist_item(
        &self,
        project_id: Uuid,
        item_id: Uuid,
        patch: ChecklistItemPatch,
    ) -> ClientResult<ChecklistItem> {
        let request = UpdateChecklistItemRequest {
            item_id: Some(item_id),
            patch,
        };
        let body: ChecklistItemResponse = self
            .write(
                Method::PUT,
                &format!("/video-projects/{}/checklist", project_id),
                &request,
            )
            .await?;
        Ok(body.item)
    }

    async fn delete_checklist_item(&self, project_id: Uuid, item_id: Uuid) -> ClientResult<()> {
        self.delete(&format!(
            "/video-projects/{}/checklist/{}",
            project_id, item_id
        ))
        .await
    }

    async fn get_settings(&self) -> ClientResult<UserSettingsView> {
        let body: SettingsResponse = self.get("/settings").await?;
        Ok(body.settings)
    }

    async fn update_settings(&self, data: UpdateSettings) -> ClientResult<UserSettingsView> {
        let body: SettingsResponse = self.write(Method::PUT, "/settings", &data).await?;
        Ok(body.settings)
    }

    async fn generate_concept(
        &self,
        request: GenerateConceptRequest,
    ) -> ClientResult<GenerateConceptResponse> {
        self.write(Method::POST, "/video-projects/generate-concept", &request)
            .await
    }
}
