/// JSON request and response envelopes shared by the API and its clients
///
/// Every response wraps its payload in a named key (`{"note": ...}`,
/// `{"tasks": [...]}`) so server and client agree on one set of types.

use super::checklist_item::{ChecklistItem, ChecklistItemPatch};
use super::note::Note;
use super::task::{Task, TaskStatus};
use super::user_settings::UserSettingsView;
use super::video_project::VideoProject;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub note: Note,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task: Task,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksResponse {
    pub tasks: Vec<Task>,
}

/// `GET /tasks` query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub project: VideoProject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<VideoProject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItemResponse {
    pub item: ChecklistItem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItemsResponse {
    pub items: Vec<ChecklistItem>,
}

/// `PUT /video-projects/{id}/checklist` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChecklistItemRequest {
    #[serde(default)]
    pub item_id: Option<Uuid>,
    #[serde(flatten)]
    pub patch: ChecklistItemPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub settings: UserSettingsView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateConceptRequest {
    #[serde(default)]
    pub video_project_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rough_sketch: Option<String>,
}

/// `project` is null when the concept could not be saved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConceptResponse {
    pub concept: String,
    pub project: Option<VideoProject>,
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
