/// In-memory store
///
/// Mirrors the PostgreSQL semantics the API depends on: owner scoping,
/// `created_at DESC` listing, the checklist identity constraint and the
/// project delete cascade. Writes can be made to fail on demand so error
/// paths are testable without a database.

use super::{Store, StoreError, StoreResult};
use crate::models::checklist_item::{
    ChecklistItem, ChecklistItemPatch, ChecklistKey, NewChecklistItem,
};
use crate::models::note::{NewNote, Note, UpdateNote};
use crate::models::task::{NewTask, Task, TaskStatus, UpdateTask};
use crate::models::user_settings::{UpdateSettings, UserSettings};
use crate::models::video_project::{NewVideoProject, UpdateVideoProject, VideoProject};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    // Insertion order; listing walks these in reverse for newest first
    notes: Vec<Note>,
    tasks: Vec<Task>,
    projects: Vec<VideoProject>,
    checklist: Vec<ChecklistItem>,
    settings: Vec<UserSettings>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write return `StoreError::Backend`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of checklist rows across all owners
    pub async fn checklist_len(&self) -> usize {
        self.tables.read().await.checklist.len()
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Backend("write rejected by memory store".into()))
        } else {
            Ok(())
        }
    }
}

fn item_key(item: &ChecklistItem) -> ChecklistKey {
    ChecklistKey {
        video_project_id: item.video_project_id,
        user_id: item.user_id,
        text: item.text.clone(),
        category: item.category.clone(),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_notes(&self, owner: Uuid) -> StoreResult<Vec<Note>> {
        let tables = self.tables.read().await;
        Ok(tables
            .notes
            .iter()
            .rev()
            .filter(|n| n.user_id == owner)
            .cloned()
            .collect())
    }

    async fn get_note(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Note>> {
        let tables = self.tables.read().await;
        Ok(tables
            .notes
            .iter()
            .find(|n| n.id == id && n.user_id == owner)
            .cloned())
    }

    async fn create_note(&self, owner: Uuid, note: NewNote) -> StoreResult<Note> {
        self.check_writable()?;
        let now = Utc::now();
        let row = Note {
            id: Uuid::new_v4(),
            user_id: owner,
            title: note.title,
            content: note.content,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.notes.push(row.clone());
        Ok(row)
    }

    async fn update_note(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: UpdateNote,
    ) -> StoreResult<Option<Note>> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .notes
            .iter_mut()
            .find(|n| n.id == id && n.user_id == owner)
            .map(|note| {
                patch.apply_to(note);
                note.updated_at = Utc::now();
                note.clone()
            }))
    }

    async fn delete_note(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let before = tables.notes.len();
        tables.notes.retain(|n| !(n.id == id && n.user_id == owner));
        Ok(tables.notes.len() < before)
    }

    async fn list_tasks(&self, owner: Uuid, status: Option<TaskStatus>) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .rev()
            .filter(|t| t.user_id == owner)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect())
    }

    async fn get_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .cloned())
    }

    async fn create_task(&self, owner: Uuid, task: NewTask) -> StoreResult<Task> {
        self.check_writable()?;
        let now = Utc::now();
        let row = Task {
            id: Uuid::new_v4(),
            user_id: owner,
            title: task.title,
            description: task.description,
            status: task.status,
            category: task.category,
            tags: task.tags,
            progress: task.progress,
            due_date: task.due_date,
            assignees: task.assignees,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.tasks.push(row.clone());
        Ok(row)
    }

    async fn update_task(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: UpdateTask,
    ) -> StoreResult<Option<Task>> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let Some(task) = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner)
        else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        if let Some(progress) = patch.progress {
            task.progress = progress;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(assignees) = patch.assignees {
            task.assignees = assignees;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| !(t.id == id && t.user_id == owner));
        Ok(tables.tasks.len() < before)
    }

    async fn list_video_projects(&self, owner: Uuid) -> StoreResult<Vec<VideoProject>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .rev()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect())
    }

    async fn get_video_project(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<VideoProject>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .find(|p| p.id == id && p.user_id == owner)
            .cloned())
    }

    async fn create_video_project(
        &self,
        owner: Uuid,
        project: NewVideoProject,
    ) -> StoreResult<VideoProject> {
        self.check_writable()?;
        let now = Utc::now();
        let row = VideoProject {
            id: Uuid::new_v4(),
            user_id: owner,
            title: project.title,
            hook: project.hook,
            rough_sketch: project.rough_sketch,
            generated_concept: None,
            status: project.status,
            progress: project.progress,
            notes: project.notes,
            production_date: project.production_date,
            release_date: project.release_date,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.projects.push(row.clone());
        Ok(row)
    }

    async fn update_video_project(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: UpdateVideoProject,
    ) -> StoreResult<Option<VideoProject>> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .projects
            .iter_mut()
            .find(|p| p.id == id && p.user_id == owner)
            .map(|project| {
                patch.apply_to(project);
                project.updated_at = Utc::now();
                project.clone()
            }))
    }

    async fn delete_video_project(&self, owner: Uuid, id: Uuid) -> StoreResult<bool> {
        self.check_writable()?;
        // One write guard covers both tables, like the SQL transaction
        let mut tables = self.tables.write().await;
        let before = tables.projects.len();
        tables.projects.retain(|p| !(p.id == id && p.user_id == owner));
        if tables.projects.len() == before {
            return Ok(false);
        }

        tables
            .checklist
            .retain(|i| !(i.video_project_id == id && i.user_id == owner));
        Ok(true)
    }

    async fn list_checklist_items(
        &self,
        owner: Uuid,
        project_id: Uuid,
    ) -> StoreResult<Vec<ChecklistItem>> {
        let tables = self.tables.read().await;
        let mut items: Vec<ChecklistItem> = tables
            .checklist
            .iter()
            .filter(|i| i.video_project_id == project_id && i.user_id == owner)
            .cloned()
            .collect();

        // Stable sort keeps insertion order as the created_at tiebreak
        items.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then(a.display_order.cmp(&b.display_order))
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(items)
    }

    async fn find_checklist_item(&self, key: &ChecklistKey) -> StoreResult<Option<ChecklistItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .checklist
            .iter()
            .find(|i| item_key(i) == *key)
            .cloned())
    }

    async fn max_checklist_order(
        &self,
        owner: Uuid,
        project_id: Uuid,
        category: &str,
    ) -> StoreResult<Option<i32>> {
        let tables = self.tables.read().await;
        Ok(tables
            .checklist
            .iter()
            .filter(|i| {
                i.video_project_id == project_id && i.user_id == owner && i.category == category
            })
            .map(|i| i.display_order)
            .max())
    }

    async fn insert_checklist_item(
        &self,
        item: NewChecklistItem,
    ) -> StoreResult<Option<ChecklistItem>> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if tables.checklist.iter().any(|i| item_key(i) == item.key) {
            return Ok(None);
        }

        let now = Utc::now();
        let row = ChecklistItem {
            id: Uuid::new_v4(),
            user_id: item.key.user_id,
            video_project_id: item.key.video_project_id,
            text: item.key.text,
            category: item.key.category,
            completed: item.completed,
            display_order: item.display_order,
            created_at: now,
            updated_at: now,
        };
        tables.checklist.push(row.clone());
        Ok(Some(row))
    }

    async fn update_checklist_item(
        &self,
        owner: Uuid,
        project_id: Uuid,
        item_id: Uuid,
        patch: ChecklistItemPatch,
    ) -> StoreResult<Option<ChecklistItem>> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let Some(index) = tables.checklist.iter().position(|i| {
            i.id == item_id && i.video_project_id == project_id && i.user_id == owner
        }) else {
            return Ok(None);
        };

        let mut updated = tables.checklist[index].clone();
        patch.apply_to(&mut updated);
        let key = item_key(&updated);
        let collides = tables
            .checklist
            .iter()
            .any(|i| i.id != item_id && item_key(i) == key);
        if collides {
            return Err(StoreError::Conflict(
                "duplicate key value violates unique constraint \"uq_checklist_item_identity\""
                    .into(),
            ));
        }

        updated.updated_at = Utc::now();
        tables.checklist[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_checklist_item(
        &self,
        owner: Uuid,
        project_id: Uuid,
        item_id: Uuid,
    ) -> StoreResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let before = tables.checklist.len();
        tables.checklist.retain(|i| {
            !(i.id == item_id && i.video_project_id == project_id && i.user_id == owner)
        });
        Ok(tables.checklist.len() < before)
    }

    async fn get_settings(&self, owner: Uuid) -> StoreResult<Option<UserSettings>> {
        let tables = self.tables.read().await;
        Ok(tables.settings.iter().find(|s| s.user_id == owner).cloned())
    }

    async fn upsert_settings(
        &self,
        owner: Uuid,
        update: UpdateSettings,
    ) -> StoreResult<UserSettings> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(existing) = tables.settings.iter_mut().find(|s| s.user_id == owner) {
            existing.gemini_api_key = update.gemini_api_key;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let row = UserSettings {
            id: Uuid::new_v4(),
            user_id: owner,
            gemini_api_key: update.gemini_api_key,
            created_at: now,
            updated_at: now,
        };
        tables.settings.push(row.clone());
        Ok(row)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
