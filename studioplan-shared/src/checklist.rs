/// Idempotent checklist creation and the default production taxonomy
///
/// Creating an item that already exists returns the existing row. Several
/// clients may seed the same project at once, so the flow is:
///
/// ```text
/// find by (project, owner, text, category) ── found ──> existing row
///        │ missing
///        v
/// next display_order (max + 1, or 0)
///        │
///        v
/// INSERT .. ON CONFLICT DO NOTHING ── inserted ──> new row
///        │ conflict (lost the race)
///        v
/// re-query the winner ──> existing row
/// ```

use crate::models::checklist_item::{
    ChecklistItem, ChecklistKey, CreateChecklistItem, NewChecklistItem,
};
use crate::models::patch;
use crate::store::{Store, StoreError};
use tracing::debug;
use uuid::Uuid;

/// Taxonomy categories in board order
pub const CATEGORIES: [&str; 4] = ["Ideation", "Filming", "Video Editing", "Publish/Market"];

/// Default items seeded into an empty checklist, grouped by category
pub const DEFAULT_TAXONOMY: [(&str, &[&str]); 4] = [
    (
        "Ideation",
        &[
            "Title Drafted",
            "Target Audience Defined",
            "Research Completed",
            "3-Sec HOOK",
            "Intro Stated",
            "Whole Script Finalize",
            "Memorize/Rehearsed",
        ],
    ),
    (
        "Filming",
        &[
            "Shot-list created",
            "Location/Studio prep",
            "Equipment Check",
            "Main footage shoot",
            "B-rolls shot",
            "Extra Overlays/Screenshots",
            "Files Organized/Rename",
        ],
    ),
    (
        "Video Editing",
        &[
            "Sound Cleanup",
            "Music Added",
            "Sound Effects Add",
            "Filler words/pause X",
            "Text/Subtitle Added",
            "Graphics Added",
            "Jump Cuts/Transition Applied",
        ],
    ),
    (
        "Publish/Market",
        &[
            "Thumbnail Design",
            "SEO Title/Description",
            "Tags Research + Add",
            "Upload / Schedule",
            "Promos? Or Not",
            "First Hour Engagement",
        ],
    ),
];

/// Seed payloads for the default taxonomy with one running display_order
pub fn default_items() -> Vec<CreateChecklistItem> {
    DEFAULT_TAXONOMY
        .iter()
        .flat_map(|(category, texts)| texts.iter().map(move |text| (*category, *text)))
        .zip(0..)
        .map(|((category, text), order)| CreateChecklistItem {
            text: text.to_string(),
            category: category.to_string(),
            completed: Some(false),
            display_order: Some(order),
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ChecklistError {
    #[error("{0}")]
    Validation(String),

    #[error("Video project not found")]
    ProjectNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of an idempotent create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedItem {
    pub item: ChecklistItem,
    /// False when an existing row was returned
    pub created: bool,
}

/// Creates a checklist item unless an identical one exists
///
/// # Errors
///
/// - `Validation` for blank text or category
/// - `ProjectNotFound` when the project is absent or owned by someone else
/// - `Store` for datastore failures
///
/// A defaulted `display_order` is read before the insert, so concurrent
/// creates of distinct items in one category may receive the same value.
pub async fn create_idempotent(
    store: &dyn Store,
    owner: Uuid,
    project_id: Uuid,
    request: CreateChecklistItem,
) -> Result<CreatedItem, ChecklistError> {
    if patch::is_blank(&request.text) {
        return Err(ChecklistError::Validation("Item text is required".into()));
    }
    if patch::is_blank(&request.category) {
        return Err(ChecklistError::Validation("Category is required".into()));
    }

    if store.get_video_project(owner, project_id).await?.is_none() {
        return Err(ChecklistError::ProjectNotFound);
    }

    let key = ChecklistKey {
        video_project_id: project_id,
        user_id: owner,
        text: request.text.trim().to_string(),
        category: request.category.trim().to_string(),
    };

    if let Some(existing) = store.find_checklist_item(&key).await? {
        debug!(item_id = %existing.id, "Checklist item already exists");
        return Ok(CreatedItem {
            item: existing,
            created: false,
        });
    }

    // Not atomic with the insert: two different items created at once in
    // the same category can share an order. Accepted; readers break ties on
    // created_at, and default seeding sends explicit orders.
    let display_order = match request.display_order {
        Some(order) => order,
        None => store
            .max_checklist_order(owner, project_id, &key.category)
            .await?
            .map_or(0, |max| max + 1),
    };

    let new_item = NewChecklistItem {
        key: key.clone(),
        completed: request.completed.unwrap_or(false),
        display_order,
    };

    if let Some(item) = store.insert_checklist_item(new_item).await? {
        return Ok(CreatedItem {
            item,
            created: true,
        });
    }

    debug!(project_id = %project_id, "Checklist insert lost a race, returning the winner");
    match store.find_checklist_item(&key).await? {
        Some(item) => Ok(CreatedItem {
            item,
            created: false,
        }),
        None => Err(ChecklistError::Store(StoreError::Backend(
            "checklist item conflicted but could not be re-read".into(),
        ))),
    }
}
