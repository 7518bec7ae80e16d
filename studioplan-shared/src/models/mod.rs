/// Planner models
///
/// Row types with their owner-scoped queries, plus the payload types used to
/// create and partially update them.
///
/// # Models
///
/// - `note`: free-form notes
/// - `task`: kanban tasks
/// - `video_project`: video projects with production and release dates
/// - `checklist_item`: per-project production checklist
/// - `user_settings`: per-user secrets (masked on the way out)
/// - `envelopes`: JSON request/response wrappers
/// - `patch`: serde helpers for partial updates
///
/// # Example
///
/// ```no_run
/// use studioplan_shared::models::note::{CreateNote, Note};
/// use studioplan_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let owner = Uuid::new_v4();
/// let note = Note::create(&pool, owner, CreateNote::default().into()).await?;
/// assert_eq!(note.title, "Untitled Note");
/// # Ok(())
/// # }
/// ```

pub mod checklist_item;
pub mod envelopes;
pub mod note;
pub mod patch;
pub mod task;
pub mod user_settings;
pub mod video_project;
