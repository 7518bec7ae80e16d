/// API route handlers
///
/// Every planner handler follows the same shape: authenticated caller in,
/// one owner-scoped store call, JSON envelope out.

pub mod checklist;
pub mod concept;
pub mod health;
pub mod notes;
pub mod settings;
pub mod tasks;
pub mod video_projects;
