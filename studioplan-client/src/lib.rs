//! # StudioPlan Client Library
//!
//! Typed access to the planner API plus the view-state machinery that sits
//! between it and a UI.
//!
//! ## Modules
//!
//! - `api`: the `PlannerApi` trait and its HTTP implementation
//! - `autosave`: debounced autosave for notes and video projects
//! - `checklist`: checklist board with default seeding
//! - `concept`: concept generation trigger and poller
//! - `schedule`: calendar mapping, drag-to-reschedule and periodic refresh
//! - `optimistic`: snapshot-and-restore helper for optimistic mutations
//!
//! ## Example
//!
//! ```no_run
//! use studioplan_client::api::{HttpPlannerClient, PlannerApi};
//!
//! # async fn example() -> Result<(), studioplan_client::ClientError> {
//! let client = HttpPlannerClient::new("http://localhost:8080", "session-token")?;
//! for project in client.list_projects().await? {
//!     println!("{} ({})", project.title, project.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod autosave;
pub mod checklist;
pub mod concept;
pub mod error;
pub mod optimistic;
pub mod schedule;

#[cfg(test)]
mod testing;

pub use error::{ClientError, ClientResult};
