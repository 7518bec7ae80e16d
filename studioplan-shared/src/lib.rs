//! # StudioPlan Shared Library
//!
//! Domain types and datastore access shared by the StudioPlan API server and
//! its client library.
//!
//! ## Module Organization
//!
//! - `models`: planner row types, partial-update payloads, JSON envelopes
//! - `db`: connection pool and embedded migrations
//! - `store`: the `Store` trait with PostgreSQL and in-memory backends
//! - `checklist`: idempotent checklist creation and the default taxonomy
//! - `auth`: session-token validation
//! - `genai`: concept generation against the Gemini API

pub mod auth;
pub mod checklist;
pub mod db;
pub mod genai;
pub mod models;
pub mod store;

/// Current version of the StudioPlan shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
