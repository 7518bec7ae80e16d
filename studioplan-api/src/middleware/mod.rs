/// Middleware modules for the API server
///
/// - `auth`: session validation for every planner route
/// - `security`: security response headers

pub mod auth;
pub mod security;
