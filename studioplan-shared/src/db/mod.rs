/// Database layer for the planner
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations
///
/// Row types and their queries live in `models`; the `store` module wraps them
/// behind the `Store` trait the API consumes.

pub mod migrations;
pub mod pool;
