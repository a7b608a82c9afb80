/// Database layer for TrackHub
///
/// - `pool`: PostgreSQL connection pool and health checks
/// - `migrations`: Embedded schema migrations
///
/// Models and their queries live in the `models` module.

pub mod migrations;
pub mod pool;
