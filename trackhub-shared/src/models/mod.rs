/// Database models for TrackHub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts; a user's email is its identity
/// - `project`: Projects with creator and assignees
/// - `task`: Tasks with deadline, status and priority
/// - `comment`: Comment threads under tasks
///
/// # Example
///
/// ```no_run
/// use trackhub_shared::models::project::{CreateProject, Project};
/// use trackhub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let projects = Project::list_for_identity(&pool, "ada@example.com").await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod project;
pub mod task;
pub mod user;
