/// Read access to projects and their tasks
///
/// The authorizer never issues queries of its own; it asks a `ProjectStore`.
/// Production code uses the `PgPool` implementation. Tests plug in an
/// in-memory store, including ones that fail on purpose.
///
/// # Example
///
/// ```no_run
/// use trackhub_shared::store::ProjectStore;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let tasks = pool.find_tasks_by_project_id(project_id).await?;
/// let project = pool.find_project_by_id(project_id).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    project::Project,
    task::{ProjectTask, Task},
};

/// Error type for store lookups
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Lookups the access authorizer depends on
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Finds a project by ID
    async fn find_project_by_id(&self, id: Uuid) -> Result<Option<Project>, StoreError>;

    /// Lists a project's tasks, each with its owning project's assignees
    async fn find_tasks_by_project_id(&self, id: Uuid) -> Result<Vec<ProjectTask>, StoreError>;
}

#[async_trait]
impl ProjectStore for PgPool {
    async fn find_project_by_id(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(Project::find_by_id(self, id).await?)
    }

    async fn find_tasks_by_project_id(&self, id: Uuid) -> Result<Vec<ProjectTask>, StoreError> {
        Ok(Task::list_by_project_with_members(self, id).await?)
    }
}
