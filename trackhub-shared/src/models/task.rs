/// Task model and database operations
///
/// Tasks belong to exactly one project and carry a deadline, a status and a
/// priority. How urgent a task is (overdue, due today, ...) is never stored;
/// it is derived per request by [`crate::deadline`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('IN_PROGRESS', 'COMPLETED');
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     author_id VARCHAR(320) NOT NULL,
///     author_name VARCHAR(255) NOT NULL,
///     author_avatar VARCHAR(512),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     deadline TIMESTAMPTZ NOT NULL,
///     status task_status NOT NULL DEFAULT 'IN_PROGRESS',
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use trackhub_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
/// use chrono::{Duration, Utc};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     project_id,
///     author_id: "ada@example.com".to_string(),
///     author_name: "Ada".to_string(),
///     author_avatar: None,
///     name: "Write launch post".to_string(),
///     description: String::new(),
///     deadline: Utc::now() + Duration::days(3),
///     status: TaskStatus::InProgress,
///     priority: TaskPriority::High,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task progress status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Work is ongoing; the deadline matters
    #[default]
    InProgress,

    /// Done; the deadline no longer matters
    Completed,
}

impl TaskStatus {
    /// Converts status to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    /// Checks if the task is finished
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
        }
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// Identity of the author
    pub author_id: String,

    /// Author display name at creation time
    pub author_name: String,

    /// Author avatar URL at creation time
    pub author_avatar: Option<String>,

    /// Task name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// When the task is due
    pub deadline: DateTime<Utc>,

    /// Progress status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// A task loaded together with the assignees of its owning project
///
/// This is the shape the task-view authorizer consumes: the first tier checks
/// both the author and the owning project's assignees without a second query.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProjectTask {
    #[sqlx(flatten)]
    pub task: Task,

    /// Assignees of the project the task belongs to
    pub project_assignees: Vec<String>,
}

impl ProjectTask {
    /// Whether `identity` authored the task or is assigned to its project
    pub fn is_visible_to(&self, identity: &str) -> bool {
        self.task.author_id == identity || self.project_assignees.iter().any(|a| a == identity)
    }
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning project
    pub project_id: Uuid,

    /// Author identity
    pub author_id: String,

    /// Author display name
    pub author_name: String,

    /// Author avatar URL
    pub author_avatar: Option<String>,

    /// Task name
    pub name: String,

    /// Description
    pub description: String,

    /// Deadline
    pub deadline: DateTime<Utc>,

    /// Initial status
    #[serde(default)]
    pub status: TaskStatus,

    /// Priority
    #[serde(default)]
    pub priority: TaskPriority,
}

/// Input for updating a task
///
/// Only non-None fields are written. Status and deadline are independent:
/// changing one never touches the other.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, author_id, author_name, author_avatar,
                               name, description, deadline, status, priority)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, project_id, author_id, author_name, author_avatar, name,
                      description, deadline, status, priority, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.author_id)
        .bind(data.author_name)
        .bind(data.author_avatar)
        .bind(data.name)
        .bind(data.description)
        .bind(data.deadline)
        .bind(data.status)
        .bind(data.priority)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, author_id, author_name, author_avatar, name,
                   description, deadline, status, priority, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a project's tasks together with the project's assignees, newest first
    pub async fn list_by_project_with_members(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<ProjectTask>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, ProjectTask>(
            r#"
            SELECT t.id, t.project_id, t.author_id, t.author_name, t.author_avatar, t.name,
                   t.description, t.deadline, t.status, t.priority, t.created_at, t.updated_at,
                   p.assignees AS project_assignees
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE t.project_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task
    ///
    /// Returns None if the task doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                deadline = COALESCE($4, deadline),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, project_id, author_id, author_name, author_avatar, name,
                      description, deadline, status, priority, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.deadline)
        .bind(data.status)
        .bind(data.priority)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// ⚠️  This also deletes its comments due to CASCADE.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
