/// Project model and database operations
///
/// A project owns tasks and carries the membership used for authorization:
/// its `creator` and a set of `assignees`. Both are identities (emails).
/// The creator is always a member, whether or not it also appears in
/// `assignees`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     creator VARCHAR(320) NOT NULL,
///     assignees TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use trackhub_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Launch".to_string(),
///     description: "Ship the thing".to_string(),
///     creator: "ada@example.com".to_string(),
///     assignees: vec!["bob@example.com".to_string()],
/// }).await?;
///
/// assert!(project.is_member("bob@example.com"));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Identity of the owner
    pub creator: String,

    /// Identities granted access besides the creator
    pub assignees: Vec<String>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Owner identity
    pub creator: String,

    /// Collaborator identities
    #[serde(default)]
    pub assignees: Vec<String>,
}

/// Input for updating a project
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// Replacement assignee set
    pub assignees: Option<Vec<String>>,
}

impl Project {
    /// Whether `identity` is the creator
    pub fn is_creator(&self, identity: &str) -> bool {
        self.creator == identity
    }

    /// Whether `identity` is listed as an assignee
    pub fn is_assignee(&self, identity: &str) -> bool {
        self.assignees.iter().any(|a| a == identity)
    }

    /// Whether `identity` is the creator or an assignee
    pub fn is_member(&self, identity: &str) -> bool {
        self.is_creator(identity) || self.is_assignee(identity)
    }

    /// Creates a new project
    ///
    /// The creator and assignees are normalized before insert.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, creator, assignees)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, creator, assignees, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(super::user::normalize_email(&data.creator))
        .bind(normalize_assignees(data.assignees))
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, creator, assignees, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists projects `identity` created or is assigned to, newest first
    pub async fn list_for_identity(pool: &PgPool, identity: &str) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, creator, assignees, created_at, updated_at
            FROM projects
            WHERE creator = $1 OR $1 = ANY(assignees)
            ORDER BY created_at DESC
            "#,
        )
        .bind(identity)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project
    ///
    /// Returns None if the project doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                assignees = COALESCE($4, assignees),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, creator, assignees, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.assignees.map(normalize_assignees))
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project
    ///
    /// ⚠️  This also deletes its tasks and their comments due to CASCADE.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Trims, lowercases and de-duplicates an assignee list, keeping first-seen order
///
/// Blank entries are dropped.
pub fn normalize_assignees(assignees: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(assignees.len());

    for assignee in assignees {
        let assignee = super::user::normalize_email(&assignee);
        if !assignee.is_empty() && !normalized.contains(&assignee) {
            normalized.push(assignee);
        }
    }

    normalized
}
