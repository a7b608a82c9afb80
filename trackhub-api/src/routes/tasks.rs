/// Task endpoints
///
/// - `GET /v1/projects/:id/tasks` - The project's task view (always 200)
/// - `POST /v1/projects/:id/tasks` - Create a task (project members)
/// - `GET /v1/projects/:id/tasks/create` - Whether the caller may create tasks
/// - `GET /v1/tasks/:id` - One task with urgency and comments
/// - `PUT /v1/tasks/:id` - Edit a task (author or project member)
/// - `DELETE /v1/tasks/:id` - Delete a task and its comments
///
/// Urgency is derived on every read, in the configured time zone, and never
/// stored.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::non_blank,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use trackhub_shared::{
    auth::{
        authorization::{
            authorize_project_tasks, can_create_task, can_modify_task, require_task_modify,
            AccessTier, TaskAccess,
        },
        middleware::AuthContext,
    },
    deadline::{overdue_alert_message, parse_deadline, Urgency},
    models::{
        comment::Comment,
        project::Project,
        task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
        user::User,
    },
    store::ProjectStore,
};
use uuid::Uuid;
use validator::Validate;

/// Where a client should send a caller who was denied the task view
const DENIED_REDIRECT: &str = "/";

/// A task with its derived urgency
#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,

    pub urgency: Urgency,
}

impl TaskView {
    fn new<Tz: TimeZone>(task: Task, now: DateTime<Utc>, tz: &Tz) -> Self {
        let urgency = Urgency::evaluate(task.status, task.deadline, now, tz);
        Self { task, urgency }
    }
}

/// Task view of a project
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub authorized: bool,

    /// Tier that granted access, absent when denied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessTier>,

    pub total: usize,

    /// Newest first
    pub tasks: Vec<TaskView>,

    /// One message per overdue in-progress task
    pub overdue_alerts: Vec<String>,

    /// Set when access was denied
    pub redirect_to: Option<&'static str>,
}

impl TaskListResponse {
    fn from_access<Tz: TimeZone>(access: TaskAccess, now: DateTime<Utc>, tz: &Tz) -> Self {
        let tasks: Vec<TaskView> = access
            .tasks
            .into_iter()
            .map(|pt| TaskView::new(pt.task, now, tz))
            .collect();

        let overdue_alerts = tasks
            .iter()
            .filter(|view| view.urgency.overdue)
            .map(|view| overdue_alert_message(&view.task.name))
            .collect();

        Self {
            authorized: access.authorized,
            access: access.tier,
            total: tasks.len(),
            tasks,
            overdue_alerts,
            redirect_to: (!access.authorized).then_some(DENIED_REDIRECT),
        }
    }
}

/// Task creation access
#[derive(Debug, Serialize)]
pub struct CreationAccessResponse {
    pub authorized: bool,
}

/// One task with its comments
#[derive(Debug, Serialize)]
pub struct TaskDetailResponse {
    #[serde(flatten)]
    pub view: TaskView,

    /// Oldest first
    pub comments: Vec<Comment>,

    /// Whether the caller may edit or delete the task
    pub can_modify: bool,
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 10000, message = "Description is too long"))]
    #[serde(default)]
    pub description: String,

    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub deadline: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,
}

/// Update task request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,

    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub deadline: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,
}

/// Loads a task or fails with 404
pub(crate) async fn load_task(state: &AppState, id: Uuid) -> ApiResult<Task> {
    Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Requires the caller to pass the task-view authorizer for `task`'s project
pub(crate) async fn require_task_view(state: &AppState, identity: &str, task: &Task) -> ApiResult<()> {
    let access = authorize_project_tasks(&state.db, identity, task.project_id).await;
    if !access.authorized {
        return Err(ApiError::Forbidden(
            "Not authorized to view this task".to_string(),
        ));
    }

    Ok(())
}

/// Returns the project's task view
///
/// Never fails on authorization or lookup problems: a denied caller gets
/// `authorized: false`, no tasks and a `redirect_to` target.
pub async fn list_project_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
) -> Json<TaskListResponse> {
    let access = authorize_project_tasks(&state.db, auth.identity(), project_id).await;

    Json(TaskListResponse::from_access(
        access,
        Utc::now(),
        &state.timezone(),
    ))
}

/// Reports whether the caller may create tasks in the project
pub async fn task_creation_access(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
) -> Json<CreationAccessResponse> {
    let project = match state.db.find_project_by_id(project_id).await {
        Ok(project) => project,
        Err(e) => {
            tracing::warn!(%project_id, error = %e, "Project lookup failed; denying task creation");
            None
        }
    };

    Json(CreationAccessResponse {
        authorized: can_create_task(auth.identity(), project.as_ref()),
    })
}

/// Creates a task authored by the caller
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the project (or it doesn't exist)
/// - `422 Unprocessable Entity`: Validation failed or the deadline is unparseable
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    req.validate()?;
    let name = non_blank("name", &req.name)?;
    let tz = state.timezone();
    let deadline = parse_deadline(&req.deadline, &tz)?;

    let project = Project::find_by_id(&state.db, project_id).await?;
    if !can_create_task(auth.identity(), project.as_ref()) {
        return Err(ApiError::Forbidden(
            "Not authorized to create tasks in this project".to_string(),
        ));
    }

    let author = User::find_by_id(&state.db, auth.user_id).await?;
    let author_name = author
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| auth.display_name().to_string());
    let author_avatar = author.and_then(|u| u.avatar_url);

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id,
            author_id: auth.identity().to_string(),
            author_name,
            author_avatar,
            name,
            description: req.description,
            deadline,
            status: req.status,
            priority: req.priority,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, %project_id, "Task created");

    Ok((StatusCode::CREATED, Json(TaskView::new(task, Utc::now(), &tz))))
}

/// Returns one task with urgency and comments
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskDetailResponse>> {
    let task = load_task(&state, id).await?;
    require_task_view(&state, auth.identity(), &task).await?;

    let project = Project::find_by_id(&state.db, task.project_id).await?;
    let can_modify = can_modify_task(auth.identity(), project.as_ref(), &task);
    let comments = Comment::list_by_task(&state.db, task.id).await?;

    Ok(Json(TaskDetailResponse {
        view: TaskView::new(task, Utc::now(), &state.timezone()),
        comments,
        can_modify,
    }))
}

/// Edits a task
///
/// Status and deadline change independently; completing a task leaves its
/// deadline as is.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskView>> {
    req.validate()?;
    let name = req.name.as_deref().map(|n| non_blank("name", n)).transpose()?;
    let tz = state.timezone();
    let deadline = req
        .deadline
        .as_deref()
        .map(|d| parse_deadline(d, &tz))
        .transpose()?;

    let task = load_task(&state, id).await?;
    let project = Project::find_by_id(&state.db, task.project_id).await?;
    require_task_modify(auth.identity(), project.as_ref(), &task)?;

    let updated = Task::update(
        &state.db,
        id,
        UpdateTask {
            name,
            description: req.description,
            deadline,
            status: req.status,
            priority: req.priority,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskView::new(updated, Utc::now(), &tz)))
}

/// Deletes a task and its comments
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let task = load_task(&state, id).await?;
    let project = Project::find_by_id(&state.db, task.project_id).await?;
    require_task_modify(auth.identity(), project.as_ref(), &task)?;

    Task::delete(&state.db, id).await?;
    tracing::info!(task_id = %id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use trackhub_shared::models::task::ProjectTask;

    fn task(name: &str, status: TaskStatus, deadline: DateTime<Utc>) -> ProjectTask {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        ProjectTask {
            task: Task {
                id: Uuid::new_v4(),
                project_id: Uuid::new_v4(),
                author_id: "ada@example.com".to_string(),
                author_name: "Ada".to_string(),
                author_avatar: None,
                name: name.to_string(),
                description: String::new(),
                deadline,
                status,
                priority: TaskPriority::Medium,
                created_at: created,
                updated_at: created,
            },
            project_assignees: vec!["bob@example.com".to_string()],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_denied_view_redirects() {
        let response = TaskListResponse::from_access(TaskAccess::denied(), now(), &Utc);

        assert!(!response.authorized);
        assert_eq!(response.total, 0);
        assert!(response.tasks.is_empty());
        assert!(response.overdue_alerts.is_empty());
        assert_eq!(response.redirect_to, Some("/"));
    }

    #[test]
    fn test_granted_view_annotates_tasks() {
        let access = TaskAccess {
            authorized: true,
            tier: Some(AccessTier::VisibleTasks),
            tasks: vec![
                task("Late", TaskStatus::InProgress, now() - Duration::days(3)),
                task("Done late", TaskStatus::Completed, now() - Duration::days(3)),
                task("Soon", TaskStatus::InProgress, now() + Duration::days(1)),
            ],
        };

        let response = TaskListResponse::from_access(access, now(), &Utc);

        assert!(response.authorized);
        assert_eq!(response.redirect_to, None);
        assert_eq!(response.total, 3);

        let labels: Vec<&str> = response.tasks.iter().map(|v| v.urgency.label.as_str()).collect();
        assert_eq!(labels, vec!["Overdue", "Completed", "Due in 1 day"]);

        assert_eq!(
            response.overdue_alerts,
            vec!["Important: Task \"Late\" is overdue. You can change the deadline.".to_string()]
        );
    }

    #[test]
    fn test_urgency_uses_configured_zone() {
        // 23:30 UTC on the 10th is already the 11th at UTC+2
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let deadline = Utc.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap();
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();

        let utc_view = TaskView::new(task("T", TaskStatus::InProgress, deadline).task, now, &Utc);
        let local_view = TaskView::new(task("T", TaskStatus::InProgress, deadline).task, now, &tz);

        assert_eq!(utc_view.urgency.label, "Due in 1 day");
        assert_eq!(local_view.urgency.label, "Due is Today");
    }

    #[test]
    fn test_task_view_serializes_flat() {
        let view = TaskView::new(task("Flat", TaskStatus::InProgress, now()).task, now(), &Utc);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["name"], "Flat");
        assert_eq!(json["status"], "IN_PROGRESS");
        assert_eq!(json["urgency"]["label"], "Due is Today");
        assert_eq!(json["urgency"]["remaining_days"], 0);
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateTaskRequest =
            serde_json::from_str(r#"{"name":"Write docs","deadline":"2024-03-11"}"#).unwrap();

        assert_eq!(req.status, TaskStatus::InProgress);
        assert_eq!(req.priority, TaskPriority::Medium);
        assert!(req.validate().is_ok());
    }
}
