/// Project endpoints
///
/// - `GET /v1/projects` - Projects the caller created or is assigned to
/// - `POST /v1/projects` - Create a project (caller becomes creator)
/// - `GET /v1/projects/:id` - Members only
/// - `PUT /v1/projects/:id` - Creator only
/// - `DELETE /v1/projects/:id` - Creator only, cascades to tasks and comments

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
use serde::Deserialize;
use trackhub_shared::{
    auth::{
        authorization::{require_project_creator, require_project_member},
        middleware::AuthContext,
    },
    models::project::{CreateProject, Project, UpdateProject},
};
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(max = 10000, message = "Description is too long"))]
    #[serde(default)]
    pub description: String,

    /// Assignee emails
    #[serde(default)]
    pub assignees: Vec<String>,
}

/// Update project request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,

    /// Replaces the whole assignee list
    pub assignees: Option<Vec<String>>,
}

fn validate_assignees(assignees: &[String]) -> ApiResult<()> {
    match assignees.iter().find(|a| !a.trim().validate_email()) {
        Some(bad) => Err(ApiError::invalid_field(
            "assignees",
            format!("Invalid assignee email: {}", bad),
        )),
        None => Ok(()),
    }
}

/// Loads a project or fails with 404
pub(crate) async fn load_project(state: &AppState, id: Uuid) -> ApiResult<Project> {
    Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

/// Lists the caller's projects, newest first
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_for_identity(&state.db, auth.identity()).await?;

    Ok(Json(projects))
}

/// Creates a project owned by the caller
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;
    let name = non_blank("name", &req.name)?;
    validate_assignees(&req.assignees)?;

    let project = Project::create(
        &state.db,
        CreateProject {
            name,
            description: req.description,
            creator: auth.identity().to_string(),
            assignees: req.assignees,
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, "Project created");

    Ok((StatusCode::CREATED, Json(project)))
}

/// Returns a project to its members
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    let project = load_project(&state, id).await?;
    require_project_member(auth.identity(), &project)?;

    Ok(Json(project))
}

/// Renames, describes or reassigns a project
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;
    let name = req.name.as_deref().map(|n| non_blank("name", n)).transpose()?;
    if let Some(assignees) = &req.assignees {
        validate_assignees(assignees)?;
    }

    let project = load_project(&state, id).await?;
    require_project_creator(auth.identity(), &project)?;

    let updated = Project::update(
        &state.db,
        id,
        UpdateProject {
            name,
            description: req.description,
            assignees: req.assignees,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(updated))
}

/// Deletes a project with its tasks and comments
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let project = load_project(&state, id).await?;
    require_project_creator(auth.identity(), &project)?;

    Project::delete(&state.db, id).await?;
    tracing::info!(project_id = %id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_assignees() {
        let good = vec!["ada@example.com".to_string(), " Bob@Example.com ".to_string()];
        assert!(validate_assignees(&good).is_ok());

        let bad = vec!["ada@example.com".to_string(), "not-an-email".to_string()];
        match validate_assignees(&bad) {
            Err(ApiError::ValidationError(details)) => {
                assert_eq!(details[0].field, "assignees");
                assert!(details[0].message.contains("not-an-email"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateProjectRequest = serde_json::from_str(r#"{"name":"Launch"}"#).unwrap();

        assert!(req.description.is_empty());
        assert!(req.assignees.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_empty_name() {
        let req: CreateProjectRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
