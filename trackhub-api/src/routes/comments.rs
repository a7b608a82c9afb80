/// Comment endpoints
///
/// - `GET /v1/tasks/:id/comments` - The task's thread, oldest first
/// - `POST /v1/tasks/:id/comments` - Add a comment
/// - `DELETE /v1/comments/:id` - Author only
///
/// Reading and posting need the same access as the project's task view.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::tasks::{load_task, require_task_view},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use trackhub_shared::{
    auth::{authorization::AuthzError, middleware::AuthContext},
    models::comment::{Comment, CreateComment},
};
use uuid::Uuid;
use validator::Validate;

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub content: String,
}

/// Lists a task's comments
pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    let task = load_task(&state, task_id).await?;
    require_task_view(&state, auth.identity(), &task).await?;

    let comments = Comment::list_by_task(&state.db, task.id).await?;

    Ok(Json(comments))
}

/// Adds a comment under the caller's name
pub async fn create_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()?;

    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::invalid_field("content", "Comment cannot be blank"));
    }

    let task = load_task(&state, task_id).await?;
    require_task_view(&state, auth.identity(), &task).await?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            task_id: task.id,
            author_id: auth.identity().to_string(),
            author_name: auth.display_name().to_string(),
            content: content.to_string(),
        },
    )
    .await?;

    tracing::debug!(comment_id = %comment.id, %task_id, "Comment added");

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Deletes one of the caller's comments
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let comment = Comment::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    if comment.author_id != auth.identity() {
        return Err(AuthzError::NotAuthorized.into());
    }

    Comment::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
