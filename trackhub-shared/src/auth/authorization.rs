/// Authorization helpers and access checks
///
/// Every decision here compares the caller's identity (an email) against
/// project and task data handed in by the caller or fetched through a
/// [`ProjectStore`]. Nothing is persisted and nothing is cached.
///
/// # Access Model
///
/// 1. **Project members**: the project's creator and its assignees.
/// 2. **Task view** (`can_access_project_tasks`): two tiers, evaluated in order.
///    - Tier 1, visible tasks: some task in the project was authored by the
///      caller, or its owning project lists the caller as assignee.
///    - Tier 2, project membership: the caller is the creator or an assignee.
/// 3. **Task creation** (`can_create_task`): project members only. There is
///    no task tier, since the project may have no tasks yet.
/// 4. **Task changes** (`can_modify_task`): the task's author or a project member.
/// 5. **Project management** (`can_manage_project`): the creator only.
///
/// Failure is closed: a missing project, a failed lookup or an empty identity
/// denies access and yields no tasks.
///
/// # Example
///
/// ```no_run
/// use trackhub_shared::auth::authorization::authorize_project_tasks;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid) {
/// let access = authorize_project_tasks(&pool, "ada@example.com", project_id).await;
/// if !access.authorized {
///     assert!(access.tasks.is_empty());
/// }
/// # }
/// ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{
    project::Project,
    task::{ProjectTask, Task},
};
use crate::store::ProjectStore;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is neither creator nor assignee of the project
    #[error("Not a member of project {0}")]
    NotMember(Uuid),

    /// Action is reserved to the project creator
    #[error("Only the creator of project {0} can do this")]
    NotCreator(Uuid),

    /// Caller may not touch this resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Which tier granted access to a task view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    /// The caller authored a task or is assigned to the tasks' project
    VisibleTasks,

    /// The caller is the project's creator or an assignee
    ProjectMembership,
}

/// Outcome of a task-view authorization
///
/// Always well-formed: a denial carries an empty task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAccess {
    /// Whether the caller may see the project's tasks
    pub authorized: bool,

    /// Tier that granted access (None when denied)
    pub tier: Option<AccessTier>,

    /// Tasks the caller may see
    pub tasks: Vec<ProjectTask>,
}

impl TaskAccess {
    /// Access denied, no tasks
    pub fn denied() -> Self {
        Self {
            authorized: false,
            tier: None,
            tasks: Vec::new(),
        }
    }

    fn granted(tier: AccessTier, tasks: Vec<ProjectTask>) -> Self {
        Self {
            authorized: true,
            tier: Some(tier),
            tasks,
        }
    }
}

/// Decides whether `identity` may view a project's tasks
///
/// `project` is only consulted when no task grants access (tier 2); pass
/// `None` when the project could not be found. On denial the returned task
/// list is empty.
///
/// # Example
///
/// ```
/// use trackhub_shared::auth::authorization::can_access_project_tasks;
///
/// let access = can_access_project_tasks("eve@example.com", None, Vec::new());
/// assert!(!access.authorized);
/// assert!(access.tasks.is_empty());
/// ```
pub fn can_access_project_tasks(
    identity: &str,
    project: Option<&Project>,
    tasks: Vec<ProjectTask>,
) -> TaskAccess {
    if identity.is_empty() {
        return TaskAccess::denied();
    }

    if has_visible_task(identity, &tasks) {
        return TaskAccess::granted(AccessTier::VisibleTasks, tasks);
    }

    match project {
        // Members see the whole list even without tasks of their own
        Some(project) if project.is_member(identity) => {
            TaskAccess::granted(AccessTier::ProjectMembership, tasks)
        }
        _ => TaskAccess::denied(),
    }
}

/// Loads and authorizes a project's task view
///
/// Tasks are loaded first; the project is only fetched when no task grants
/// access. Lookup errors and missing projects are logged and deny access,
/// they never propagate.
///
/// # Arguments
///
/// * `store` - Where projects and tasks are read from
/// * `identity` - The caller's lowercase email
/// * `project_id` - Project whose tasks are requested
///
/// # Returns
///
/// The decision with the tasks the caller may see: all of the project's
/// tasks when granted at either tier, none when denied
pub async fn authorize_project_tasks<S>(store: &S, identity: &str, project_id: Uuid) -> TaskAccess
where
    S: ProjectStore + ?Sized,
{
    if identity.is_empty() {
        warn!(%project_id, "Empty identity; denying task access");
        return TaskAccess::denied();
    }

    let tasks = match store.find_tasks_by_project_id(project_id).await {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(%project_id, error = %e, "Task lookup failed; denying task access");
            return TaskAccess::denied();
        }
    };

    if has_visible_task(identity, &tasks) {
        debug!(%project_id, task_count = tasks.len(), "Task access granted via visible tasks");
        return TaskAccess::granted(AccessTier::VisibleTasks, tasks);
    }

    let project = match store.find_project_by_id(project_id).await {
        Ok(Some(project)) => project,
        Ok(None) => {
            debug!(%project_id, "Project not found; denying task access");
            return TaskAccess::denied();
        }
        Err(e) => {
            warn!(%project_id, error = %e, "Project lookup failed; denying task access");
            return TaskAccess::denied();
        }
    };

    let access = can_access_project_tasks(identity, Some(&project), tasks);
    debug!(%project_id, authorized = access.authorized, "Task access decided via project membership");
    access
}

/// Whether `identity` may create tasks in `project`
///
/// Creator or assignee; a missing project denies.
pub fn can_create_task(identity: &str, project: Option<&Project>) -> bool {
    !identity.is_empty() && project.is_some_and(|p| p.is_member(identity))
}

/// Whether `identity` may edit or delete `task`
///
/// The author always may; otherwise project membership decides.
pub fn can_modify_task(identity: &str, project: Option<&Project>, task: &Task) -> bool {
    if identity.is_empty() {
        return false;
    }

    task.author_id == identity || project.is_some_and(|p| p.is_member(identity))
}

/// Whether `identity` may rename, reassign or delete `project`
pub fn can_manage_project(identity: &str, project: &Project) -> bool {
    !identity.is_empty() && project.is_creator(identity)
}

/// Requires project membership
///
/// # Errors
///
/// Returns `AuthzError::NotMember` if `identity` is neither creator nor assignee
pub fn require_project_member(identity: &str, project: &Project) -> Result<(), AuthzError> {
    if identity.is_empty() || !project.is_member(identity) {
        return Err(AuthzError::NotMember(project.id));
    }

    Ok(())
}

/// Requires the caller to be the project's creator
///
/// # Errors
///
/// Returns `AuthzError::NotCreator` otherwise
pub fn require_project_creator(identity: &str, project: &Project) -> Result<(), AuthzError> {
    if !can_manage_project(identity, project) {
        return Err(AuthzError::NotCreator(project.id));
    }

    Ok(())
}

/// Requires permission to edit or delete a task
///
/// # Errors
///
/// Returns `AuthzError::NotAuthorized` if [`can_modify_task`] denies
pub fn require_task_modify(
    identity: &str,
    project: Option<&Project>,
    task: &Task,
) -> Result<(), AuthzError> {
    if !can_modify_task(identity, project, task) {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

fn has_visible_task(identity: &str, tasks: &[ProjectTask]) -> bool {
    tasks.iter().any(|task| task.is_visible_to(identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    const ADA: &str = "ada@example.com";
    const BOB: &str = "bob@example.com";
    const CAROL: &str = "carol@example.com";
    const EVE: &str = "eve@example.com";

    fn project(creator: &str, assignees: &[&str]) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Launch".to_string(),
            description: String::new(),
            creator: creator.to_string(),
            assignees: assignees.iter().map(|a| a.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task_in(project: &Project, author: &str) -> ProjectTask {
        ProjectTask {
            task: Task {
                id: Uuid::new_v4(),
                project_id: project.id,
                author_id: author.to_string(),
                author_name: author.to_string(),
                author_avatar: None,
                name: "Task".to_string(),
                description: String::new(),
                deadline: Utc::now(),
                status: TaskStatus::InProgress,
                priority: TaskPriority::Medium,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            project_assignees: project.assignees.clone(),
        }
    }

    #[test]
    fn test_task_author_granted_regardless_of_project() {
        let p = project(ADA, &[]);
        let tasks = vec![task_in(&p, CAROL)];

        let access = can_access_project_tasks(CAROL, None, tasks.clone());
        assert!(access.authorized);
        assert_eq!(access.tier, Some(AccessTier::VisibleTasks));
        assert_eq!(access.tasks, tasks);
    }

    #[test]
    fn test_task_project_assignee_granted_at_first_tier() {
        let p = project(ADA, &[BOB]);
        let tasks = vec![task_in(&p, ADA)];

        let access = can_access_project_tasks(BOB, None, tasks);
        assert!(access.authorized);
        assert_eq!(access.tier, Some(AccessTier::VisibleTasks));
        assert_eq!(access.tasks.len(), 1);
    }

    #[test]
    fn test_assignee_with_empty_tasks_granted() {
        let p = project(ADA, &[BOB]);

        let access = can_access_project_tasks(BOB, Some(&p), Vec::new());
        assert!(access.authorized);
        assert_eq!(access.tier, Some(AccessTier::ProjectMembership));
        assert!(access.tasks.is_empty());
    }

    #[test]
    fn test_creator_granted_at_second_tier_with_tasks() {
        let p = project(ADA, &[BOB]);
        let tasks = vec![task_in(&p, BOB)];

        // Not an author and not an assignee, but the creator
        let access = can_access_project_tasks(ADA, Some(&p), tasks);
        assert!(access.authorized);
        assert_eq!(access.tier, Some(AccessTier::ProjectMembership));
        assert_eq!(access.tasks.len(), 1);
    }

    #[test]
    fn test_second_tier_returns_every_task() {
        let p = project(ADA, &[]);
        let tasks = vec![task_in(&p, BOB), task_in(&p, CAROL)];
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.task.id).collect();

        let access = can_access_project_tasks(ADA, Some(&p), tasks);

        assert_eq!(access.tier, Some(AccessTier::ProjectMembership));
        assert_eq!(access.tasks.iter().map(|t| t.task.id).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_unrelated_identity_denied_with_empty_tasks() {
        let p = project(ADA, &[BOB]);
        let tasks = vec![task_in(&p, ADA), task_in(&p, BOB)];

        let access = can_access_project_tasks(EVE, Some(&p), tasks);
        assert!(!access.authorized);
        assert!(access.tier.is_none());
        assert!(access.tasks.is_empty());
    }

    #[test]
    fn test_missing_project_and_no_visible_tasks_denied() {
        let access = can_access_project_tasks(ADA, None, Vec::new());
        assert_eq!(access, TaskAccess::denied());
    }

    #[test]
    fn test_empty_identity_denied() {
        let p = project("", &[""]);
        let tasks = vec![task_in(&p, "")];

        let access = can_access_project_tasks("", Some(&p), tasks);
        assert!(!access.authorized);
        assert!(access.tasks.is_empty());
    }

    #[test]
    fn test_access_is_idempotent() {
        let p = project(ADA, &[BOB]);
        let tasks = vec![task_in(&p, CAROL)];

        let first = can_access_project_tasks(BOB, Some(&p), tasks.clone());
        let second = can_access_project_tasks(BOB, Some(&p), tasks);
        assert_eq!(first, second);
    }

    #[test]
    fn test_can_create_task() {
        let p = project(ADA, &[BOB]);

        assert!(can_create_task(ADA, Some(&p)));
        assert!(can_create_task(BOB, Some(&p)));
        assert!(!can_create_task(EVE, Some(&p)));
        assert!(!can_create_task(ADA, None));
        assert!(!can_create_task("", Some(&p)));
    }

    #[test]
    fn test_can_create_task_has_no_task_shortcut() {
        // Carol authored a task here but is no longer a member
        let p = project(ADA, &[BOB]);
        let access = can_access_project_tasks(CAROL, Some(&p), vec![task_in(&p, CAROL)]);

        assert!(access.authorized);
        assert!(!can_create_task(CAROL, Some(&p)));
    }

    #[test]
    fn test_can_modify_task() {
        let p = project(ADA, &[BOB]);
        let task = task_in(&p, CAROL).task;

        assert!(can_modify_task(CAROL, None, &task));
        assert!(can_modify_task(ADA, Some(&p), &task));
        assert!(can_modify_task(BOB, Some(&p), &task));
        assert!(!can_modify_task(EVE, Some(&p), &task));
        assert!(!can_modify_task(BOB, None, &task));
    }

    #[test]
    fn test_can_manage_project() {
        let p = project(ADA, &[BOB]);

        assert!(can_manage_project(ADA, &p));
        assert!(!can_manage_project(BOB, &p));
        assert!(!can_manage_project(EVE, &p));
    }

    #[test]
    fn test_require_helpers() {
        let p = project(ADA, &[BOB]);
        let task = task_in(&p, ADA).task;

        assert!(require_project_member(BOB, &p).is_ok());
        assert!(matches!(
            require_project_member(EVE, &p),
            Err(AuthzError::NotMember(id)) if id == p.id
        ));

        assert!(require_project_creator(ADA, &p).is_ok());
        assert!(matches!(
            require_project_creator(BOB, &p),
            Err(AuthzError::NotCreator(_))
        ));

        assert!(require_task_modify(BOB, Some(&p), &task).is_ok());
        assert!(matches!(
            require_task_modify(EVE, Some(&p), &task),
            Err(AuthzError::NotAuthorized)
        ));
    }

    #[test]
    fn test_authz_error_display() {
        let err = AuthzError::NotMember(Uuid::new_v4());
        assert!(err.to_string().contains("Not a member"));

        let err = AuthzError::NotCreator(Uuid::new_v4());
        assert!(err.to_string().contains("Only the creator"));

        let err = AuthzError::NotAuthorized;
        assert!(err.to_string().contains("Not authorized"));
    }
}
