//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait `taskboard-core` depends on.
///
/// Single-record operations are atomic. The multi-record operations that the
/// core relies on for invariants run in one backend transaction:
/// [`Store::create_assignment`] (assignment + tasks),
/// [`Store::insert_access_batch`], and the cascading
/// [`Store::delete_workspace`] / [`Store::delete_assignment`].
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ──────────────────────────────── Workspaces ────────────────────────────────

    /// Create a new workspace (the backend generates the id and timestamps).
    ///
    /// Backends enforce at most one workspace per (owner, type) for the
    /// bootstrap types and report a violation as `AlreadyExists`.
    async fn create_workspace(&self, params: &CreateWorkspaceParams)
        -> Result<Workspace, StoreError>;

    /// Get workspace by id.
    async fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<Workspace, StoreError>;

    /// Cheap existence check by id.
    async fn workspace_exists(&self, workspace_id: &WorkspaceId) -> Result<bool, StoreError>;

    /// All workspaces owned by a user.
    async fn list_workspaces_by_owner(&self, owner: &UserId) -> Result<Vec<Workspace>, StoreError>;

    /// All workspaces the user holds an active access grant on (not owned ones).
    async fn list_workspaces_shared_with(&self, user: &UserId)
        -> Result<Vec<Workspace>, StoreError>;

    /// Delete a workspace and, in the same transaction, its tasks,
    /// assignments, and access records.
    async fn delete_workspace(&self, workspace_id: &WorkspaceId) -> Result<(), StoreError>;

    // ─────────────────────────────── Workspace access ───────────────────────────

    /// Insert an active access record. A second active record for the same
    /// (workspace, user) pair is rejected as `Conflict`.
    async fn insert_access(&self, params: &GrantAccessParams) -> Result<(), StoreError>;

    /// Insert a batch of access records in one transaction; any failure
    /// leaves none of them written.
    async fn insert_access_batch(&self, params: &[GrantAccessParams]) -> Result<(), StoreError>;

    /// Get the active access record for a (workspace, user) pair.
    async fn get_active_access(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<WorkspaceAccess, StoreError>;

    /// All active access records for a workspace.
    async fn list_active_access(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<WorkspaceAccess>, StoreError>;

    /// Count of active access records for a workspace.
    async fn count_active_access(&self, workspace_id: &WorkspaceId) -> Result<i64, StoreError>;

    /// Overwrite the level of the active record for (workspace, user),
    /// preserving the active flag. `NotFound` if no active record exists.
    async fn update_access_level(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        level: AccessLevel,
    ) -> Result<(), StoreError>;

    /// Hard-delete the access record for (workspace, user). No-op (Ok) when
    /// no record exists.
    async fn delete_access(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<(), StoreError>;

    // ──────────────────────────────── Assignments ───────────────────────────────

    /// Create an assignment and all of its tasks atomically.
    async fn create_assignment(
        &self,
        params: &CreateAssignmentParams,
    ) -> Result<AssignmentId, StoreError>;

    /// Get assignment by id.
    async fn get_assignment(&self, assignment_id: &AssignmentId)
        -> Result<Assignment, StoreError>;

    /// All assignments in a workspace.
    async fn list_assignments(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<Assignment>, StoreError>;

    /// Delete an assignment and its tasks in one transaction.
    async fn delete_assignment(&self, assignment_id: &AssignmentId) -> Result<(), StoreError>;

    // ─────────────────────────────────── Tasks ──────────────────────────────────

    /// Get task by id.
    async fn get_task(&self, task_id: &TaskId) -> Result<Task, StoreError>;

    /// All tasks of an assignment, ordered by `order_number` ascending.
    async fn list_tasks(&self, assignment_id: &AssignmentId) -> Result<Vec<Task>, StoreError>;

    /// All tasks assigned to a user, across assignments, earliest deadline
    /// first (tasks without a deadline last).
    async fn list_tasks_by_assignee(&self, assignee: &UserId) -> Result<Vec<Task>, StoreError>;

    /// Tasks of an assignment in the given status, ordered by `order_number`
    /// ascending.
    async fn list_tasks_by_status(
        &self,
        assignment_id: &AssignmentId,
        status: TaskStatus,
    ) -> Result<Vec<Task>, StoreError>;

    /// Save a full task row (insert-or-update by id).
    async fn update_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Delete a task. `NotFound` if it does not exist.
    async fn delete_task(&self, task_id: &TaskId) -> Result<(), StoreError>;
}
