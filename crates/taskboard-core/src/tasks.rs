//! Task lifecycle: status transitions, assignment, time tracking, and
//! deletion.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};

use taskboard_storage::{Assignment, AssignmentId, Store, Task, TaskId, TaskStatus, UserId};

use crate::{Error, Result};

pub struct TaskManager<S> {
    store: Arc<S>,
}

// timestamps persist as unix seconds; stamp at the same precision so a
// returned task equals its re-read row
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

impl<S> Clone for TaskManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> TaskManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn get(&self, task_id: &TaskId) -> Result<Task> {
        self.store
            .get_task(task_id)
            .await
            .map_err(|e| Error::from_store(e, format!("task {}", task_id.0)))
    }

    pub async fn get_assignment(&self, assignment_id: &AssignmentId) -> Result<Assignment> {
        self.store
            .get_assignment(assignment_id)
            .await
            .map_err(|e| Error::from_store(e, format!("assignment {}", assignment_id.0)))
    }

    /// Tasks of an assignment, ordered by `order_number` ascending.
    pub async fn list_by_assignment(&self, assignment_id: &AssignmentId) -> Result<Vec<Task>> {
        Ok(self.store.list_tasks(assignment_id).await?)
    }

    /// Tasks assigned to a user, earliest deadline first.
    pub async fn list_by_assignee(&self, assignee: &UserId) -> Result<Vec<Task>> {
        Ok(self.store.list_tasks_by_assignee(assignee).await?)
    }

    /// Tasks of an assignment currently in `status`.
    pub async fn list_by_status(
        &self,
        assignment_id: &AssignmentId,
        status: TaskStatus,
    ) -> Result<Vec<Task>> {
        Ok(self.store.list_tasks_by_status(assignment_id, status).await?)
    }

    /// Move a task to a new status.
    ///
    /// `started_at` is stamped on the first transition into `Ongoing` and
    /// `completed_at` on the first transition into `Completed`; neither is
    /// ever overwritten by later transitions.
    pub async fn update_status(&self, task_id: &TaskId, status: TaskStatus) -> Result<Task> {
        let mut task = self.get(task_id).await?;
        info!(task = %task_id.0, from = task.status.as_str(), to = status.as_str(),
              "updating task status");

        let now = now();
        if status == TaskStatus::Ongoing && task.status != TaskStatus::Ongoing {
            task.started_at.get_or_insert(now);
        }
        if status == TaskStatus::Completed && task.status != TaskStatus::Completed {
            task.completed_at.get_or_insert(now);
        }
        task.status = status;
        task.updated_at = now;

        self.store.update_task(&task).await?;
        Ok(task)
    }

    /// Set or clear the task's assignee.
    pub async fn assign(&self, task_id: &TaskId, assignee: Option<UserId>) -> Result<Task> {
        let mut task = self.get(task_id).await?;
        debug!(task = %task_id.0,
               assignee = assignee.as_ref().map(|u| u.0.to_string()).unwrap_or_default(),
               "assigning task");

        task.assignee_user_id = assignee;
        task.updated_at = now();

        self.store.update_task(&task).await?;
        Ok(task)
    }

    /// Add logged hours to the task's running total.
    pub async fn add_time_spent(&self, task_id: &TaskId, hours: f64) -> Result<Task> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(Error::BadRequest(format!(
                "hours spent cannot be negative, got {hours}"
            )));
        }

        let mut task = self.get(task_id).await?;
        task.spent_hours += hours;
        task.updated_at = now();
        debug!(task = %task_id.0, added = hours, total = task.spent_hours,
               "recorded time spent");

        self.store.update_task(&task).await?;
        Ok(task)
    }

    pub async fn delete(&self, task_id: &TaskId) -> Result<()> {
        info!(task = %task_id.0, "deleting task");
        self.store
            .delete_task(task_id)
            .await
            .map_err(|e| Error::from_store(e, format!("task {}", task_id.0)))
    }
}
