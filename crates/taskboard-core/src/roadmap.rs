//! Roadmap assignments: turn a roadmap's task list into a scheduled
//! assignment inside the owner's ROADMAP workspace.

use std::sync::Arc;

use tracing::{error, info};

use taskboard_storage::{
    AssignmentId, CreateAssignmentParams, NewTask, RoadmapId, Store, UserId, Workspace,
};

use crate::schedule::schedule_tasks;
use crate::workspaces::WorkspaceService;
use crate::Result;

/// One task of a roadmap assignment, before identity and deadline exist.
#[derive(Clone, Debug)]
pub struct RoadmapTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub reward_points: Option<i32>,
    pub estimated_hours: Option<f64>,
    pub order_number: i32,
}

/// Request for materializing a roadmap into an assignment with tasks.
#[derive(Clone, Debug)]
pub struct RoadmapAssignmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub roadmap_id: Option<RoadmapId>,
    pub tasks: Vec<RoadmapTaskRequest>,
}

pub struct RoadmapService<S> {
    store: Arc<S>,
    workspaces: WorkspaceService<S>,
    daily_capacity_hours: f64,
}

impl<S> Clone for RoadmapService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            workspaces: self.workspaces.clone(),
            daily_capacity_hours: self.daily_capacity_hours,
        }
    }
}

impl<S: Store> RoadmapService<S> {
    pub fn new(store: Arc<S>, daily_capacity_hours: f64) -> Self {
        Self {
            workspaces: WorkspaceService::new(Arc::clone(&store)),
            store,
            daily_capacity_hours,
        }
    }

    /// Create an assignment in the owner's ROADMAP workspace, scheduling its
    /// tasks across days starting today.
    ///
    /// The owner's default workspaces are bootstrapped if missing. Aggregate
    /// reward points and estimated hours are rolled up onto the assignment,
    /// and its deadline is the latest task deadline.
    pub async fn add_roadmap_assignment(
        &self,
        request: RoadmapAssignmentRequest,
        owner: &UserId,
    ) -> Result<AssignmentId> {
        info!(owner = %owner.0, title = %request.title, tasks = request.tasks.len(),
              "adding roadmap assignment");

        let workspace = self.workspaces.roadmap_workspace(owner).await?;

        let tasks: Vec<NewTask> = request
            .tasks
            .into_iter()
            .map(|t| NewTask {
                title: t.title,
                description: t.description,
                priority: t.priority,
                reward_points: t.reward_points,
                estimated_hours: t.estimated_hours,
                order_number: t.order_number,
                reporter_user_id: Some(owner.clone()),
                ..NewTask::default()
            })
            .collect();

        let tasks = schedule_tasks(tasks, self.daily_capacity_hours)?;

        let total_reward_points = tasks
            .iter()
            .filter_map(|t| t.reward_points)
            .reduce(|a, b| a + b);
        let total_estimated_hours = tasks
            .iter()
            .filter_map(|t| t.estimated_hours)
            .reduce(|a, b| a + b);
        let deadline = tasks.iter().filter_map(|t| t.deadline).max();

        let assignment_id = self
            .store
            .create_assignment(&CreateAssignmentParams {
                workspace_id: workspace.id.clone(),
                title: request.title,
                description: request.description,
                roadmap_id: request.roadmap_id,
                total_reward_points,
                total_estimated_hours,
                deadline,
                tasks,
            })
            .await
            .map_err(|e| {
                error!(workspace = %workspace.id.0, error = %e,
                       "failed to persist roadmap assignment");
                crate::Error::from_store(e, format!("workspace {}", workspace.id.0))
            })?;

        info!(assignment = %assignment_id.0, workspace = %workspace.id.0,
              "roadmap assignment created");
        Ok(assignment_id)
    }

    /// The owner's ROADMAP workspace, bootstrapping the defaults for a
    /// first-time owner.
    pub async fn roadmap_workspace(&self, owner: &UserId) -> Result<Workspace> {
        self.workspaces.roadmap_workspace(owner).await
    }
}
