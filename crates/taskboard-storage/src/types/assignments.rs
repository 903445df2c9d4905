//! Assignment types.

use chrono::{DateTime, Utc};

use super::{AssignmentId, NewTask, RoadmapId, WorkspaceId};

/// Assignment record: a titled group of tasks inside a workspace,
/// optionally derived from a roadmap template.
#[derive(Clone, Debug)]
pub struct Assignment {
    pub id: AssignmentId,
    pub workspace_id: WorkspaceId,
    pub title: String,
    pub description: Option<String>,
    pub roadmap_id: Option<RoadmapId>,
    pub total_reward_points: Option<i32>,
    pub total_estimated_hours: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating an assignment together with its tasks.
///
/// Backends persist the assignment row and every task in a single
/// transaction; a failure leaves no partial writes.
#[derive(Clone, Debug)]
pub struct CreateAssignmentParams {
    pub workspace_id: WorkspaceId,
    pub title: String,
    pub description: Option<String>,
    pub roadmap_id: Option<RoadmapId>,
    pub total_reward_points: Option<i32>,
    pub total_estimated_hours: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub tasks: Vec<NewTask>,
}
