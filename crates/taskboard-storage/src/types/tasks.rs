//! Task types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{AssignmentId, TaskId, UserId};

/// Task lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Todo,
    Ongoing,
    Completed,
    Blocked,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// Error type for parsing TaskStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTaskStatusError(pub String);

impl std::fmt::Display for ParseTaskStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid task status: {}", self.0)
    }
}

impl std::error::Error for ParseTaskStatusError {}

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "ongoing" => Ok(TaskStatus::Ongoing),
            "completed" => Ok(TaskStatus::Completed),
            "blocked" => Ok(TaskStatus::Blocked),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Ongoing => "ongoing",
            TaskStatus::Completed => "completed",
            TaskStatus::Blocked => "blocked",
        }
    }
}

/// Task record.
///
/// `started_at` is set exactly once, on the first transition into `Ongoing`;
/// `completed_at` exactly once, on the first transition into `Completed`.
/// `order_number` fixes presentation and scheduling sequence within the
/// parent assignment.
#[derive(Clone, Debug)]
pub struct Task {
    pub id: TaskId,
    pub assignment_id: Option<AssignmentId>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<i32>,
    pub reward_points: Option<i32>,
    pub estimated_hours: Option<f64>,
    pub spent_hours: f64,
    pub deadline: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub order_number: i32,
    pub assignee_user_id: Option<UserId>,
    pub reporter_user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task to be created (no identity or timestamps yet).
#[derive(Clone, Debug, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<i32>,
    pub reward_points: Option<i32>,
    pub estimated_hours: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub order_number: i32,
    pub assignee_user_id: Option<UserId>,
    pub reporter_user_id: Option<UserId>,
}
