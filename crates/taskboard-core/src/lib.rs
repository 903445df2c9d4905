//! Core services for taskboard: workspace access control, roadmap
//! scheduling, and the façades composing them over a [`taskboard_storage::Store`].
//!
//! The caller identity reaching these services is an opaque, already-validated
//! [`taskboard_storage::UserId`]; nothing here authenticates it.

pub mod access;
pub mod constants;
mod error;
pub mod roadmap;
pub mod schedule;
pub mod tasks;
pub mod workspaces;

pub use access::{AccessManager, Bootstrap, CreateWorkspaceRequest};
pub use error::{Error, Result};
pub use roadmap::{RoadmapAssignmentRequest, RoadmapService, RoadmapTaskRequest};
pub use schedule::{schedule_tasks, schedule_tasks_from};
pub use tasks::TaskManager;
pub use workspaces::{AccessScope, WorkspaceDetails, WorkspaceService};

#[cfg(test)]
mod tests;
