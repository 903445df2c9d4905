//! Workspace types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{UserId, WorkspaceId};

/// Kind of workspace. Immutable after creation.
///
/// Every owner gets exactly one `Default`, one `Roadmap`, and one
/// `GroupProject` workspace at bootstrap; `Custom` workspaces are unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkspaceType {
    Default,
    Roadmap,
    GroupProject,
    Custom,
}

/// Error type for parsing WorkspaceType from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWorkspaceTypeError(pub String);

impl std::fmt::Display for ParseWorkspaceTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid workspace type: {}", self.0)
    }
}

impl std::error::Error for ParseWorkspaceTypeError {}

impl FromStr for WorkspaceType {
    type Err = ParseWorkspaceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(WorkspaceType::Default),
            "roadmap" => Ok(WorkspaceType::Roadmap),
            "group_project" => Ok(WorkspaceType::GroupProject),
            "custom" => Ok(WorkspaceType::Custom),
            _ => Err(ParseWorkspaceTypeError(s.to_string())),
        }
    }
}

impl WorkspaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceType::Default => "default",
            WorkspaceType::Roadmap => "roadmap",
            WorkspaceType::GroupProject => "group_project",
            WorkspaceType::Custom => "custom",
        }
    }

    /// The canonical types every owner holds exactly one of after bootstrap.
    pub fn is_bootstrap_type(&self) -> bool {
        matches!(
            self,
            WorkspaceType::Default | WorkspaceType::Roadmap | WorkspaceType::GroupProject
        )
    }
}

/// Workspace record
#[derive(Clone, Debug)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub description: Option<String>,
    pub workspace_type: WorkspaceType,
    pub owner_user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a workspace
#[derive(Clone, Debug)]
pub struct CreateWorkspaceParams {
    pub name: String,
    pub description: Option<String>,
    pub workspace_type: WorkspaceType,
    pub owner_user_id: UserId,
}
