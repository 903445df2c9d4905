//! Canonical names and descriptions for the bootstrap workspaces.

pub const DEFAULT_WORKSPACE_NAME: &str = "Default Workspace";
pub const DEFAULT_WORKSPACE_DESC: &str = "Your personal space to organize tasks, ideas, and notes. Only you have access to this workspace.";
pub const ROADMAP_WORKSPACE_NAME: &str = "Roadmap Workspace";
pub const ROADMAP_WORKSPACE_DESC: &str = "A dedicated workspace to manage roadmaps, milestones, and learning or project journeys.";
pub const PROJECT_WORKSPACE_NAME: &str = "Project Workspace";
pub const PROJECT_WORKSPACE_DESC: &str = "A collaborative workspace for teams to work together on tasks, discussions, and shared goals.";
