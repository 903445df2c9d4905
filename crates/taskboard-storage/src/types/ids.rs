//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// User identifier. Opaque, already validated by the caller; never
/// authenticated here.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

/// Workspace identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkspaceId(pub Uuid);

/// Assignment identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssignmentId(pub Uuid);

/// Task identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub Uuid);

/// Roadmap template identifier (assignments may link back to one).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RoadmapId(pub Uuid);
