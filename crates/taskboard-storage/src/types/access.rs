//! Per-user workspace access types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{UserId, WorkspaceId};

/// Access level granted to a user on a workspace.
///
/// Ownership is implicit and supersedes any grant; the owner is never
/// represented as an access record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    Admin,
    Write,
    Read,
}

/// Error type for parsing AccessLevel from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAccessLevelError(pub String);

impl std::fmt::Display for ParseAccessLevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid access level: {}", self.0)
    }
}

impl std::error::Error for ParseAccessLevelError {}

impl FromStr for AccessLevel {
    type Err = ParseAccessLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(AccessLevel::Admin),
            "write" => Ok(AccessLevel::Write),
            "read" => Ok(AccessLevel::Read),
            _ => Err(ParseAccessLevelError(s.to_string())),
        }
    }
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Admin => "admin",
            AccessLevel::Write => "write",
            AccessLevel::Read => "read",
        }
    }

    /// Check if this level has at least the permissions of another level
    pub fn includes(&self, other: &AccessLevel) -> bool {
        match self {
            AccessLevel::Admin => true,
            AccessLevel::Write => matches!(other, AccessLevel::Write | AccessLevel::Read),
            AccessLevel::Read => matches!(other, AccessLevel::Read),
        }
    }
}

/// Workspace access record. At most one active record per (workspace, user).
#[derive(Clone, Debug)]
pub struct WorkspaceAccess {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub level: AccessLevel,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for granting access to a workspace
#[derive(Clone, Debug)]
pub struct GrantAccessParams {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub level: AccessLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_level_includes_admin() {
        assert!(AccessLevel::Admin.includes(&AccessLevel::Admin));
        assert!(AccessLevel::Admin.includes(&AccessLevel::Write));
        assert!(AccessLevel::Admin.includes(&AccessLevel::Read));
    }

    #[test]
    fn access_level_includes_write() {
        assert!(!AccessLevel::Write.includes(&AccessLevel::Admin));
        assert!(AccessLevel::Write.includes(&AccessLevel::Write));
        assert!(AccessLevel::Write.includes(&AccessLevel::Read));
    }

    #[test]
    fn access_level_includes_read() {
        assert!(!AccessLevel::Read.includes(&AccessLevel::Admin));
        assert!(!AccessLevel::Read.includes(&AccessLevel::Write));
        assert!(AccessLevel::Read.includes(&AccessLevel::Read));
    }

    #[test]
    fn access_level_roundtrip() {
        for level in [AccessLevel::Admin, AccessLevel::Write, AccessLevel::Read] {
            let parsed: AccessLevel = level.as_str().parse().unwrap();
            assert_eq!(level, parsed);
        }
    }

    #[test]
    fn access_level_parse_invalid() {
        assert!("owner".parse::<AccessLevel>().is_err());
        assert!("ADMIN".parse::<AccessLevel>().is_err());
    }
}
