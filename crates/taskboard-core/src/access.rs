//! Workspace access management: grants, revocations, level updates, and
//! bootstrapping of the canonical default workspaces.
//!
//! Every state transition over [`WorkspaceAccess`] records goes through the
//! [`AccessManager`]; it owns the one-active-grant-per-user invariant.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use taskboard_storage::{
    AccessLevel, CreateWorkspaceParams, GrantAccessParams, Store, StoreError, UserId, Workspace,
    WorkspaceId, WorkspaceType,
};

use crate::constants::*;
use crate::{Error, Result};

/// Outcome of a bootstrap call.
#[derive(Debug)]
pub enum Bootstrap {
    /// The three canonical workspaces were created for a first-time owner.
    Provisioned(Vec<Workspace>),
    /// The owner already had workspaces; nothing was written.
    AlreadyProvisioned,
}

/// Request for creating a workspace with initial access lists.
///
/// The three lists must be pairwise disjoint; ids equal to the owner are
/// silently dropped (ownership is implicit and supersedes any grant).
#[derive(Clone, Debug)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
    pub owner_user_id: UserId,
    pub read_access_user_ids: Vec<UserId>,
    pub write_access_user_ids: Vec<UserId>,
    pub admin_access_user_ids: Vec<UserId>,
}

pub struct AccessManager<S> {
    store: Arc<S>,
}

impl<S> Clone for AccessManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> AccessManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Grant `level` access to `user_id` on a workspace.
    ///
    /// Fails with `NotFound` if the workspace does not exist, `BadRequest`
    /// if `user_id` is the workspace owner (ownership supersedes grants),
    /// and `Conflict` if the user already holds an active grant.
    pub async fn grant(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        level: AccessLevel,
    ) -> Result<()> {
        info!(workspace = %workspace_id.0, user = %user_id.0, level = level.as_str(),
              "granting workspace access");

        let workspace = self
            .store
            .get_workspace(workspace_id)
            .await
            .map_err(|e| Error::from_store(e, format!("workspace {}", workspace_id.0)))?;

        if *user_id == workspace.owner_user_id {
            warn!(workspace = %workspace_id.0, user = %user_id.0,
                  "refusing to grant access to the workspace owner");
            return Err(Error::BadRequest(format!(
                "user {} owns workspace {} and cannot be granted access",
                user_id.0, workspace_id.0
            )));
        }

        match self.store.get_active_access(workspace_id, user_id).await {
            Ok(_) => {
                warn!(workspace = %workspace_id.0, user = %user_id.0,
                      "user already has access to workspace");
                return Err(Error::Conflict(format!(
                    "user {} already has access to workspace {}",
                    user_id.0, workspace_id.0
                )));
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        self.store
            .insert_access(&GrantAccessParams {
                workspace_id: workspace_id.clone(),
                user_id: user_id.clone(),
                level,
            })
            .await
            .map_err(|e| match e {
                // lost a race against a concurrent grant
                StoreError::Conflict => Error::Conflict(format!(
                    "user {} already has access to workspace {}",
                    user_id.0, workspace_id.0
                )),
                other => other.into(),
            })
    }

    /// Revoke a user's access. Hard delete; silently succeeds when no grant
    /// exists.
    pub async fn revoke(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> Result<()> {
        info!(workspace = %workspace_id.0, user = %user_id.0, "revoking workspace access");

        self.require_workspace(workspace_id).await?;
        self.store.delete_access(workspace_id, user_id).await?;
        Ok(())
    }

    /// Overwrite the level of an existing active grant, preserving the
    /// active flag. Fails with `NotFound` when no active grant exists.
    pub async fn update_level(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        level: AccessLevel,
    ) -> Result<()> {
        info!(workspace = %workspace_id.0, user = %user_id.0, level = level.as_str(),
              "updating workspace access level");

        self.store
            .update_access_level(workspace_id, user_id, level)
            .await
            .map_err(|e| {
                Error::from_store(
                    e,
                    format!(
                        "access for user {} on workspace {}",
                        user_id.0, workspace_id.0
                    ),
                )
            })
    }

    /// User ids holding an active grant on the workspace. Order is not
    /// significant.
    pub async fn list_users(&self, workspace_id: &WorkspaceId) -> Result<Vec<UserId>> {
        self.require_workspace(workspace_id).await?;

        let records = self.store.list_active_access(workspace_id).await?;
        Ok(records.into_iter().map(|a| a.user_id).collect())
    }

    /// First-time setup: create the DEFAULT, ROADMAP, and GROUP_PROJECT
    /// workspaces for an owner. Idempotent: an owner with any existing
    /// workspace gets [`Bootstrap::AlreadyProvisioned`] and no writes.
    pub async fn bootstrap(&self, owner: &UserId) -> Result<Bootstrap> {
        let existing = self.store.list_workspaces_by_owner(owner).await?;
        if !existing.is_empty() {
            debug!(owner = %owner.0, count = existing.len(),
                   "owner already has workspaces, bootstrap skipped");
            return Ok(Bootstrap::AlreadyProvisioned);
        }

        info!(owner = %owner.0, "creating default workspaces");

        let defaults = [
            (
                DEFAULT_WORKSPACE_NAME,
                DEFAULT_WORKSPACE_DESC,
                WorkspaceType::Default,
            ),
            (
                ROADMAP_WORKSPACE_NAME,
                ROADMAP_WORKSPACE_DESC,
                WorkspaceType::Roadmap,
            ),
            (
                PROJECT_WORKSPACE_NAME,
                PROJECT_WORKSPACE_DESC,
                WorkspaceType::GroupProject,
            ),
        ];

        let mut created = Vec::with_capacity(defaults.len());
        for (name, description, workspace_type) in defaults {
            let workspace = self
                .store
                .create_workspace(&CreateWorkspaceParams {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    workspace_type,
                    owner_user_id: owner.clone(),
                })
                .await
                .map_err(|e| match e {
                    // a concurrent bootstrap for the same owner won the race
                    StoreError::AlreadyExists => Error::Conflict(format!(
                        "default workspaces already exist for owner {}",
                        owner.0
                    )),
                    other => other.into(),
                })?;
            debug!(owner = %owner.0, workspace = %workspace.id.0, name,
                   "created default workspace");
            created.push(workspace);
        }

        Ok(Bootstrap::Provisioned(created))
    }

    /// Create a workspace and grant the requested access lists in one batch.
    ///
    /// The workspace record is created first; the lists are then validated
    /// pairwise disjoint, and a violation is reported before any access
    /// record is written.
    pub async fn create_workspace(&self, request: CreateWorkspaceRequest) -> Result<Workspace> {
        info!(owner = %request.owner_user_id.0, name = %request.name, "creating workspace");

        let workspace = self
            .store
            .create_workspace(&CreateWorkspaceParams {
                name: request.name,
                description: request.description,
                workspace_type: WorkspaceType::Custom,
                owner_user_id: request.owner_user_id.clone(),
            })
            .await?;

        let lists = [
            (&request.read_access_user_ids, AccessLevel::Read),
            (&request.write_access_user_ids, AccessLevel::Write),
            (&request.admin_access_user_ids, AccessLevel::Admin),
        ];

        let mut seen = HashSet::new();
        for (users, _) in &lists {
            for user in *users {
                if !seen.insert(user.clone()) {
                    warn!(workspace = %workspace.id.0, user = %user.0,
                          "user appears in multiple access lists");
                    return Err(Error::BadRequest(format!(
                        "user {} appears in multiple access lists",
                        user.0
                    )));
                }
            }
        }

        let grants: Vec<GrantAccessParams> = lists
            .iter()
            .flat_map(|(users, level)| {
                users
                    .iter()
                    .filter(|user| **user != request.owner_user_id)
                    .map(|user| GrantAccessParams {
                        workspace_id: workspace.id.clone(),
                        user_id: user.clone(),
                        level: *level,
                    })
            })
            .collect();

        if !grants.is_empty() {
            self.store.insert_access_batch(&grants).await?;
            debug!(workspace = %workspace.id.0, grants = grants.len(),
                   "initial access records written");
        }

        Ok(workspace)
    }

    async fn require_workspace(&self, workspace_id: &WorkspaceId) -> Result<()> {
        if !self.store.workspace_exists(workspace_id).await? {
            return Err(Error::NotFound(format!("workspace {}", workspace_id.0)));
        }
        Ok(())
    }
}
