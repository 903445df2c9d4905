//! Workspace queries and lifecycle: listing with bootstrap-on-empty,
//! accessible-workspace resolution, details, and cascading deletion.

use std::sync::Arc;

use tracing::{debug, info};

use taskboard_storage::{Store, UserId, Workspace, WorkspaceId, WorkspaceType};

use crate::access::{AccessManager, Bootstrap};
use crate::{Error, Result};

/// Which workspaces count as "accessible" for a user.
///
/// The shipped behavior is owned-only; `OwnedAndShared` additionally includes
/// workspaces the user holds an active access grant on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessScope {
    OwnedOnly,
    OwnedAndShared,
}

/// A workspace together with its access roster.
#[derive(Clone, Debug)]
pub struct WorkspaceDetails {
    pub workspace: Workspace,
    pub access_user_ids: Vec<UserId>,
    pub user_access_count: i64,
}

pub struct WorkspaceService<S> {
    store: Arc<S>,
    access: AccessManager<S>,
}

impl<S> Clone for WorkspaceService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            access: self.access.clone(),
        }
    }
}

impl<S: Store> WorkspaceService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            access: AccessManager::new(Arc::clone(&store)),
            store,
        }
    }

    /// A workspace with its active access user ids and count.
    pub async fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<WorkspaceDetails> {
        let workspace = self
            .store
            .get_workspace(workspace_id)
            .await
            .map_err(|e| Error::from_store(e, format!("workspace {}", workspace_id.0)))?;

        let access_user_ids = self
            .store
            .list_active_access(workspace_id)
            .await?
            .into_iter()
            .map(|a| a.user_id)
            .collect();
        let user_access_count = self.store.count_active_access(workspace_id).await?;

        Ok(WorkspaceDetails {
            workspace,
            access_user_ids,
            user_access_count,
        })
    }

    /// Workspaces owned by `owner`, bootstrapping the defaults for a
    /// first-time owner.
    pub async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Workspace>> {
        let owned = self.store.list_workspaces_by_owner(owner).await?;
        if !owned.is_empty() {
            return Ok(owned);
        }

        debug!(owner = %owner.0, "no workspaces found, bootstrapping defaults");
        match self.access.bootstrap(owner).await? {
            Bootstrap::Provisioned(workspaces) => Ok(workspaces),
            // raced another bootstrap; re-read what it wrote
            Bootstrap::AlreadyProvisioned => Ok(self.store.list_workspaces_by_owner(owner).await?),
        }
    }

    /// Workspaces the user can reach under the given scope. Shared
    /// workspaces never duplicate owned ones: the owner is never represented
    /// as an access record.
    pub async fn accessible_workspaces(
        &self,
        user: &UserId,
        scope: AccessScope,
    ) -> Result<Vec<Workspace>> {
        let mut workspaces = self.store.list_workspaces_by_owner(user).await?;
        if scope == AccessScope::OwnedAndShared {
            workspaces.extend(self.store.list_workspaces_shared_with(user).await?);
        }
        debug!(user = %user.0, ?scope, count = workspaces.len(), "resolved accessible workspaces");
        Ok(workspaces)
    }

    /// The owner's unique ROADMAP workspace, bootstrapping the defaults for
    /// a first-time owner.
    pub async fn roadmap_workspace(&self, owner: &UserId) -> Result<Workspace> {
        let workspaces = self.list_for_owner(owner).await?;

        workspaces
            .into_iter()
            .find(|w| w.workspace_type == WorkspaceType::Roadmap)
            .ok_or_else(|| Error::NotFound(format!("roadmap workspace for user {}", owner.0)))
    }

    /// Delete a workspace, cascading to its assignments, tasks, and access
    /// records.
    pub async fn delete_workspace(&self, workspace_id: &WorkspaceId) -> Result<()> {
        info!(workspace = %workspace_id.0, "deleting workspace");

        self.store
            .delete_workspace(workspace_id)
            .await
            .map_err(|e| Error::from_store(e, format!("workspace {}", workspace_id.0)))
    }

    /// Access management over this service's store.
    pub fn access(&self) -> &AccessManager<S> {
        &self.access
    }
}
