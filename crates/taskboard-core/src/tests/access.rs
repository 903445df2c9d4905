use std::sync::Arc;

use taskboard_storage::{AccessLevel, Store, WorkspaceType};

use crate::access::{AccessManager, Bootstrap, CreateWorkspaceRequest};
use crate::constants::*;
use crate::tests::common::{memory_store, user};
use crate::Error;

#[tokio::test]
async fn bootstrap_creates_three_canonical_workspaces() {
    let store = memory_store().await;
    let access = AccessManager::new(Arc::clone(&store));
    let owner = user();

    let Bootstrap::Provisioned(created) = access.bootstrap(&owner).await.unwrap() else {
        panic!("expected fresh owner to be provisioned");
    };

    assert_eq!(created.len(), 3);
    let by_type = |ty: WorkspaceType| created.iter().find(|w| w.workspace_type == ty).unwrap();

    let default = by_type(WorkspaceType::Default);
    assert_eq!(default.name, DEFAULT_WORKSPACE_NAME);
    assert_eq!(default.description.as_deref(), Some(DEFAULT_WORKSPACE_DESC));
    assert_eq!(default.owner_user_id, owner);

    assert_eq!(by_type(WorkspaceType::Roadmap).name, ROADMAP_WORKSPACE_NAME);
    assert_eq!(
        by_type(WorkspaceType::GroupProject).name,
        PROJECT_WORKSPACE_NAME
    );
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let store = memory_store().await;
    let access = AccessManager::new(Arc::clone(&store));
    let owner = user();

    access.bootstrap(&owner).await.unwrap();
    assert!(matches!(
        access.bootstrap(&owner).await.unwrap(),
        Bootstrap::AlreadyProvisioned
    ));

    let owned = store.list_workspaces_by_owner(&owner).await.unwrap();
    assert_eq!(owned.len(), 3);
}

#[tokio::test]
async fn grant_list_revoke_cycle() {
    let store = memory_store().await;
    let access = AccessManager::new(Arc::clone(&store));
    let owner = user();
    let member = user();

    let Bootstrap::Provisioned(created) = access.bootstrap(&owner).await.unwrap() else {
        panic!("expected provisioning");
    };
    let workspace_id = created[0].id.clone();

    access
        .grant(&workspace_id, &member, AccessLevel::Write)
        .await
        .unwrap();
    assert_eq!(access.list_users(&workspace_id).await.unwrap(), vec![member.clone()]);

    access.revoke(&workspace_id, &member).await.unwrap();
    assert!(access.list_users(&workspace_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn grant_on_missing_workspace_is_not_found() {
    let store = memory_store().await;
    let access = AccessManager::new(store);

    let missing = taskboard_storage::WorkspaceId(uuid::Uuid::new_v4());
    let result = access.grant(&missing, &user(), AccessLevel::Read).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn grant_to_owner_is_rejected() {
    let store = memory_store().await;
    let access = AccessManager::new(Arc::clone(&store));
    let owner = user();

    let Bootstrap::Provisioned(created) = access.bootstrap(&owner).await.unwrap() else {
        panic!("expected provisioning");
    };
    let workspace_id = created[0].id.clone();

    let result = access.grant(&workspace_id, &owner, AccessLevel::Write).await;
    assert!(matches!(result, Err(Error::BadRequest(_))));

    // ownership stays implicit, never an access record
    assert!(access.list_users(&workspace_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_grant_is_conflict() {
    let store = memory_store().await;
    let access = AccessManager::new(store);
    let owner = user();
    let member = user();

    let Bootstrap::Provisioned(created) = access.bootstrap(&owner).await.unwrap() else {
        panic!("expected provisioning");
    };
    let workspace_id = created[0].id.clone();

    access
        .grant(&workspace_id, &member, AccessLevel::Read)
        .await
        .unwrap();
    let result = access.grant(&workspace_id, &member, AccessLevel::Admin).await;
    assert!(matches!(result, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn revoke_without_grant_is_a_no_op() {
    let store = memory_store().await;
    let access = AccessManager::new(store);
    let owner = user();

    let Bootstrap::Provisioned(created) = access.bootstrap(&owner).await.unwrap() else {
        panic!("expected provisioning");
    };

    access.revoke(&created[0].id, &user()).await.unwrap();
}

#[tokio::test]
async fn update_level_overwrites_existing_grant() {
    let store = memory_store().await;
    let access = AccessManager::new(Arc::clone(&store));
    let owner = user();
    let member = user();

    let Bootstrap::Provisioned(created) = access.bootstrap(&owner).await.unwrap() else {
        panic!("expected provisioning");
    };
    let workspace_id = created[0].id.clone();

    access
        .grant(&workspace_id, &member, AccessLevel::Read)
        .await
        .unwrap();
    access
        .update_level(&workspace_id, &member, AccessLevel::Admin)
        .await
        .unwrap();

    let record = store.get_active_access(&workspace_id, &member).await.unwrap();
    assert_eq!(record.level, AccessLevel::Admin);
    assert!(record.active);
}

#[tokio::test]
async fn update_level_without_grant_is_not_found() {
    let store = memory_store().await;
    let access = AccessManager::new(store);
    let owner = user();

    let Bootstrap::Provisioned(created) = access.bootstrap(&owner).await.unwrap() else {
        panic!("expected provisioning");
    };

    let result = access
        .update_level(&created[0].id, &user(), AccessLevel::Write)
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn create_workspace_writes_grants_at_requested_levels() {
    let store = memory_store().await;
    let access = AccessManager::new(Arc::clone(&store));
    let owner = user();
    let reader = user();
    let writer = user();
    let admin = user();

    let workspace = access
        .create_workspace(CreateWorkspaceRequest {
            name: "shared project".to_string(),
            description: Some("a shared space".to_string()),
            owner_user_id: owner.clone(),
            read_access_user_ids: vec![reader.clone()],
            write_access_user_ids: vec![writer.clone()],
            admin_access_user_ids: vec![admin.clone()],
        })
        .await
        .unwrap();

    assert_eq!(workspace.workspace_type, WorkspaceType::Custom);

    let level_of = |records: &[taskboard_storage::WorkspaceAccess], user: &taskboard_storage::UserId| {
        records.iter().find(|a| a.user_id == *user).unwrap().level
    };
    let records = store.list_active_access(&workspace.id).await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(level_of(&records, &reader), AccessLevel::Read);
    assert_eq!(level_of(&records, &writer), AccessLevel::Write);
    assert_eq!(level_of(&records, &admin), AccessLevel::Admin);
}

#[tokio::test]
async fn create_workspace_skips_owner_in_access_lists() {
    let store = memory_store().await;
    let access = AccessManager::new(Arc::clone(&store));
    let owner = user();

    let workspace = access
        .create_workspace(CreateWorkspaceRequest {
            name: "mine".to_string(),
            description: None,
            owner_user_id: owner.clone(),
            read_access_user_ids: vec![],
            write_access_user_ids: vec![owner.clone()],
            admin_access_user_ids: vec![],
        })
        .await
        .unwrap();

    let records = store.list_active_access(&workspace.id).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn create_workspace_rejects_overlapping_lists_before_granting() {
    let store = memory_store().await;
    let access = AccessManager::new(Arc::clone(&store));
    let owner = user();
    let duplicated = user();

    let result = access
        .create_workspace(CreateWorkspaceRequest {
            name: "overlap".to_string(),
            description: None,
            owner_user_id: owner.clone(),
            read_access_user_ids: vec![duplicated.clone()],
            write_access_user_ids: vec![duplicated.clone()],
            admin_access_user_ids: vec![],
        })
        .await;
    assert!(matches!(result, Err(Error::BadRequest(_))));

    // the workspace record persists, but no access was written
    let owned = store.list_workspaces_by_owner(&owner).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(store.count_active_access(&owned[0].id).await.unwrap(), 0);
}
