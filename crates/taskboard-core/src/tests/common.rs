//! Shared helpers for service tests.

use std::sync::Arc;

use taskboard_storage::UserId;
use taskboard_store_sqlite::SqliteStore;
use uuid::Uuid;

pub async fn memory_store() -> Arc<SqliteStore> {
    Arc::new(
        SqliteStore::open_in_memory()
            .await
            .expect("in-memory store"),
    )
}

pub fn user() -> UserId {
    UserId(Uuid::new_v4())
}
