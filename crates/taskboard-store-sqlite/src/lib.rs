//! SQLite implementation of the taskboard [`Store`] trait.
//!
//! Timestamps are stored as unix seconds, ids as UUID strings. Multi-record
//! operations (assignment + tasks, access batches, cascade deletes) run in a
//! single transaction.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use taskboard_storage::{
    AccessLevel, Assignment, AssignmentId, CreateAssignmentParams, CreateWorkspaceParams,
    GrantAccessParams, RoadmapId, Store, StoreError, Task, TaskId, TaskStatus, UserId, Workspace,
    WorkspaceAccess, WorkspaceId,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// `~/.taskboard/store.db` (creates dir with 0700 perms on unix)
    pub async fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| StoreError::Backend("no home dir".into()))?
            .join(".taskboard");
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.to_string()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let path = dir.join("store.db");
        let url = format!("sqlite://{}?mode=rwc", path.to_string_lossy());
        Self::open(&url).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn backend(e: impl ToString) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// UNIQUE violations on access rows mean a concurrent/duplicate grant.
fn grant_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::Conflict
    } else {
        StoreError::Backend(s)
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(backend)
}

fn dt(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Backend(format!("timestamp out of range: {secs}")))
}

fn opt_dt(secs: Option<i64>) -> Result<Option<DateTime<Utc>>, StoreError> {
    secs.map(dt).transpose()
}

fn workspace_from_row(row: &SqliteRow) -> Result<Workspace, StoreError> {
    let id: String = row.try_get("id").map_err(backend)?;
    let owner: String = row.try_get("owner_user_id").map_err(backend)?;
    let ty: String = row.try_get("workspace_type").map_err(backend)?;
    Ok(Workspace {
        id: WorkspaceId(parse_uuid(&id)?),
        name: row.try_get("name").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        workspace_type: ty.parse().map_err(backend)?,
        owner_user_id: UserId(parse_uuid(&owner)?),
        created_at: dt(row.try_get("created_at").map_err(backend)?)?,
        updated_at: dt(row.try_get("updated_at").map_err(backend)?)?,
    })
}

fn access_from_row(row: &SqliteRow) -> Result<WorkspaceAccess, StoreError> {
    let ws: String = row.try_get("workspace_id").map_err(backend)?;
    let user: String = row.try_get("user_id").map_err(backend)?;
    let level: String = row.try_get("access_level").map_err(backend)?;
    Ok(WorkspaceAccess {
        workspace_id: WorkspaceId(parse_uuid(&ws)?),
        user_id: UserId(parse_uuid(&user)?),
        level: level.parse().map_err(backend)?,
        active: row.try_get::<i64, _>("active").map_err(backend)? != 0,
        created_at: dt(row.try_get("created_at").map_err(backend)?)?,
        updated_at: dt(row.try_get("updated_at").map_err(backend)?)?,
    })
}

fn assignment_from_row(row: &SqliteRow) -> Result<Assignment, StoreError> {
    let id: String = row.try_get("id").map_err(backend)?;
    let ws: String = row.try_get("workspace_id").map_err(backend)?;
    let roadmap: Option<String> = row.try_get("roadmap_id").map_err(backend)?;
    Ok(Assignment {
        id: AssignmentId(parse_uuid(&id)?),
        workspace_id: WorkspaceId(parse_uuid(&ws)?),
        title: row.try_get("title").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        roadmap_id: roadmap.as_deref().map(parse_uuid).transpose()?.map(RoadmapId),
        total_reward_points: row.try_get("total_reward_points").map_err(backend)?,
        total_estimated_hours: row.try_get("total_estimated_hours").map_err(backend)?,
        deadline: opt_dt(row.try_get("deadline").map_err(backend)?)?,
        created_at: dt(row.try_get("created_at").map_err(backend)?)?,
        updated_at: dt(row.try_get("updated_at").map_err(backend)?)?,
    })
}

fn task_from_row(row: &SqliteRow) -> Result<Task, StoreError> {
    let id: String = row.try_get("id").map_err(backend)?;
    let assignment: Option<String> = row.try_get("assignment_id").map_err(backend)?;
    let status: String = row.try_get("status").map_err(backend)?;
    let assignee: Option<String> = row.try_get("assignee_user_id").map_err(backend)?;
    let reporter: Option<String> = row.try_get("reporter_user_id").map_err(backend)?;
    Ok(Task {
        id: TaskId(parse_uuid(&id)?),
        assignment_id: assignment
            .as_deref()
            .map(parse_uuid)
            .transpose()?
            .map(AssignmentId),
        title: row.try_get("title").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        status: status.parse().map_err(backend)?,
        priority: row.try_get("priority").map_err(backend)?,
        reward_points: row.try_get("reward_points").map_err(backend)?,
        estimated_hours: row.try_get("estimated_hours").map_err(backend)?,
        spent_hours: row.try_get("spent_hours").map_err(backend)?,
        deadline: opt_dt(row.try_get("deadline").map_err(backend)?)?,
        started_at: opt_dt(row.try_get("started_at").map_err(backend)?)?,
        completed_at: opt_dt(row.try_get("completed_at").map_err(backend)?)?,
        order_number: row.try_get("order_number").map_err(backend)?,
        assignee_user_id: assignee.as_deref().map(parse_uuid).transpose()?.map(UserId),
        reporter_user_id: reporter.as_deref().map(parse_uuid).transpose()?.map(UserId),
        created_at: dt(row.try_get("created_at").map_err(backend)?)?,
        updated_at: dt(row.try_get("updated_at").map_err(backend)?)?,
    })
}

async fn insert_task<'e, E>(executor: E, assignment_id: &AssignmentId, task: &taskboard_storage::NewTask, now: i64) -> Result<TaskId, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let task_id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO tasks(id,assignment_id,title,description,status,priority,reward_points,
                           estimated_hours,spent_hours,deadline,started_at,completed_at,
                           order_number,assignee_user_id,reporter_user_id,created_at,updated_at)
         VALUES(?,?,?,?,?,?,?,?,0,?,NULL,NULL,?,?,?,?,?)",
    )
    .bind(task_id.to_string())
    .bind(assignment_id.0.to_string())
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status.as_str())
    .bind(task.priority)
    .bind(task.reward_points)
    .bind(task.estimated_hours)
    .bind(task.deadline.map(|d| d.timestamp()))
    .bind(task.order_number)
    .bind(task.assignee_user_id.as_ref().map(|u| u.0.to_string()))
    .bind(task.reporter_user_id.as_ref().map(|u| u.0.to_string()))
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(TaskId(task_id))
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ──────────────────────────────── Workspaces ────────────────────────────────

    async fn create_workspace(
        &self,
        params: &CreateWorkspaceParams,
    ) -> Result<Workspace, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO workspaces(id,name,description,workspace_type,owner_user_id,created_at,updated_at)
             VALUES(?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.name)
        .bind(&params.description)
        .bind(params.workspace_type.as_str())
        .bind(params.owner_user_id.0.to_string())
        .bind(now.timestamp())
        .bind(now.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let s = e.to_string();
            if s.contains("UNIQUE") {
                StoreError::AlreadyExists
            } else {
                StoreError::Backend(s)
            }
        })?;

        // re-read so the caller sees the row as persisted (second precision)
        self.get_workspace(&WorkspaceId(id)).await
    }

    async fn get_workspace(&self, workspace_id: &WorkspaceId) -> Result<Workspace, StoreError> {
        let row = sqlx::query("SELECT * FROM workspaces WHERE id=?")
            .bind(workspace_id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => workspace_from_row(&row),
        }
    }

    async fn workspace_exists(&self, workspace_id: &WorkspaceId) -> Result<bool, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM workspaces WHERE id=?")
            .bind(workspace_id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        Ok(row.is_some())
    }

    async fn list_workspaces_by_owner(&self, owner: &UserId) -> Result<Vec<Workspace>, StoreError> {
        let rows = sqlx::query("SELECT * FROM workspaces WHERE owner_user_id=? ORDER BY created_at")
            .bind(owner.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(workspace_from_row).collect()
    }

    async fn list_workspaces_shared_with(&self, user: &UserId) -> Result<Vec<Workspace>, StoreError> {
        let rows = sqlx::query(
            "SELECT w.* FROM workspaces w
             JOIN workspace_access a ON a.workspace_id = w.id
             WHERE a.user_id=? AND a.active=1
             ORDER BY w.created_at",
        )
        .bind(user.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(workspace_from_row).collect()
    }

    async fn delete_workspace(&self, workspace_id: &WorkspaceId) -> Result<(), StoreError> {
        let ws = workspace_id.0.to_string();
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // explicit cascade: tasks, assignments, access, then the workspace row
        sqlx::query(
            "DELETE FROM tasks WHERE assignment_id IN
               (SELECT id FROM assignments WHERE workspace_id=?)",
        )
        .bind(&ws)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;
        sqlx::query("DELETE FROM assignments WHERE workspace_id=?")
            .bind(&ws)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        sqlx::query("DELETE FROM workspace_access WHERE workspace_id=?")
            .bind(&ws)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        let result = sqlx::query("DELETE FROM workspaces WHERE id=?")
            .bind(&ws)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit().await.map_err(backend)
    }

    // ─────────────────────────────── Workspace access ───────────────────────────

    async fn insert_access(&self, params: &GrantAccessParams) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO workspace_access(workspace_id,user_id,access_level,active,created_at,updated_at)
             VALUES(?,?,?,1,?,?)",
        )
        .bind(params.workspace_id.0.to_string())
        .bind(params.user_id.0.to_string())
        .bind(params.level.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(grant_err)?;
        Ok(())
    }

    async fn insert_access_batch(&self, params: &[GrantAccessParams]) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await.map_err(backend)?;
        for grant in params {
            sqlx::query(
                "INSERT INTO workspace_access(workspace_id,user_id,access_level,active,created_at,updated_at)
                 VALUES(?,?,?,1,?,?)",
            )
            .bind(grant.workspace_id.0.to_string())
            .bind(grant.user_id.0.to_string())
            .bind(grant.level.as_str())
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(grant_err)?;
        }
        tx.commit().await.map_err(backend)
    }

    async fn get_active_access(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<WorkspaceAccess, StoreError> {
        let row = sqlx::query(
            "SELECT * FROM workspace_access WHERE workspace_id=? AND user_id=? AND active=1",
        )
        .bind(workspace_id.0.to_string())
        .bind(user_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => access_from_row(&row),
        }
    }

    async fn list_active_access(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<WorkspaceAccess>, StoreError> {
        let rows = sqlx::query("SELECT * FROM workspace_access WHERE workspace_id=? AND active=1")
            .bind(workspace_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(access_from_row).collect()
    }

    async fn count_active_access(&self, workspace_id: &WorkspaceId) -> Result<i64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM workspace_access WHERE workspace_id=? AND active=1")
                .bind(workspace_id.0.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(backend)?;
        Ok(count)
    }

    async fn update_access_level(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        level: AccessLevel,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE workspace_access SET access_level=?, updated_at=?
             WHERE workspace_id=? AND user_id=? AND active=1",
        )
        .bind(level.as_str())
        .bind(Utc::now().timestamp())
        .bind(workspace_id.0.to_string())
        .bind(user_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_access(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM workspace_access WHERE workspace_id=? AND user_id=?")
            .bind(workspace_id.0.to_string())
            .bind(user_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    // ──────────────────────────────── Assignments ───────────────────────────────

    async fn create_assignment(
        &self,
        params: &CreateAssignmentParams,
    ) -> Result<AssignmentId, StoreError> {
        // workspace must exist; the FK is not enforced without a pragma
        if !self.workspace_exists(&params.workspace_id).await? {
            return Err(StoreError::NotFound);
        }

        let assignment_id = AssignmentId(Uuid::now_v7());
        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query(
            "INSERT INTO assignments(id,workspace_id,title,description,roadmap_id,
                                     total_reward_points,total_estimated_hours,deadline,
                                     created_at,updated_at)
             VALUES(?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(assignment_id.0.to_string())
        .bind(params.workspace_id.0.to_string())
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.roadmap_id.as_ref().map(|r| r.0.to_string()))
        .bind(params.total_reward_points)
        .bind(params.total_estimated_hours)
        .bind(params.deadline.map(|d| d.timestamp()))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        for task in &params.tasks {
            insert_task(&mut *tx, &assignment_id, task, now)
                .await
                .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(assignment_id)
    }

    async fn get_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<Assignment, StoreError> {
        let row = sqlx::query("SELECT * FROM assignments WHERE id=?")
            .bind(assignment_id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => assignment_from_row(&row),
        }
    }

    async fn list_assignments(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<Assignment>, StoreError> {
        let rows = sqlx::query("SELECT * FROM assignments WHERE workspace_id=? ORDER BY created_at")
            .bind(workspace_id.0.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(assignment_from_row).collect()
    }

    async fn delete_assignment(&self, assignment_id: &AssignmentId) -> Result<(), StoreError> {
        let id = assignment_id.0.to_string();
        let mut tx = self.pool.begin().await.map_err(backend)?;
        sqlx::query("DELETE FROM tasks WHERE assignment_id=?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        let result = sqlx::query("DELETE FROM assignments WHERE id=?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        tx.commit().await.map_err(backend)
    }

    // ─────────────────────────────────── Tasks ──────────────────────────────────

    async fn get_task(&self, task_id: &TaskId) -> Result<Task, StoreError> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id=?")
            .bind(task_id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => task_from_row(&row),
        }
    }

    async fn list_tasks(&self, assignment_id: &AssignmentId) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM tasks WHERE assignment_id=? ORDER BY order_number ASC, rowid ASC",
        )
        .bind(assignment_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(task_from_row).collect()
    }

    async fn list_tasks_by_assignee(&self, assignee: &UserId) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM tasks WHERE assignee_user_id=?
             ORDER BY deadline IS NULL, deadline ASC, order_number ASC",
        )
        .bind(assignee.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(task_from_row).collect()
    }

    async fn list_tasks_by_status(
        &self,
        assignment_id: &AssignmentId,
        status: TaskStatus,
    ) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM tasks WHERE assignment_id=? AND status=?
             ORDER BY order_number ASC, rowid ASC",
        )
        .bind(assignment_id.0.to_string())
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(task_from_row).collect()
    }

    async fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tasks(id,assignment_id,title,description,status,priority,reward_points,
                               estimated_hours,spent_hours,deadline,started_at,completed_at,
                               order_number,assignee_user_id,reporter_user_id,created_at,updated_at)
             VALUES(?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)
             ON CONFLICT(id) DO UPDATE SET
               assignment_id=excluded.assignment_id,
               title=excluded.title,
               description=excluded.description,
               status=excluded.status,
               priority=excluded.priority,
               reward_points=excluded.reward_points,
               estimated_hours=excluded.estimated_hours,
               spent_hours=excluded.spent_hours,
               deadline=excluded.deadline,
               started_at=excluded.started_at,
               completed_at=excluded.completed_at,
               order_number=excluded.order_number,
               assignee_user_id=excluded.assignee_user_id,
               reporter_user_id=excluded.reporter_user_id,
               updated_at=excluded.updated_at",
        )
        .bind(task.id.0.to_string())
        .bind(task.assignment_id.as_ref().map(|a| a.0.to_string()))
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority)
        .bind(task.reward_points)
        .bind(task.estimated_hours)
        .bind(task.spent_hours)
        .bind(task.deadline.map(|d| d.timestamp()))
        .bind(task.started_at.map(|d| d.timestamp()))
        .bind(task.completed_at.map(|d| d.timestamp()))
        .bind(task.order_number)
        .bind(task.assignee_user_id.as_ref().map(|u| u.0.to_string()))
        .bind(task.reporter_user_id.as_ref().map(|u| u.0.to_string()))
        .bind(task.created_at.timestamp())
        .bind(task.updated_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id=?")
            .bind(task_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
