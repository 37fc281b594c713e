//! Permission Store
//!
//! Read and single-field write access to the `(role, module)` permission
//! table. Rows are seeded elsewhere; this layer never creates or deletes them.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use od_common::{PermissionField, PermissionRecord, VIRTUAL_ADMIN_ID};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::{DataApiClient, Query};
use crate::error::{ClientError, ClientResult};

/// Backing table of permission rows.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Every row, for every role and module.
    async fn fetch_all_permissions(&self) -> ClientResult<Vec<PermissionRecord>>;

    /// Every row for one role.
    async fn fetch_permissions_for_role(&self, role: &str) -> ClientResult<Vec<PermissionRecord>>;

    /// Set one flag on one row and return the row as persisted.
    async fn update_permission_field(
        &self,
        id: i64,
        field: PermissionField,
        value: bool,
    ) -> ClientResult<PermissionRecord>;
}

/// Permission store backed by the REST data API.
#[derive(Clone)]
pub struct RestPermissionStore {
    api: DataApiClient,
    table: String,
}

impl RestPermissionStore {
    pub fn new(api: DataApiClient, table: impl Into<String>) -> Self {
        Self {
            api,
            table: table.into(),
        }
    }
}

#[async_trait]
impl PermissionStore for RestPermissionStore {
    async fn fetch_all_permissions(&self) -> ClientResult<Vec<PermissionRecord>> {
        let query = Query::new()
            .select("*")
            .order("role", true)
            .order("module", true);
        self.api.select(&self.table, &query).await
    }

    async fn fetch_permissions_for_role(&self, role: &str) -> ClientResult<Vec<PermissionRecord>> {
        let query = Query::new().select("*").eq("role", role);
        self.api.select(&self.table, &query).await
    }

    async fn update_permission_field(
        &self,
        id: i64,
        field: PermissionField,
        value: bool,
    ) -> ClientResult<PermissionRecord> {
        if id == VIRTUAL_ADMIN_ID {
            return Err(ClientError::VirtualRecord);
        }

        let mut body = Map::new();
        body.insert(field.column().to_string(), Value::Bool(value));

        let mut rows: Vec<PermissionRecord> = self
            .api
            .update(&self.table, &Query::new().eq("id", id), &body)
            .await?;

        debug!(id, %field, value, "Permission field updated");
        rows.pop()
            .ok_or_else(|| ClientError::NotFound(format!("{} {id}", self.table)))
    }
}

/// In-memory permission store.
///
/// Used by tests and by consumers running without a backend. Reads and
/// writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    rows: Mutex<Vec<PermissionRecord>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
}

impl MemoryPermissionStore {
    pub fn new(rows: Vec<PermissionRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of read calls served or refused so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Current contents of the table.
    pub fn rows(&self) -> Vec<PermissionRecord> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn begin_read(&self) -> ClientResult<Vec<PermissionRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.rows())
    }
}

fn unavailable() -> ClientError {
    ClientError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "permission store unavailable".into(),
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn fetch_all_permissions(&self) -> ClientResult<Vec<PermissionRecord>> {
        let mut rows = self.begin_read()?;
        rows.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.module.cmp(&b.module)));
        Ok(rows)
    }

    async fn fetch_permissions_for_role(&self, role: &str) -> ClientResult<Vec<PermissionRecord>> {
        let mut rows = self.begin_read()?;
        rows.retain(|r| r.role == role);
        Ok(rows)
    }

    async fn update_permission_field(
        &self,
        id: i64,
        field: PermissionField,
        value: bool,
    ) -> ClientResult<PermissionRecord> {
        if id == VIRTUAL_ADMIN_ID {
            return Err(ClientError::VirtualRecord);
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        let mut rows = self
            .rows
            .lock()
            .map_err(|_| ClientError::Decode("permission table lock poisoned".into()))?;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("permissions {id}")))?;
        row.set(field, value);
        Ok(row.clone())
    }
}
