//! Permission matrix screen state.
//!
//! Roles down one axis, registry modules down the other, four toggles per
//! cell. The admin role is shown with synthesized all-true rows that can't
//! be edited.
//!
//! A change is applied with [`PermissionMatrix::begin`], persisted with
//! [`PendingChange::write`] without borrowing the matrix, and settled with
//! [`PermissionMatrix::finish`]. Between the two the new value is what
//! `record`, `cells` and `sections` report, and changes to other rows can
//! start and finish in any order.

use std::future::Future;
use std::sync::Arc;

use od_common::{
    ModuleDescriptor, PermissionField, PermissionRecord, ADMIN_ROLE, MANAGER_ROLE, USER_ROLE,
    VIRTUAL_ADMIN_ID,
};
use serde::Serialize;
use tracing::{debug, warn};

use super::service::PermissionService;
use crate::error::{ClientError, ClientResult};
use crate::optimistic::{Notifier, Optimistic, Pending};

const FAILURE_MESSAGE: &str = "Failed to update permission";

/// One module line inside a role section.
#[derive(Debug, Clone)]
pub struct MatrixRow {
    pub module: &'static ModuleDescriptor,
    /// `None` when no row is stored for this `(role, module)`.
    pub permission: Option<Optimistic<PermissionRecord>>,
}

impl MatrixRow {
    /// The row as currently displayed.
    pub fn record(&self) -> Option<&PermissionRecord> {
        self.permission.as_ref().map(Optimistic::get)
    }

    /// Indent level for the module label.
    pub const fn indent(&self) -> u8 {
        self.module.nesting_level
    }
}

/// All module lines for one role.
#[derive(Debug, Clone)]
pub struct RoleSection {
    pub role: String,
    pub read_only: bool,
    pub rows: Vec<MatrixRow>,
}

/// Flattened cell, for rendering or export to the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub role: String,
    pub module: &'static str,
    pub label: &'static str,
    pub nesting_level: u8,
    pub id: Option<i64>,
    pub can_view: bool,
    pub can_add: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub read_only: bool,
}

/// Editable role × module permission grid.
pub struct PermissionMatrix {
    service: PermissionService,
    notifier: Arc<dyn Notifier>,
    registry: &'static [ModuleDescriptor],
    sections: Vec<RoleSection>,
}

impl PermissionMatrix {
    pub fn new(
        service: PermissionService,
        notifier: Arc<dyn Notifier>,
        registry: &'static [ModuleDescriptor],
    ) -> Self {
        Self {
            service,
            notifier,
            registry,
            sections: Vec::new(),
        }
    }

    /// Fetch every stored row and rebuild the grid.
    ///
    /// On failure the error is logged, the grid is left empty and `false`
    /// is returned.
    pub async fn load(&mut self) -> bool {
        match self.service.fetch_all_permissions().await {
            Ok(records) => {
                self.sections = build_sections(records, self.registry);
                debug!(roles = self.sections.len(), "Permission matrix loaded");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to load permission matrix");
                self.sections.clear();
                false
            }
        }
    }

    pub fn sections(&self) -> &[RoleSection] {
        &self.sections
    }

    pub fn section(&self, role: &str) -> Option<&RoleSection> {
        self.sections.iter().find(|s| s.role == role)
    }

    /// The displayed row with this id, if any. Synthesized admin rows share
    /// one id and are not addressable here.
    pub fn record(&self, id: i64) -> Option<&PermissionRecord> {
        if id == VIRTUAL_ADMIN_ID {
            return None;
        }
        self.sections
            .iter()
            .flat_map(|s| &s.rows)
            .filter_map(MatrixRow::record)
            .find(|r| r.id == id)
    }

    /// Every cell in display order.
    pub fn cells(&self) -> Vec<MatrixCell> {
        self.sections
            .iter()
            .flat_map(|section| {
                section.rows.iter().map(move |row| {
                    let record = row.record();
                    let flag = |field| record.is_some_and(|r| r.get(field));
                    MatrixCell {
                        role: section.role.clone(),
                        module: row.module.key,
                        label: row.module.label,
                        nesting_level: row.module.nesting_level,
                        id: record.map(|r| r.id),
                        can_view: flag(PermissionField::CanView),
                        can_add: flag(PermissionField::CanAdd),
                        can_edit: flag(PermissionField::CanEdit),
                        can_delete: flag(PermissionField::CanDelete),
                        read_only: section.read_only,
                    }
                })
            })
            .collect()
    }

    /// Flip one flag of one stored row and wait for the write.
    pub async fn toggle(&mut self, id: i64, field: PermissionField) -> ClientResult<()> {
        let change = self.begin_toggle(id, field)?;
        let result = change.write().await;
        self.finish(change, result)
    }

    /// Set one flag of one stored row and wait for the write.
    pub async fn set(&mut self, id: i64, field: PermissionField, value: bool) -> ClientResult<()> {
        let change = self.begin(id, field, value)?;
        let result = change.write().await;
        self.finish(change, result)
    }

    /// Show the flipped flag immediately; see [`Self::begin`].
    pub fn begin_toggle(&mut self, id: i64, field: PermissionField) -> ClientResult<PendingChange> {
        let current = self
            .record(id)
            .map(|r| r.get(field))
            .ok_or_else(|| missing(id))?;
        self.begin(id, field, !current)
    }

    /// Show the new value immediately and return the change to persist.
    ///
    /// Synthesized admin rows and unknown ids are refused before anything
    /// changes.
    pub fn begin(
        &mut self,
        id: i64,
        field: PermissionField,
        value: bool,
    ) -> ClientResult<PendingChange> {
        if id == VIRTUAL_ADMIN_ID {
            return Err(ClientError::VirtualRecord);
        }

        let cell = find_cell(&mut self.sections, id).ok_or_else(|| missing(id))?;
        let snapshot = cell.apply(|r| r.set(field, value));
        debug!(id, %field, value, "Permission change applied locally");

        Ok(PendingChange {
            id,
            field,
            value,
            snapshot,
            service: self.service.clone(),
        })
    }

    /// Settle a change with the outcome of its write.
    ///
    /// Success shows the row as persisted. Failure restores the row as it
    /// was before [`Self::begin`] and raises a single notice. A row that
    /// vanished through a reload in the meantime is left alone.
    pub fn finish(
        &mut self,
        change: PendingChange,
        result: ClientResult<PermissionRecord>,
    ) -> ClientResult<()> {
        let PendingChange { id, snapshot, .. } = change;

        let result = match find_cell(&mut self.sections, id) {
            Some(cell) => cell.settle(snapshot, result),
            None => result.map(drop),
        };
        if let Err(e) = &result {
            self.notifier.notify_failure(&format!("{FAILURE_MESSAGE}: {e}"));
        }
        result
    }
}

/// A flag change shown in the matrix but not yet confirmed.
#[must_use = "a started change must be passed to `PermissionMatrix::finish`"]
pub struct PendingChange {
    id: i64,
    field: PermissionField,
    value: bool,
    snapshot: Pending<PermissionRecord>,
    service: PermissionService,
}

impl PendingChange {
    pub const fn id(&self) -> i64 {
        self.id
    }

    pub const fn field(&self) -> PermissionField {
        self.field
    }

    pub const fn value(&self) -> bool {
        self.value
    }

    /// Persist the change. The future owns what it needs, so the matrix
    /// stays readable while it runs.
    pub fn write(&self) -> impl Future<Output = ClientResult<PermissionRecord>> + Send + 'static {
        let service = self.service.clone();
        let (id, field, value) = (self.id, self.field, self.value);
        async move { service.set_permission(id, field, value).await }
    }
}

fn missing(id: i64) -> ClientError {
    ClientError::NotFound(format!("permission row {id}"))
}

fn find_cell(sections: &mut [RoleSection], id: i64) -> Option<&mut Optimistic<PermissionRecord>> {
    sections
        .iter_mut()
        .filter(|s| !s.read_only)
        .flat_map(|s| s.rows.iter_mut())
        .filter_map(|row| row.permission.as_mut())
        .find(|cell| cell.get().id == id)
}

/// Display rank of a role: admin, manager, user, then the rest by name.
fn role_rank(role: &str) -> u8 {
    match role {
        ADMIN_ROLE => 0,
        MANAGER_ROLE => 1,
        USER_ROLE => 2,
        _ => 3,
    }
}

/// Group stored rows into role sections ordered by the registry.
///
/// The admin section always exists and is made of synthesized rows; stored
/// admin rows are ignored. Rows for modules missing from the registry are
/// not shown, and a role with no other rows gets no section.
pub fn build_sections(
    records: Vec<PermissionRecord>,
    registry: &'static [ModuleDescriptor],
) -> Vec<RoleSection> {
    let in_registry = |r: &&PermissionRecord| registry.iter().any(|m| m.key == r.module);

    let mut roles: Vec<String> = records
        .iter()
        .filter(in_registry)
        .map(|r| r.role.clone())
        .filter(|role| role != ADMIN_ROLE)
        .collect();
    roles.sort_by(|a, b| role_rank(a).cmp(&role_rank(b)).then_with(|| a.cmp(b)));
    roles.dedup();

    let mut sections = Vec::with_capacity(roles.len() + 1);
    sections.push(RoleSection {
        role: ADMIN_ROLE.to_string(),
        read_only: true,
        rows: registry
            .iter()
            .map(|module| MatrixRow {
                module,
                permission: Some(Optimistic::new(PermissionRecord::virtual_admin(module.key))),
            })
            .collect(),
    });

    for role in roles {
        let rows = registry
            .iter()
            .map(|module| MatrixRow {
                module,
                permission: records
                    .iter()
                    .find(|r| r.role == role && r.module == module.key)
                    .cloned()
                    .map(Optimistic::new),
            })
            .collect();
        sections.push(RoleSection {
            role,
            read_only: false,
            rows,
        });
    }

    for orphan in records.iter().filter(|r| !in_registry(r)) {
        debug!(id = orphan.id, module = %orphan.module, "Skipping permission row for unknown module");
    }

    sections
}
