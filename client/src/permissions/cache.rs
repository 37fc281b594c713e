//! Per-Role Permission Cache
//!
//! Caches each role's permission rows using `DashMap` so every screen mounted
//! for the same role shares one fetch. Entries are invalidated when a write
//! to one of the role's rows succeeds.
//!
//! Per-role generation counters keep a fetch that started before an
//! invalidation from re-inserting stale rows.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use od_common::PermissionRecord;
use tracing::debug;

use super::store::PermissionStore;
use crate::error::ClientResult;

/// Thread-safe cache of permission rows keyed by role.
#[derive(Debug)]
pub struct PermissionCache {
    rows: DashMap<String, Arc<Vec<PermissionRecord>>>,
    /// Incremented on invalidation so in-flight fetches from stale data are
    /// discarded on insert.
    generations: DashMap<String, Arc<AtomicU64>>,
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            generations: DashMap::new(),
        }
    }

    fn role_generation(&self, role: &str) -> Arc<AtomicU64> {
        self.generations
            .entry(role.to_string())
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .clone()
    }

    /// Cached rows for a role, if present.
    pub fn get(&self, role: &str) -> Option<Arc<Vec<PermissionRecord>>> {
        self.rows.get(role).map(|entry| Arc::clone(&entry))
    }

    /// Rows for a role, fetching them from `store` on a miss.
    ///
    /// Fetch errors are returned and nothing is cached.
    #[tracing::instrument(skip(self, store))]
    pub async fn get_or_fetch(
        &self,
        store: &dyn PermissionStore,
        role: &str,
    ) -> ClientResult<Arc<Vec<PermissionRecord>>> {
        if let Some(rows) = self.get(role) {
            return Ok(rows);
        }

        let gen = self.role_generation(role);
        let gen_before = gen.load(Ordering::Acquire);

        let rows = Arc::new(store.fetch_permissions_for_role(role).await?);

        // Only insert if no invalidation happened for this role meanwhile.
        if gen.load(Ordering::Acquire) == gen_before {
            self.rows.insert(role.to_string(), Arc::clone(&rows));
            debug!(role, count = rows.len(), "Cached permission rows");
        }

        Ok(rows)
    }

    /// Drop the cached rows of one role.
    pub fn invalidate(&self, role: &str) {
        self.role_generation(role).fetch_add(1, Ordering::Release);
        self.rows.remove(role);
        debug!(role, "Invalidated permission cache");
    }

    /// Drop every cached role.
    pub fn invalidate_all(&self) {
        for entry in self.generations.iter() {
            entry.value().fetch_add(1, Ordering::Release);
        }
        self.rows.clear();
        debug!("Invalidated all cached permissions");
    }

    /// Number of roles currently cached.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
