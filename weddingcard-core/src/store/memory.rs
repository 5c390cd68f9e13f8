//! In-process record store.

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::ids::{allocate_shareable_id, new_record_id};
use super::{RecordStore, StoreError, StoreResult};
use crate::models::{WeddingPatch, WeddingRecord};

#[derive(Debug, Default)]
struct Indexes {
    /// Records by internal id.
    records: HashMap<String, WeddingRecord>,
    /// Owner -> internal id.
    by_owner: HashMap<String, String>,
    /// Shareable id -> internal id.
    by_shareable_id: HashMap<String, String>,
}

impl Indexes {
    fn is_taken(&self, candidate: &str) -> bool {
        self.records.contains_key(candidate) || self.by_shareable_id.contains_key(candidate)
    }

    fn upsert(&mut self, owner: &str, patch: &WeddingPatch) -> StoreResult<WeddingRecord> {
        if let Some(id) = self.by_owner.get(owner) {
            if let Some(record) = self.records.get_mut(id) {
                record.merge(patch);
                return Ok(record.clone());
            }
        }

        let mut id = new_record_id();
        while self.is_taken(&id) {
            id = new_record_id();
        }
        let shareable_id = allocate_shareable_id(|candidate| {
            candidate == id || self.is_taken(candidate)
        })?;

        let record = WeddingRecord::create(id.clone(), shareable_id.clone(), owner, patch);
        self.by_owner.insert(owner.to_string(), id.clone());
        self.by_shareable_id.insert(shareable_id, id.clone());
        self.records.insert(id, record.clone());

        tracing::debug!(owner, id = %record.id, "created wedding record");
        Ok(record)
    }
}

/// Record store kept entirely in memory.
///
/// Useful for tests and for running the client offline.
#[derive(Debug, Default)]
pub struct MemoryStore {
    indexes: RwLock<Indexes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.read().map(|idx| idx.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Indexes>> {
        self.indexes
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Indexes>> {
        self.indexes
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn lookup(
        &self,
        index: impl Fn(&Indexes) -> Option<&String>,
    ) -> StoreResult<Option<WeddingRecord>> {
        let idx = self.read()?;
        let idx = &*idx;
        Ok(index(idx).and_then(|id| idx.records.get(id)).cloned())
    }
}

impl RecordStore for MemoryStore {
    fn upsert<'a>(
        &'a self,
        owner: &'a str,
        patch: &'a WeddingPatch,
    ) -> BoxFuture<'a, StoreResult<WeddingRecord>> {
        Box::pin(async move { self.write()?.upsert(owner, patch) })
    }

    fn get_by_owner<'a>(
        &'a self,
        owner: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        Box::pin(async move { self.lookup(|idx| idx.by_owner.get(owner)) })
    }

    fn get_by_shareable_id<'a>(
        &'a self,
        shareable_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        Box::pin(async move { self.lookup(|idx| idx.by_shareable_id.get(shareable_id)) })
    }

    fn get_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        Box::pin(async move {
            let idx = self.read()?;
            Ok(idx.records.get(id).cloned())
        })
    }
}
