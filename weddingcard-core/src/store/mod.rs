//! Keyed storage of wedding records.
//!
//! A store holds at most one record per owner and indexes every record by
//! its internal id and by its public shareable id. Lookups that find
//! nothing return `Ok(None)`; `Err` is reserved for the store itself being
//! unreachable.

pub mod ids;
mod memory;

use futures::future::BoxFuture;
use std::sync::Arc;

use crate::models::{WeddingPatch, WeddingRecord};

pub use memory::MemoryStore;

/// Errors raised by a record store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing storage could not be reached. Retryable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Every candidate shareable id was already taken.
    #[error("could not allocate a unique shareable id after {0} attempts")]
    IdsExhausted(usize),
}

impl StoreError {
    /// True if trying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable keyed storage of [`WeddingRecord`]s.
///
/// Methods return boxed futures so the trait stays object safe and usable
/// from spawned tasks.
pub trait RecordStore: Send + Sync {
    /// Merges `patch` into the owner's record, creating it from the template
    /// if the owner has none yet. Returns the full resulting record.
    fn upsert<'a>(
        &'a self,
        owner: &'a str,
        patch: &'a WeddingPatch,
    ) -> BoxFuture<'a, StoreResult<WeddingRecord>>;

    fn get_by_owner<'a>(&'a self, owner: &'a str)
        -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>>;

    fn get_by_shareable_id<'a>(
        &'a self,
        shareable_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>>;

    /// Lookup by internal id, kept for links minted before shareable ids.
    fn get_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn upsert<'a>(
        &'a self,
        owner: &'a str,
        patch: &'a WeddingPatch,
    ) -> BoxFuture<'a, StoreResult<WeddingRecord>> {
        (**self).upsert(owner, patch)
    }

    fn get_by_owner<'a>(
        &'a self,
        owner: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        (**self).get_by_owner(owner)
    }

    fn get_by_shareable_id<'a>(
        &'a self,
        shareable_id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        (**self).get_by_shareable_id(shareable_id)
    }

    fn get_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StoreResult<Option<WeddingRecord>>> {
        (**self).get_by_id(id)
    }
}
