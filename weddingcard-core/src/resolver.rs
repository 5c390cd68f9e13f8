//! Turns a request context into a record lookup.
//!
//! An owner with no saved record is a normal first visit and resolves to the
//! template, while a public identifier that matches nothing is an error the
//! visitor must see.

use std::fmt;

use crate::models::{WeddingDetails, WeddingRecord};
use crate::store::{RecordStore, StoreError};

/// Explicit inputs to a resolution. Nothing is read from ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub owner_session: Option<String>,
    pub shareable_id: Option<String>,
    pub legacy_id: Option<String>,
}

impl RequestContext {
    pub fn owner(session: impl Into<String>) -> Self {
        Self {
            owner_session: Some(session.into()),
            ..Self::default()
        }
    }

    pub fn shared(shareable_id: impl Into<String>) -> Self {
        Self {
            shareable_id: Some(shareable_id.into()),
            ..Self::default()
        }
    }

    pub fn legacy(id: impl Into<String>) -> Self {
        Self {
            legacy_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// The public identifier this request names, shareable id first.
    pub fn public_id(&self) -> Option<PublicId> {
        non_blank(&self.shareable_id)
            .map(|id| PublicId::Shareable(id.to_string()))
            .or_else(|| non_blank(&self.legacy_id).map(|id| PublicId::Legacy(id.to_string())))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// A public identifier together with the lookup it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicId {
    Shareable(String),
    Legacy(String),
}

impl PublicId {
    pub fn as_str(&self) -> &str {
        match self {
            PublicId::Shareable(id) | PublicId::Legacy(id) => id,
        }
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an owner gets back when opening the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnerRecord {
    Saved(WeddingRecord),
    /// Nothing saved yet; edit the template in memory.
    Unsaved(WeddingDetails),
}

impl OwnerRecord {
    pub fn details(&self) -> &WeddingDetails {
        match self {
            OwnerRecord::Saved(record) => &record.details,
            OwnerRecord::Unsaved(details) => details,
        }
    }

    pub fn record(&self) -> Option<&WeddingRecord> {
        match self {
            OwnerRecord::Saved(record) => Some(record),
            OwnerRecord::Unsaved(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Owner(OwnerRecord),
    Public(WeddingRecord),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A public identifier was supplied and nothing matches it.
    #[error("Wedding not found: no wedding exists for \"{0}\"")]
    RecordNotFound(PublicId),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("no owner session or wedding identifier supplied")]
    MissingIdentifier,
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::RecordNotFound(_))
    }
}

/// Resolves a request. An owner session takes precedence, then the
/// shareable id, then the legacy id.
pub async fn resolve<S: RecordStore + ?Sized>(
    store: &S,
    ctx: &RequestContext,
) -> Result<Resolved, ResolveError> {
    if let Some(owner) = non_blank(&ctx.owner_session) {
        return resolve_owner(store, owner).await.map(Resolved::Owner);
    }

    match ctx.public_id() {
        Some(id) => resolve_public_id(store, &id).await.map(Resolved::Public),
        None => Err(ResolveError::MissingIdentifier),
    }
}

/// Looks up an owner's record, substituting the template if none is saved.
pub async fn resolve_owner<S: RecordStore + ?Sized>(
    store: &S,
    owner: &str,
) -> Result<OwnerRecord, ResolveError> {
    match store.get_by_owner(owner).await? {
        Some(record) => Ok(OwnerRecord::Saved(record)),
        None => {
            tracing::debug!(owner, "no saved wedding yet, using template");
            Ok(OwnerRecord::Unsaved(WeddingDetails::default()))
        }
    }
}

/// Looks up a record by public identifier. Never substitutes a default.
pub async fn resolve_public_id<S: RecordStore + ?Sized>(
    store: &S,
    id: &PublicId,
) -> Result<WeddingRecord, ResolveError> {
    let found = match id {
        PublicId::Shareable(shareable_id) => store.get_by_shareable_id(shareable_id).await?,
        PublicId::Legacy(legacy_id) => store.get_by_id(legacy_id).await?,
    };

    found.ok_or_else(|| {
        tracing::info!(identifier = %id, "public wedding lookup found nothing");
        ResolveError::RecordNotFound(id.clone())
    })
}
