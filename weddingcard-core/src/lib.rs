//! WeddingCard Core Library
//!
//! Wedding record model, record stores, resolution of owner and public
//! requests, and debounced autosave for the dashboard editor.

pub mod api;
pub mod autosave;
pub mod cache;
pub mod client;
pub mod models;
pub mod public;
pub mod resolver;
pub mod store;

pub use autosave::{AutosaveConfig, AutosaveCoordinator, AutosaveError, Draft, SaveEvent};
pub use cache::{CacheEntry, CacheError, LocalCache};
pub use client::{check_server, ClientError, HttpStore};
pub use models::{
    Attendance, Faq, GalleryPhoto, GuestbookEntry, NewGuestbookEntry, NewRsvp, PartyMember,
    PatchError, Rsvp, ScheduleEvent, StoryEvent, Theme, WeddingDetails, WeddingPatch,
    WeddingRecord,
};
pub use public::{resolve_public, PublicRequest, PublicWedding, Section};
pub use resolver::{
    resolve, resolve_owner, OwnerRecord, PublicId, RequestContext, ResolveError, Resolved,
};
pub use store::{MemoryStore, RecordStore, StoreError, StoreResult};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
