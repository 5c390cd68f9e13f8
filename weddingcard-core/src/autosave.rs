//! Debounced write-through of dashboard edits.
//!
//! Every edit is applied to the in-memory draft and written to the local
//! cache before [`AutosaveCoordinator::edit`] returns. A background task
//! composes pending edits into one patch and writes it to the record store
//! once no edit has arrived for the quiet period. At most one remote write
//! is in flight and it is never cancelled.
//!
//! Cache writes happen under the draft lock, so the file always holds the
//! newest draft and its sync state.

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheError, LocalCache};
use crate::models::{WeddingDetails, WeddingPatch, WeddingRecord};
use crate::resolver::{resolve_owner, OwnerRecord};
use crate::store::{RecordStore, StoreError};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Time without edits before the pending patch is written.
    pub quiet_period: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }
}

impl AutosaveConfig {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            quiet_period: Duration::from_millis(ms),
        }
    }
}

/// Outcome of a remote write, delivered once per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    Saved { id: String, shareable_id: String },
    SaveFailed { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum AutosaveError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("autosave task has stopped")]
    Stopped,
}

/// The editor's current view of the owner's record.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub details: WeddingDetails,
    /// `None` until the first successful write.
    pub id: Option<String>,
    pub shareable_id: Option<String>,
    /// True when the store holds everything in `details`.
    pub synced: bool,
}

impl Draft {
    fn unsaved(details: WeddingDetails) -> Self {
        Self {
            details,
            id: None,
            shareable_id: None,
            synced: true,
        }
    }

    fn from_owner_record(resolved: OwnerRecord) -> Self {
        match resolved {
            OwnerRecord::Saved(record) => Self::from_record(record),
            OwnerRecord::Unsaved(details) => Self::unsaved(details),
        }
    }

    fn from_record(record: WeddingRecord) -> Self {
        Self {
            details: record.details,
            id: Some(record.id),
            shareable_id: Some(record.shareable_id),
            synced: true,
        }
    }

    fn from_cache(entry: CacheEntry) -> Self {
        Self {
            details: entry.details,
            id: entry.id,
            shareable_id: entry.shareable_id,
            synced: entry.synced,
        }
    }

    fn cache_entry(&self, owner: &str) -> CacheEntry {
        CacheEntry {
            owner: owner.to_string(),
            synced: self.synced,
            saved_at: Utc::now(),
            id: self.id.clone(),
            shareable_id: self.shareable_id.clone(),
            details: self.details.clone(),
        }
    }
}

struct Shared {
    draft: Draft,
    /// Bumped by every edit.
    revision: u64,
}

type SharedState = Arc<Mutex<Shared>>;

fn lock(state: &SharedState) -> MutexGuard<'_, Shared> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Command {
    Edit {
        patch: WeddingPatch,
        revision: u64,
        at: Instant,
    },
    Flush(oneshot::Sender<Result<(), StoreError>>),
}

/// Owns one owner's editing session.
pub struct AutosaveCoordinator {
    owner: String,
    cache: LocalCache,
    state: SharedState,
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl AutosaveCoordinator {
    /// Opens the owner's record and starts the background writer.
    ///
    /// The remote record is preferred. An unsynced cache entry for the owner
    /// takes precedence over it and is queued for writing, so edits from a
    /// session whose last save failed are not lost. When the store is
    /// unreachable the cache is used, then the template.
    pub async fn load<S>(
        store: S,
        cache: LocalCache,
        owner: impl Into<String>,
        config: AutosaveConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SaveEvent>)
    where
        S: RecordStore + 'static,
    {
        let owner = owner.into();

        let cached = match cache.load(&owner) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable cache entry");
                None
            }
        };

        let mut requeue = None;
        let mut reachable = true;
        let draft = match resolve_owner(&store, &owner).await {
            Ok(resolved) => match cached {
                Some(entry) if !entry.synced => {
                    tracing::info!("unsynced local edits found, queueing them for save");
                    requeue = Some(WeddingPatch::from_details(&entry.details));
                    let mut draft = Draft::from_cache(entry);
                    if let Some(record) = resolved.record() {
                        draft.id = Some(record.id.clone());
                        draft.shareable_id = Some(record.shareable_id.clone());
                    }
                    draft
                }
                _ => Draft::from_owner_record(resolved),
            },
            Err(e) => {
                tracing::warn!(error = %e, "record store unavailable, loading from cache");
                reachable = false;
                match cached {
                    Some(entry) => {
                        if !entry.synced {
                            // Retried by the next edit or flush.
                            requeue = Some(WeddingPatch::from_details(&entry.details));
                        }
                        Draft::from_cache(entry)
                    }
                    None => Draft::unsaved(WeddingDetails::default()),
                }
            }
        };

        let deadline = if reachable && requeue.is_some() {
            Some(Instant::now() + config.quiet_period)
        } else {
            None
        };
        let state = Arc::new(Mutex::new(Shared { draft, revision: 0 }));
        let (commands, receiver) = mpsc::unbounded_channel();
        let (events, event_receiver) = mpsc::unbounded_channel();

        let worker = Worker {
            store,
            owner: owner.clone(),
            cache: cache.clone(),
            state: Arc::clone(&state),
            config,
            commands: receiver,
            events,
            pending: requeue,
            pending_revision: 0,
            deadline,
        };
        let task = tokio::spawn(worker.run());

        let coordinator = Self {
            owner,
            cache,
            state,
            commands,
            task,
        };
        (coordinator, event_receiver)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Snapshot of the current draft.
    pub fn current(&self) -> Draft {
        lock(&self.state).draft.clone()
    }

    /// Applies `patch` to the draft, writes the cache and schedules a save.
    ///
    /// The cache is written even if the background writer has stopped, and
    /// the save is scheduled even if the cache write fails. The first error
    /// is returned afterwards.
    pub fn edit(&self, patch: WeddingPatch) -> Result<(), AutosaveError> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut shared = lock(&self.state);
        shared.draft.details.apply(&patch);
        shared.draft.synced = false;
        shared.revision += 1;
        let revision = shared.revision;

        let cached = self.cache.save(&shared.draft.cache_entry(&self.owner));
        // Sent under the lock so the writer sees edits in revision order.
        let sent = self.commands.send(Command::Edit {
            patch,
            revision,
            at: Instant::now(),
        });
        drop(shared);

        sent.map_err(|_| AutosaveError::Stopped)?;
        cached?;
        Ok(())
    }

    /// Writes any pending edits now and waits for the result.
    pub async fn flush(&self) -> Result<(), AutosaveError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Flush(reply))
            .map_err(|_| AutosaveError::Stopped)?;
        response.await.map_err(|_| AutosaveError::Stopped)??;
        Ok(())
    }

    /// Flushes, then stops the background writer.
    pub async fn close(self) -> Result<(), AutosaveError> {
        let result = self.flush().await;
        drop(self.commands);
        let _ = self.task.await;
        result
    }

    /// Stops the background writer without writing.
    ///
    /// Pending edits stay in the cache marked unsynced and are queued again
    /// by the next [`load`](Self::load).
    pub async fn stop(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}

struct Worker<S> {
    store: S,
    owner: String,
    cache: LocalCache,
    state: SharedState,
    config: AutosaveConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SaveEvent>,
    pending: Option<WeddingPatch>,
    /// Highest edit revision folded into `pending`.
    pending_revision: u64,
    deadline: Option<Instant>,
}

impl<S: RecordStore> Worker<S> {
    async fn run(mut self) {
        loop {
            let command = match self.deadline {
                Some(deadline) => {
                    tokio::select! {
                        command = self.commands.recv() => command,
                        _ = tokio::time::sleep_until(deadline) => {
                            let _ = self.write().await;
                            continue;
                        }
                    }
                }
                None => self.commands.recv().await,
            };

            match command {
                Some(Command::Edit {
                    patch,
                    revision,
                    at,
                }) => {
                    self.pending = Some(match self.pending.take() {
                        Some(earlier) => earlier.then(patch),
                        None => patch,
                    });
                    self.pending_revision = self.pending_revision.max(revision);
                    self.deadline = Some(at + self.config.quiet_period);
                }
                Some(Command::Flush(reply)) => {
                    let result = self.write().await;
                    let _ = reply.send(result);
                }
                None => {
                    if self.pending.is_some() {
                        let _ = self.write().await;
                    }
                    break;
                }
            }
        }
    }

    /// Writes the pending patch, if any.
    async fn write(&mut self) -> Result<(), StoreError> {
        self.deadline = None;
        let Some(patch) = self.pending.take() else {
            return Ok(());
        };
        let revision = self.pending_revision;

        match self.store.upsert(&self.owner, &patch).await {
            Ok(record) => {
                tracing::debug!(id = %record.id, "autosave complete");
                {
                    let mut shared = lock(&self.state);
                    shared.draft.id = Some(record.id.clone());
                    shared.draft.shareable_id = Some(record.shareable_id.clone());
                    // Edits made during the write keep the draft unsynced.
                    if shared.revision == revision {
                        shared.draft.synced = true;
                    }
                    if let Err(e) = self.cache.save(&shared.draft.cache_entry(&self.owner)) {
                        tracing::warn!(error = %e, "failed to update cache after save");
                    }
                }

                let _ = self.events.send(SaveEvent::Saved {
                    id: record.id,
                    shareable_id: record.shareable_id,
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "autosave failed, edits kept in local cache");
                // Not rescheduled; the next edit or flush retries it.
                self.pending = Some(patch);
                let _ = self.events.send(SaveEvent::SaveFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
