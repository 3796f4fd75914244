//! Debounced persistence of the project aggregate and user record.
//!
//! Two keys hold everything: one JSON snapshot of the whole [`StoreRoot`]
//! (versioned key name; older versions are deleted on load) and one JSON
//! [`User`]. Reads never fail outward: missing or unreadable data falls back
//! to the built-in seed content. Writes are debounced behind a quiet period
//! so a burst of edits amplifies into a single storage write.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{ReelError, ReelResult};
use crate::store::{StoreRoot, User};

use super::storage::{KeyValueStorage, StorageWriteError};

/// Current versioned key for the projects snapshot.
pub const PROJECTS_KEY: &str = "storyreel.projects.v2";

/// Older projects keys, deleted as cleanup on load.
pub const LEGACY_PROJECTS_KEYS: &[&str] = &["storyreel.projects.v1"];

/// Key for the signed-in user record.
pub const USER_KEY: &str = "storyreel.user";

/// Quiet period with no further mutations before a write goes out.
pub const WRITE_QUIET_PERIOD: Duration = Duration::from_millis(1500);

fn map_write_error(e: StorageWriteError) -> ReelError {
    match e {
        StorageWriteError::QuotaExceeded => ReelError::StorageQuota,
        StorageWriteError::Other(msg) => ReelError::StorageWrite(msg),
    }
}

// =============================================================================
// LOAD / SAVE
// =============================================================================

/// Loads the projects snapshot, deleting legacy-versioned keys as cleanup.
/// Falls back to [`StoreRoot::seed`] when the key is missing or unreadable.
pub fn load_root<S: KeyValueStorage>(storage: &mut S) -> StoreRoot {
    for key in LEGACY_PROJECTS_KEYS {
        storage.remove(key);
    }
    match storage.get(PROJECTS_KEY) {
        Some(json) => match serde_json::from_str(&json) {
            Ok(root) => root,
            Err(e) => {
                warn!(error = %e, "unreadable projects snapshot, falling back to seed data");
                StoreRoot::seed()
            }
        },
        None => StoreRoot::seed(),
    }
}

/// Writes the projects snapshot, mapping quota exhaustion to its own error
/// variant so callers can word the notice accordingly.
pub fn save_root<S: KeyValueStorage>(storage: &mut S, root: &StoreRoot) -> ReelResult<()> {
    let json = serde_json::to_string(root)?;
    storage.set(PROJECTS_KEY, &json).map_err(map_write_error)
}

/// Loads the user record, if one is stored and readable.
pub fn load_user<S: KeyValueStorage>(storage: &S) -> Option<User> {
    let json = storage.get(USER_KEY)?;
    match serde_json::from_str(&json) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!(error = %e, "unreadable user record, ignoring");
            None
        }
    }
}

/// Writes the user record.
pub fn save_user<S: KeyValueStorage>(storage: &mut S, user: &User) -> ReelResult<()> {
    let json = serde_json::to_string(user)?;
    storage.set(USER_KEY, &json).map_err(map_write_error)
}

// =============================================================================
// DEBOUNCER
// =============================================================================

/// Quiet-period coalescer: every mark pushes the deadline out; the deadline
/// fires once and disarms.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Registers activity at `now`, pushing the deadline out.
    pub fn mark(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// True once per armed deadline, when `now` has passed it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(WRITE_QUIET_PERIOD)
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Storage plus debounce plus revision tracking: the piece that decides
/// *when* the aggregate actually hits storage.
///
/// The host calls [`note_mutation`](Self::note_mutation) after every store
/// revision and [`maybe_flush`](Self::maybe_flush) from its periodic loop;
/// at most one write happens per quiet period, and only when the revision
/// has moved since the last successful write.
#[derive(Debug)]
pub struct PersistenceGateway<S: KeyValueStorage> {
    storage: S,
    debouncer: Debouncer,
    last_saved_revision: u64,
}

impl<S: KeyValueStorage> PersistenceGateway<S> {
    /// Creates a gateway over a storage backend with the default quiet period.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            debouncer: Debouncer::default(),
            last_saved_revision: 0,
        }
    }

    /// Creates a gateway with a custom quiet period.
    pub fn with_quiet_period(storage: S, quiet: Duration) -> Self {
        Self {
            storage,
            debouncer: Debouncer::new(quiet),
            last_saved_revision: 0,
        }
    }

    /// Loads the aggregate (with legacy-key cleanup and seed fallback).
    pub fn load(&mut self) -> StoreRoot {
        load_root(&mut self.storage)
    }

    /// Loads the stored user record, if any.
    pub fn load_user(&self) -> Option<User> {
        load_user(&self.storage)
    }

    /// Writes the user record immediately (it changes rarely).
    pub fn save_user(&mut self, user: &User) -> ReelResult<()> {
        save_user(&mut self.storage, user)
    }

    /// Registers that the aggregate reached `revision` at `now`, arming the
    /// debounced write.
    pub fn note_mutation(&mut self, revision: u64, now: Instant) {
        if revision != self.last_saved_revision {
            self.debouncer.mark(now);
        }
    }

    /// Flushes the aggregate if the quiet period has elapsed and the
    /// revision moved. Returns whether a write happened. On a write failure
    /// the debouncer re-arms, so the next poll retries.
    pub fn maybe_flush(
        &mut self,
        root: &StoreRoot,
        revision: u64,
        now: Instant,
    ) -> ReelResult<bool> {
        if !self.debouncer.poll(now) {
            return Ok(false);
        }
        if revision == self.last_saved_revision {
            return Ok(false);
        }
        if let Err(e) = save_root(&mut self.storage, root) {
            self.debouncer.mark(now);
            return Err(e);
        }
        self.last_saved_revision = revision;
        debug!(revision, "flushed projects snapshot");
        Ok(true)
    }

    /// Writes the aggregate immediately, bypassing the debounce (used on
    /// shutdown).
    pub fn flush_now(&mut self, root: &StoreRoot, revision: u64) -> ReelResult<()> {
        save_root(&mut self.storage, root)?;
        self.last_saved_revision = revision;
        Ok(())
    }

    /// The underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

// =============================================================================
// TESTS
// =============================================================================
