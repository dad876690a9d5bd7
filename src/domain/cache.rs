//! Time-to-live cache for refresh results.
//!
//! The lock is held for the whole refresh, so at most one refresh runs
//! at a time and a caller arriving mid-refresh waits for its result
//! instead of fetching again. Entries are replaced whole.

use crate::domain::pipeline::Snapshot;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// One day, matching the upstream data cadence.
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

struct Entry<T> {
    value: Arc<T>,
    expires_at: Instant,
}

pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

pub type SnapshotCache = TtlCache<Snapshot>;

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_or_refresh<F>(&self, refresh: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        self.get_or_refresh_at(Instant::now(), refresh)
    }

    /// Return the cached value if still valid at `now`, otherwise run
    /// `refresh` and store its result.
    pub fn get_or_refresh_at<F>(&self, now: Instant, refresh: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = slot.as_ref() {
            if now < entry.expires_at {
                tracing::debug!("serving cached snapshot");
                return Arc::clone(&entry.value);
            }
        }

        let value = Arc::new(refresh());
        *slot = Some(Entry {
            value: Arc::clone(&value),
            expires_at: now + self.ttl,
        });
        value
    }

    /// The cached value, if any, regardless of expiry.
    pub fn peek(&self) -> Option<Arc<T>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|e| Arc::clone(&e.value))
    }

    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl<T> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
