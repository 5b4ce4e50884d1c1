use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Identity a submission is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// The create form; a new record has no id yet
    New,
    Existing(i64),
    Batch,
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKey::New => f.write_str("new job"),
            RecordKey::Existing(id) => write!(f, "job {}", id),
            RecordKey::Batch => f.write_str("batch upload"),
        }
    }
}

/// Allows at most one outstanding submission per record.
///
/// Acquiring hands out a token; the key is released when the token drops,
/// whether the request finished, failed or was abandoned.
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<RecordKey>>>,
}

#[derive(Debug)]
pub struct InFlightToken {
    key: RecordKey,
    active: Arc<Mutex<HashSet<RecordKey>>>,
}

fn lock(active: &Mutex<HashSet<RecordKey>>) -> MutexGuard<'_, HashSet<RecordKey>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` when a submission for `key` is already outstanding.
    pub fn try_acquire(&self, key: RecordKey) -> Option<InFlightToken> {
        if !lock(&self.active).insert(key) {
            debug!("Submission for {} already in flight", key);
            return None;
        }
        Some(InFlightToken {
            key,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_in_flight(&self, key: RecordKey) -> bool {
        lock(&self.active).contains(&key)
    }
}

impl Drop for InFlightToken {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.key);
    }
}
