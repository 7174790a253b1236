//! Single-flight gate around remote-mutating operations.
//!
//! At most one guarded operation runs at a time. A second attempt fails
//! immediately with [`GitCmsError::LockBusy`]; there is no queueing or backoff.
//! The busy flag and status message are cleared by a guard on every exit path,
//! including early returns and panics.
//!
//! # Public API
//! - [`SyncLock`]: Cloneable handle to shared lock state
//! - [`SyncGuard`]: RAII guard held while an operation is in flight
//! - [`SyncStatus`]: Snapshot of the busy flag and message
//!
//! [`SyncLock::process`] returns the process-wide instance. Independent
//! instances from [`SyncLock::new`] are for tests and embedding.

use crate::core::error::{GitCmsError, Result};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

static PROCESS_LOCK: OnceLock<SyncLock> = OnceLock::new();

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    pub busy: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SyncLock {
    state: Arc<Mutex<SyncStatus>>,
}

fn lock_state(state: &Mutex<SyncStatus>) -> MutexGuard<'_, SyncStatus> {
    // A panic inside a guarded operation never happens while the mutex is held
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SyncLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process() -> SyncLock {
        PROCESS_LOCK.get_or_init(SyncLock::new).clone()
    }

    pub fn status(&self) -> SyncStatus {
        lock_state(&self.state).clone()
    }

    pub fn is_busy(&self) -> bool {
        lock_state(&self.state).busy
    }

    /// Mark the lock busy, or fail with the in-flight status message
    pub fn try_acquire(&self, message: Option<&str>) -> Result<SyncGuard> {
        let mut state = lock_state(&self.state);
        if state.busy {
            log::warn!("Sync lock busy: {:?}", state.message);
            return Err(GitCmsError::lock_busy(state.message.clone()));
        }
        state.busy = true;
        state.message = message.map(str::to_string);
        log::debug!("Sync lock acquired: {message:?}");

        Ok(SyncGuard {
            state: Arc::clone(&self.state),
        })
    }

    /// Run `operation` while holding the lock
    pub fn with_lock<T>(
        &self,
        message: Option<&str>,
        operation: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let _guard = self.try_acquire(message)?;
        operation()
    }
}

/// Clears the busy flag and message when dropped
#[derive(Debug)]
pub struct SyncGuard {
    state: Arc<Mutex<SyncStatus>>,
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        state.busy = false;
        state.message = None;
        log::debug!("Sync lock released");
    }
}
