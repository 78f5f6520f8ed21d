//! Reentrancy lock.
//!
//! An instance that performs an external call before its own operation is
//! complete holds its lock for the whole operation. A nested attempt to
//! enter the same lock fails with `ReentrantCall`. The lock is released when
//! the [`LockScope`] drops, on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, SuccessionError};

/// Non-reentrant lock owned by one instance.
///
/// Cloning an instance yields a fresh, unlocked lock: a cloned state never
/// shares in-flight operations with its source.
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    entered: Arc<AtomicBool>,
}

impl ReentrancyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the lock, or fail if an operation already holds it.
    pub fn enter(&self) -> Result<LockScope> {
        if self
            .entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("reentrant call rejected");
            return Err(SuccessionError::ReentrantCall);
        }
        Ok(LockScope {
            entered: Arc::clone(&self.entered),
        })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

impl Clone for ReentrancyLock {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Held for the duration of a guarded operation.
#[must_use = "the lock is released as soon as the scope is dropped"]
#[derive(Debug)]
pub struct LockScope {
    entered: Arc<AtomicBool>,
}

impl Drop for LockScope {
    fn drop(&mut self) {
        self.entered.store(false, Ordering::Release);
    }
}
