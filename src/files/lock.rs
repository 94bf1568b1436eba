//! Lock probe for files held open by another process.
//!
//! The probe opens the file for read+write and tries a non-blocking
//! exclusive advisory lock via fs2, releasing it immediately. On Windows the
//! open itself fails for files another program has open; elsewhere the
//! advisory lock catches cooperating lockers.
//!
//! This is check-then-act: a file can become locked between the probe and
//! the operation that follows it.

use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

/// Result of probing one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Free,
    Locked,
    Missing,
}

/// Probe a file without modifying it
pub fn probe(path: &Path) -> LockState {
    let file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return LockState::Missing,
        Err(e) => {
            tracing::debug!("Open probe failed for {}: {}", path.display(), e);
            return LockState::Locked;
        }
    };

    match file.try_lock_exclusive() {
        Ok(()) => {
            // Lock is also released when `file` is dropped
            let _ = file.unlock();
            LockState::Free
        }
        Err(e) => {
            tracing::debug!("Lock probe failed for {}: {}", path.display(), e);
            LockState::Locked
        }
    }
}

/// Whether another process currently holds the file
pub fn is_locked(path: &Path) -> bool {
    probe(path) == LockState::Locked
}
