//! Scoped cross-process exclusive lock
//!
//! Wraps an OS file lock on a sidecar lock file. Acquisition polls with a
//! bounded wait and fails fast on timeout; release happens on `Drop`, so
//! every exit path - success, error, panic unwind - gives the lock back.

use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Exclusive lock held for the lifetime of the value
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`, waiting at most `timeout`.
    ///
    /// The lock file carries no data; it exists only for mutual exclusion
    /// and is left in place after release.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!("Acquired lock on {}", path.display());
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(_) => {
                    return Err(Error::LockTimeout(timeout.as_secs()));
                }
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = fs2::FileExt::unlock(&self.file) {
            // Best effort; the OS releases the lock when the fd closes anyway
            warn!("Failed to unlock {}: {}", self.path.display(), e);
        } else {
            debug!("Released lock on {}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.lock");

        let lock = FileLock::acquire(&path, Duration::from_secs(1)).unwrap();
        drop(lock);

        // Re-acquirable after release
        let _again = FileLock::acquire(&path, Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn test_contended_lock_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.lock");

        let _held = FileLock::acquire(&path, Duration::from_secs(1)).unwrap();

        let start = Instant::now();
        let result = FileLock::acquire(&path, Duration::from_millis(300));
        assert!(matches!(result, Err(Error::LockTimeout(_))));
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[test]
    fn test_lock_released_on_drop_midway() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.lock");

        {
            let _lock = FileLock::acquire(&path, Duration::from_secs(1)).unwrap();
        }

        assert!(FileLock::acquire(&path, Duration::from_millis(100)).is_ok());
    }
}
