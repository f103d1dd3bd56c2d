//! Non-blocking advisory lock file guarding a device target.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::domain::errors::{CoverError, CoverResult};

/// Held lock; the lock file is removed on drop.
///
/// Acquisition is an atomic exclusive create, so it excludes writers in
/// other processes as well as other tasks in this one.
#[derive(Debug)]
pub struct ArtLock {
    path: PathBuf,
}

impl ArtLock {
    /// Takes the lock without waiting. `Ok(None)` means someone else holds it.
    ///
    /// # Errors
    /// Returns error if the lock file cannot be created for any other reason.
    pub fn try_acquire(path: &Path) -> CoverResult<Option<Self>> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {
                trace!(path = %path.display(), "Acquired art lock");
                Ok(Some(Self {
                    path: path.to_path_buf(),
                }))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(CoverError::Lock(format!(
                "Failed to create {}: {e}",
                path.display()
            ))),
        }
    }
}

impl Drop for ArtLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to release art lock");
        }
    }
}
