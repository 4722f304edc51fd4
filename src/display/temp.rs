//! Process-wide registry of temp files written for display.
//!
//! Files are created with [`create`] and removed by [`cleanup`], which
//! drains the registry so repeated calls are harmless. Hold a
//! [`CleanupGuard`] for the life of the program to run it on exit.

use lazy_static::lazy_static;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::shared::constants;

lazy_static! {
    static ref TEMP_FILES: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

const MAX_NAME_ATTEMPTS: usize = 1000;

fn registry() -> MutexGuard<'static, Vec<PathBuf>> {
    TEMP_FILES.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Creates an empty, uniquely named file in the system temp dir and
/// registers it for cleanup.
pub fn create(extension: &str) -> Result<PathBuf> {
    let dir = std::env::temp_dir();
    for _ in 0..MAX_NAME_ATTEMPTS {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!(
            "{}-{}-{}.{}",
            constants::TEMP_FILE_PREFIX,
            std::process::id(),
            id,
            extension
        ));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                register(path.clone());
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free temp file name in {}", dir.display()),
    )
    .into())
}

pub fn register(path: PathBuf) {
    crate::utils::logger::debug(&format!("temp file registered: {}", path.display()));
    registry().push(path);
}

pub fn registered() -> Vec<PathBuf> {
    registry().clone()
}

/// Removes every registered file and empties the registry. Files that are
/// already gone are skipped silently. Returns how many were removed.
pub fn cleanup() -> usize {
    let paths: Vec<PathBuf> = registry().drain(..).collect();
    let mut removed = 0;
    for path in paths {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => crate::utils::logger::debug(&format!(
                "temp file {} not removed: {}",
                path.display(),
                e
            )),
        }
    }
    removed
}

/// Runs [`cleanup`] when dropped.
#[must_use = "temp files are removed when the guard is dropped"]
pub struct CleanupGuard {
    _private: (),
}

pub fn guard() -> CleanupGuard {
    CleanupGuard { _private: () }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        cleanup();
    }
}

/// Serializes tests that drain the global registry.
#[cfg(test)]
pub(crate) fn test_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_register_cleanup() {
        let _lock = test_lock();
        let first = create("png").unwrap();
        let second = create("png").unwrap();
        assert_ne!(first, second);
        assert!(first.is_file());
        assert!(first
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("pixgrid-"));

        let listed = registered();
        assert!(listed.contains(&first) && listed.contains(&second));

        // A file removed behind our back is not an error.
        fs::remove_file(&second).unwrap();
        {
            let _guard = guard();
        }
        assert!(!first.exists());
        assert!(registered().is_empty());
        assert_eq!(cleanup(), 0);
    }
}
