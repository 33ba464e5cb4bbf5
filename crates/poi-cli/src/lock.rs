//! # Ledger Lock
//!
//! One `poi` process at a time may work on a ledger. Each command takes an
//! exclusive OS-level lock on `<ledger>.lock` before it reads the ledger and
//! keeps it until the command has written its result back. A second
//! command fails fast instead of loading state that is about to change.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fs2::FileExt;

/// Exclusive lock on a ledger, released on drop.
#[derive(Debug)]
pub struct LedgerLock {
    file: File,
    path: PathBuf,
}

impl LedgerLock {
    /// Lock file path for a ledger: the ledger path with `.lock` appended.
    pub fn lock_path(ledger: &Path) -> PathBuf {
        let mut name = ledger
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        ledger.with_file_name(name)
    }

    /// Acquire the lock without blocking.
    pub fn acquire(ledger: &Path) -> Result<Self> {
        let path = Self::lock_path(ledger);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .with_context(|| format!("failed to open lock file {}", path.display()))?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "acquired ledger lock");
                Ok(Self { file, path })
            }
            Err(e) if is_contended(&e) => {
                bail!(
                    "ledger {} is locked by another poi process; retry when it finishes",
                    ledger.display()
                )
            }
            Err(e) => {
                Err(e).with_context(|| format!("failed to lock {}", path.display()))
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// EWOULDBLOCK is 11 on Linux and 35 on macOS.
fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
        || matches!(e.raw_os_error(), Some(11) | Some(35))
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release ledger lock");
        } else {
            tracing::debug!(path = %self.path.display(), "released ledger lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_appends_suffix() {
        assert_eq!(
            LedgerLock::lock_path(Path::new("/data/ledger.json")),
            PathBuf::from("/data/ledger.json.lock")
        );
    }

    #[test]
    fn second_lock_fails_while_first_held() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.json");

        let first = LedgerLock::acquire(&ledger).unwrap();
        assert!(first.path().exists());

        let err = LedgerLock::acquire(&ledger).unwrap_err();
        assert!(err.to_string().contains("locked by another poi process"));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.json");
        {
            let _lock = LedgerLock::acquire(&ledger).unwrap();
        }
        assert!(LedgerLock::acquire(&ledger).is_ok());
    }
}
