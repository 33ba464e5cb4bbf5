//! # Ledger File
//!
//! Every command works against one snapshot file. A command opens it,
//! acts on the restored registry, and (if it mutated anything) writes the
//! new snapshot back. A failed command never touches the file.
//!
//! A [`LedgerFile`] holds the ledger's [`LedgerLock`] for its whole
//! lifetime, so the load, mutate and save cycle of one command cannot
//! interleave with another's.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use poi_core::PrincipalId;
use poi_registry::{EventLog, ProofOfIntegrity, RegistryConfig, RegistryEvent, RegistrySnapshot};

use crate::lock::LedgerLock;

/// Default ledger location when `--ledger` is not given.
pub const DEFAULT_LEDGER: &str = "poi-ledger.json";

/// A registry restored from disk plus a record of what it published.
#[derive(Debug)]
pub struct LedgerFile {
    path: PathBuf,
    registry: ProofOfIntegrity,
    events: Arc<EventLog>,
    _lock: LedgerLock,
}

impl LedgerFile {
    /// Create a fresh, empty ledger. Refuses to overwrite an existing file.
    pub fn create(path: &Path, governor: PrincipalId) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let lock = LedgerLock::acquire(path)?;
        if path.exists() {
            bail!("ledger already exists: {}", path.display());
        }
        let events = Arc::new(EventLog::new());
        let registry = ProofOfIntegrity::new(RegistryConfig { governor }).with_sink(events.clone());
        Ok(Self {
            path: path.to_path_buf(),
            registry,
            events,
            _lock: lock,
        })
    }

    /// Lock, load and verify an existing ledger.
    pub fn open(path: &Path) -> Result<Self> {
        let lock = LedgerLock::acquire(path)?;
        if !path.exists() {
            bail!(
                "ledger not found: {} (run `poi init --governor <principal>` first)",
                path.display()
            );
        }
        let events = Arc::new(EventLog::new());
        let registry = ProofOfIntegrity::load(path)
            .with_context(|| format!("failed to load ledger {}", path.display()))?
            .with_sink(events.clone());
        tracing::debug!(path = %path.display(), "ledger opened");
        Ok(Self {
            path: path.to_path_buf(),
            registry,
            events,
            _lock: lock,
        })
    }

    pub fn registry(&self) -> &ProofOfIntegrity {
        &self.registry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Events published since the ledger was opened.
    pub fn published(&self) -> Vec<RegistryEvent> {
        self.events.events()
    }

    /// Write the current state back to disk.
    pub fn commit(&self) -> Result<RegistrySnapshot> {
        self.registry
            .save(&self.path)
            .with_context(|| format!("failed to write ledger {}", self.path.display()))
    }
}
