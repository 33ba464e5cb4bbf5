//! # Durable Ledger Snapshot
//!
//! The whole registry as one JSON document: governor, the three tables in
//! insertion order, and a SHA-256 digest of the canonical ledger body.
//!
//! ## Design
//!
//! - Derived indices are never written. Restoring replays every record
//!   through the ledger's checked `add_*` path, so a tampered or
//!   hand-edited file that breaks a uniqueness or reference invariant is
//!   refused, and the indices are rebuilt from the grant order.
//! - The digest covers the body (version, governor, tables) and not the
//!   save timestamp, so two snapshots of the same state share a digest.
//! - Writes go to a uniquely named temp file in the target's directory,
//!   which is synced and then renamed over the target. A crash mid-write
//!   leaves the previous snapshot intact, and two concurrent saves never
//!   share a temp file.
//! - Saving does not serialize writers across processes. Callers that
//!   load, mutate and save must hold their own lock around the cycle.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use poi_core::{
    sha256_digest, ApprovedApplicant, CanonicalBytes, CanonicalizationError, Certifier,
    GrantedApplication, PrincipalId, RegistryError,
};

use crate::ledger::Ledger;
use crate::registry::{ProofOfIntegrity, RegistryConfig};

/// Current snapshot layout.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Errors from saving or restoring a snapshot.
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The stored digest does not match the body.
    #[error("snapshot digest mismatch: stored {stored}, computed {computed}")]
    DigestMismatch { stored: String, computed: String },

    #[error("unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// A record broke a ledger invariant during replay.
    #[error("snapshot violates a ledger invariant: {0}")]
    Invariant(#[from] RegistryError),
}

/// The serialized registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub format_version: u32,
    pub governor: PrincipalId,
    pub saved_at: DateTime<Utc>,
    pub certifiers: Vec<Certifier>,
    pub applicants: Vec<ApprovedApplicant>,
    pub applications: Vec<GrantedApplication>,
    /// `sha256:<hex>` over the canonical body.
    pub digest: String,
}

/// The digested part of a snapshot.
#[derive(Serialize)]
struct SnapshotBody<'a> {
    format_version: u32,
    governor: PrincipalId,
    certifiers: &'a [Certifier],
    applicants: &'a [ApprovedApplicant],
    applications: &'a [GrantedApplication],
}

impl RegistrySnapshot {
    fn capture(governor: PrincipalId, ledger: &Ledger) -> Result<Self, SnapshotError> {
        let mut snapshot = Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            governor,
            saved_at: Utc::now(),
            certifiers: ledger.certifiers().cloned().collect(),
            applicants: ledger.applicants().cloned().collect(),
            applications: ledger.grants().copied().collect(),
            digest: String::new(),
        };
        snapshot.digest = snapshot.compute_digest()?;
        Ok(snapshot)
    }

    /// Digest of the body as it stands now.
    pub fn compute_digest(&self) -> Result<String, SnapshotError> {
        let body = SnapshotBody {
            format_version: self.format_version,
            governor: self.governor,
            certifiers: &self.certifiers,
            applicants: &self.applicants,
            applications: &self.applications,
        };
        let canonical = CanonicalBytes::new(&body)?;
        Ok(sha256_digest(&canonical).to_string())
    }

    /// Check the version and the stored digest.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        let computed = self.compute_digest()?;
        if computed != self.digest {
            return Err(SnapshotError::DigestMismatch {
                stored: self.digest.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Rebuild a ledger by replaying every record in stored order.
    fn replay(&self) -> Result<Ledger, SnapshotError> {
        let mut ledger = Ledger::new();
        for certifier in &self.certifiers {
            ledger.add_certifier(certifier.clone())?;
        }
        for applicant in &self.applicants {
            ledger.add_applicant(applicant.clone())?;
        }
        for grant in &self.applications {
            ledger.add_grant(*grant)?;
        }
        Ok(ledger)
    }

    /// Write pretty JSON to `path` via a temp file and rename.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let io_err = |source: std::io::Error| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        tracing::debug!(path = %path.display(), digest = %self.digest, "snapshot saved");
        Ok(())
    }

    /// Read a snapshot from `path`. Does not verify it.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ProofOfIntegrity {
    /// Capture the current state under a read lock.
    pub fn snapshot(&self) -> Result<RegistrySnapshot, SnapshotError> {
        let governor = self.governor();
        self.read(|ledger| RegistrySnapshot::capture(governor, ledger))
    }

    /// Restore a registry. Verifies the digest, then replays every record.
    pub fn from_snapshot(snapshot: &RegistrySnapshot) -> Result<Self, SnapshotError> {
        snapshot.verify()?;
        let ledger = snapshot.replay()?;
        tracing::info!(
            certifiers = ledger.certifier_count(),
            applicants = ledger.applicant_count(),
            applications = ledger.application_count(),
            "registry restored from snapshot"
        );
        Ok(Self::with_ledger(
            RegistryConfig {
                governor: snapshot.governor,
            },
            ledger,
        ))
    }

    /// Snapshot and write to `path`.
    pub fn save(&self, path: &Path) -> Result<RegistrySnapshot, SnapshotError> {
        let snapshot = self.snapshot()?;
        snapshot.save(path)?;
        Ok(snapshot)
    }

    /// Load, verify and restore from `path`.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        Self::from_snapshot(&RegistrySnapshot::load(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poi_core::{ApplicationId, ErrorKind};

    fn principal(byte: u8) -> PrincipalId {
        PrincipalId::from_bytes([byte; 20])
    }

    const GOVERNOR: u8 = 0xee;

    fn make_populated() -> ProofOfIntegrity {
        let gov = principal(GOVERNOR);
        let registry = ProofOfIntegrity::new(RegistryConfig { governor: gov });
        registry
            .add_certifiers(
                gov,
                &["Ada", "Alan"],
                &["Lovelace", "Turing"],
                &[1, 2],
                &[principal(1), principal(2)],
            )
            .unwrap();
        registry
            .add_approved_applicant(gov, "Grace", "Hopper", 10, principal(10))
            .unwrap();
        registry
            .add_granted_applications(
                gov,
                &[principal(2), principal(1)],
                &[principal(10), principal(10)],
                &[ApplicationId::new(7), ApplicationId::new(3)],
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_restore_preserves_state_and_order() {
        let original = make_populated();
        let snapshot = original.snapshot().unwrap();
        let restored = ProofOfIntegrity::from_snapshot(&snapshot).unwrap();

        assert_eq!(restored.governor(), principal(GOVERNOR));
        assert_eq!(
            restored.get_certifiers_accounts(),
            vec![principal(1), principal(2)]
        );
        assert_eq!(
            restored.get_approved_applicant_application_ids(principal(10)),
            vec![ApplicationId::new(7), ApplicationId::new(3)]
        );
        assert!(restored.verify_certifier(principal(2), "Alan", "Turing", 2));
    }

    #[test]
    fn test_digest_ignores_save_time() {
        let registry = make_populated();
        let a = registry.snapshot().unwrap();
        let mut b = a.clone();
        b.saved_at = b.saved_at + chrono::Duration::seconds(60);
        assert_eq!(a.compute_digest().unwrap(), b.compute_digest().unwrap());
        assert!(a.digest.starts_with("sha256:"));
    }

    #[test]
    fn test_tampered_snapshot_rejected() {
        let mut snapshot = make_populated().snapshot().unwrap();
        snapshot.certifiers.pop();
        let err = ProofOfIntegrity::from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, SnapshotError::DigestMismatch { .. }));
    }

    #[test]
    fn test_invariant_violation_rejected_even_with_valid_digest() {
        let mut snapshot = make_populated().snapshot().unwrap();
        let dup = snapshot.certifiers[0].clone();
        snapshot.certifiers.push(dup);
        snapshot.digest = snapshot.compute_digest().unwrap();
        match ProofOfIntegrity::from_snapshot(&snapshot).unwrap_err() {
            SnapshotError::Invariant(e) => assert_eq!(e.kind(), ErrorKind::DuplicatePrincipal),
            other => panic!("expected invariant error, got {other}"),
        }
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut snapshot = make_populated().snapshot().unwrap();
        snapshot.format_version = 99;
        let err = snapshot.verify().unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let saved = make_populated().save(&path).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temp file left behind");

        let restored = ProofOfIntegrity::load(&path).unwrap();
        assert_eq!(restored.application_count(), 2);
        assert_eq!(restored.snapshot().unwrap().digest, saved.digest);
    }

    #[test]
    fn test_concurrent_saves_each_leave_a_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let registry = std::sync::Arc::new(make_populated());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = std::sync::Arc::clone(&registry);
                let path = path.clone();
                std::thread::spawn(move || registry.save(&path).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let restored = ProofOfIntegrity::load(&path).unwrap();
        assert_eq!(restored.certifier_count(), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProofOfIntegrity::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
