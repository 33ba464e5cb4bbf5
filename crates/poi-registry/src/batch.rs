//! # Batch Coordinator — Column Assembly and Atomic Staging
//!
//! Batches arrive as parallel columns (first names, last names, ids,
//! principals). They are applied in two phases:
//!
//! 1. **Assemble.** Columns are checked for equal length and zipped into
//!    rows. A length mismatch fails before any row is looked at.
//! 2. **Stage, then commit.** Every row is validated against the committed
//!    ledger *and* the rows staged before it. The first violation rejects
//!    the whole batch and nothing is written. Only a fully staged batch is
//!    committed, in input order, in one step.
//!
//! A single-item call is a batch of one.
//!
//! Staging and commit are crate-private: only [`crate::ProofOfIntegrity`]
//! drives them, under its write lock. The column helpers are public.
//!
//! Staging borrows the ledger immutably and commit borrows it mutably, so
//! the caller must hold one exclusive lock across both phases. Committing a
//! [`Staged`] batch against a ledger that changed after staging is a logic
//! error.

use std::collections::HashSet;
use std::hash::Hash;

use poi_core::{
    ApplicationId, ApprovedApplicant, Certifier, GrantedApplication, PrincipalId, RegistryError,
};

use crate::events::RegistryEvent;
use crate::ledger::Ledger;

/// A record type the stager knows how to validate and commit.
pub(crate) trait LedgerRow: Sized {
    /// The uniqueness key of the row within its table.
    type Key: Copy + Eq + Hash;

    /// Table name for log output.
    const TABLE: &'static str;

    fn key(&self) -> Self::Key;

    /// Validate against committed state only.
    fn check(&self, ledger: &Ledger) -> Result<(), RegistryError>;

    /// The error for a key that an earlier row of the same batch claimed.
    fn staged_duplicate(key: Self::Key) -> RegistryError;

    /// Write the row. Only called on staged rows.
    fn commit(self, ledger: &mut Ledger);

    /// The notification published after `count` rows were committed.
    fn added(count: usize) -> RegistryEvent;
}

impl LedgerRow for Certifier {
    type Key = PrincipalId;
    const TABLE: &'static str = "certifiers";

    fn key(&self) -> PrincipalId {
        self.principal()
    }

    fn check(&self, ledger: &Ledger) -> Result<(), RegistryError> {
        ledger.check_certifier(self)
    }

    fn staged_duplicate(principal: PrincipalId) -> RegistryError {
        RegistryError::DuplicatePrincipal { principal }
    }

    fn commit(self, ledger: &mut Ledger) {
        ledger.insert_certifier(self);
    }

    fn added(count: usize) -> RegistryEvent {
        RegistryEvent::CertifiersAdded { count }
    }
}

impl LedgerRow for ApprovedApplicant {
    type Key = PrincipalId;
    const TABLE: &'static str = "applicants";

    fn key(&self) -> PrincipalId {
        self.principal()
    }

    fn check(&self, ledger: &Ledger) -> Result<(), RegistryError> {
        ledger.check_applicant(self)
    }

    fn staged_duplicate(principal: PrincipalId) -> RegistryError {
        RegistryError::DuplicatePrincipal { principal }
    }

    fn commit(self, ledger: &mut Ledger) {
        ledger.insert_applicant(self);
    }

    fn added(count: usize) -> RegistryEvent {
        RegistryEvent::ApplicantsAdded { count }
    }
}

impl LedgerRow for GrantedApplication {
    type Key = ApplicationId;
    const TABLE: &'static str = "applications";

    fn key(&self) -> ApplicationId {
        self.application_id()
    }

    // Grants never depend on rows staged in the same batch: batches are
    // homogeneous, so certifiers and applicants are always committed state.
    fn check(&self, ledger: &Ledger) -> Result<(), RegistryError> {
        ledger.check_grant(self)
    }

    fn staged_duplicate(application_id: ApplicationId) -> RegistryError {
        RegistryError::DuplicateApplicationId { application_id }
    }

    fn commit(self, ledger: &mut Ledger) {
        ledger.insert_grant(self);
    }

    fn added(count: usize) -> RegistryEvent {
        RegistryEvent::ApplicationsAdded { count }
    }
}

/// A row that failed staging and the position it held in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowRejected {
    /// Zero-based row index.
    pub index: usize,
    /// The invariant the row violated.
    pub error: RegistryError,
}

impl RowRejected {
    /// The batch-level error, tagged with the offending row.
    pub fn into_batch_error(self) -> RegistryError {
        self.error.at_row(self.index)
    }
}

/// A batch whose every row passed validation, ready to commit.
#[derive(Debug)]
pub(crate) struct Staged<R: LedgerRow> {
    rows: Vec<R>,
}

impl<R: LedgerRow> Staged<R> {
    /// Validate `rows` against `ledger` and against each other.
    pub fn stage(ledger: &Ledger, rows: Vec<R>) -> Result<Self, RowRejected> {
        let mut seen: HashSet<R::Key> = HashSet::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            row.check(ledger)
                .map_err(|error| RowRejected { index, error })?;
            let key = row.key();
            if !seen.insert(key) {
                return Err(RowRejected {
                    index,
                    error: R::staged_duplicate(key),
                });
            }
        }
        Ok(Self { rows })
    }

    /// Write every staged row in input order. Returns the number written.
    pub fn commit(self, ledger: &mut Ledger) -> usize {
        let count = self.rows.len();
        for row in self.rows {
            tracing::debug!(table = R::TABLE, "committing staged row");
            row.commit(ledger);
        }
        count
    }
}

// ─── Column assembly ─────────────────────────────────────────────────

/// Require every column to have the same length; return that length.
pub fn check_lengths(lengths: &[usize]) -> Result<usize, RegistryError> {
    let first = lengths.first().copied().unwrap_or(0);
    if lengths.iter().all(|&len| len == first) {
        Ok(first)
    } else {
        Err(RegistryError::ArrayLengthMismatch {
            lengths: lengths.to_vec(),
        })
    }
}

/// Zip certifier columns into records.
pub fn certifier_rows<S: AsRef<str>>(
    first_names: &[S],
    last_names: &[S],
    certifier_ids: &[u64],
    principals: &[PrincipalId],
) -> Result<Vec<Certifier>, RegistryError> {
    check_lengths(&[
        first_names.len(),
        last_names.len(),
        certifier_ids.len(),
        principals.len(),
    ])?;
    Ok(first_names
        .iter()
        .zip(last_names)
        .zip(certifier_ids)
        .zip(principals)
        .map(|(((first, last), id), principal)| {
            Certifier::new(first.as_ref(), last.as_ref(), *id, *principal)
        })
        .collect())
}

/// Zip applicant columns into records.
pub fn applicant_rows<S: AsRef<str>>(
    first_names: &[S],
    last_names: &[S],
    applicant_ids: &[u64],
    principals: &[PrincipalId],
) -> Result<Vec<ApprovedApplicant>, RegistryError> {
    check_lengths(&[
        first_names.len(),
        last_names.len(),
        applicant_ids.len(),
        principals.len(),
    ])?;
    Ok(first_names
        .iter()
        .zip(last_names)
        .zip(applicant_ids)
        .zip(principals)
        .map(|(((first, last), id), principal)| {
            ApprovedApplicant::new(first.as_ref(), last.as_ref(), *id, *principal)
        })
        .collect())
}

/// Zip grant columns into records.
pub fn grant_rows(
    certifiers: &[PrincipalId],
    applicants: &[PrincipalId],
    application_ids: &[ApplicationId],
) -> Result<Vec<GrantedApplication>, RegistryError> {
    check_lengths(&[certifiers.len(), applicants.len(), application_ids.len()])?;
    Ok(certifiers
        .iter()
        .zip(applicants)
        .zip(application_ids)
        .map(|((certifier, applicant), id)| GrantedApplication::new(*id, *certifier, *applicant))
        .collect())
}
