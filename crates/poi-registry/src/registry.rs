//! # Proof of Integrity Registry
//!
//! The caller-facing registry. Composes the access gate, the ledger, the
//! batch stager, and the notifier:
//!
//! ```text
//! caller ──▶ AccessControl ──▶ Staged::stage ──▶ Staged::commit ──▶ Notifier
//!              (governor?)      (all rows ok?)     (one write)      (one event)
//! ```
//!
//! ## Concurrency
//!
//! The ledger sits behind a single `parking_lot::RwLock`. Each mutating call
//! takes the write lock once, stages and commits under it, then releases it
//! before publishing its event. Two mutations are therefore serialized, and
//! readers see either the state before a mutation or the state after it,
//! never a partial batch. Every operation is synchronous and in-memory.
//!
//! `ProofOfIntegrity` is `Send + Sync`; share it between threads with `Arc`.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use poi_core::{
    ApplicationId, ApprovedApplicant, Certifier, GrantedApplication, PrincipalId, RegistryError,
};

use crate::access::AccessControl;
use crate::batch::{self, LedgerRow, Staged};
use crate::events::{EventSink, Notifier, RegistryEvent};
use crate::ledger::Ledger;

/// Construction-time configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The only principal allowed to mutate the registry.
    pub governor: PrincipalId,
}

/// How a call's rows were submitted; decides how a row failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Submission {
    Single,
    Batch,
}

/// The permissioned credential registry.
#[derive(Debug)]
pub struct ProofOfIntegrity {
    access: AccessControl,
    ledger: RwLock<Ledger>,
    notifier: Notifier,
}

impl ProofOfIntegrity {
    /// An empty registry governed by `config.governor`.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_ledger(config, Ledger::new())
    }

    pub(crate) fn with_ledger(config: RegistryConfig, ledger: Ledger) -> Self {
        Self {
            access: AccessControl::new(config.governor),
            ledger: RwLock::new(ledger),
            notifier: Notifier::new(),
        }
    }

    /// Attach an event sink. Builder form, used at construction.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.notifier.subscribe(sink);
        self
    }

    /// The configured governor.
    pub fn governor(&self) -> PrincipalId {
        self.access.governor()
    }

    pub fn config(&self) -> RegistryConfig {
        RegistryConfig {
            governor: self.governor(),
        }
    }

    // ── Certifiers ───────────────────────────────────────────────────

    /// Register one certifier.
    pub fn add_certifier(
        &self,
        caller: PrincipalId,
        first_name: &str,
        last_name: &str,
        certifier_id: u64,
        principal: PrincipalId,
    ) -> Result<(), RegistryError> {
        let row = Certifier::new(first_name, last_name, certifier_id, principal);
        self.apply(caller, Submission::Single, || Ok(vec![row]))
            .map(|_| ())
    }

    /// Register a batch of certifiers atomically. Returns the number added.
    pub fn add_certifiers<S: AsRef<str>>(
        &self,
        caller: PrincipalId,
        first_names: &[S],
        last_names: &[S],
        certifier_ids: &[u64],
        principals: &[PrincipalId],
    ) -> Result<usize, RegistryError> {
        self.apply(caller, Submission::Batch, || {
            batch::certifier_rows(first_names, last_names, certifier_ids, principals)
        })
    }

    /// Strict lookup; `NotRegistered` if absent.
    pub fn get_certifier(&self, principal: PrincipalId) -> Result<Certifier, RegistryError> {
        self.ledger.read().certifier(principal).cloned()
    }

    /// `false` for unknown principals and for field mismatches alike.
    pub fn verify_certifier(
        &self,
        principal: PrincipalId,
        first_name: &str,
        last_name: &str,
        certifier_id: u64,
    ) -> bool {
        self.ledger
            .read()
            .verify_certifier(principal, first_name, last_name, certifier_id)
    }

    pub fn certifier_is_registered(&self, principal: PrincipalId) -> bool {
        self.ledger.read().certifier_is_registered(principal)
    }

    /// Certifier principals in registration order.
    pub fn get_certifiers_accounts(&self) -> Vec<PrincipalId> {
        self.ledger.read().certifier_accounts().to_vec()
    }

    // ── Approved applicants ──────────────────────────────────────────

    /// Register one approved applicant.
    pub fn add_approved_applicant(
        &self,
        caller: PrincipalId,
        first_name: &str,
        last_name: &str,
        applicant_id: u64,
        principal: PrincipalId,
    ) -> Result<(), RegistryError> {
        let row = ApprovedApplicant::new(first_name, last_name, applicant_id, principal);
        self.apply(caller, Submission::Single, || Ok(vec![row]))
            .map(|_| ())
    }

    /// Register a batch of approved applicants atomically.
    pub fn add_approved_applicants<S: AsRef<str>>(
        &self,
        caller: PrincipalId,
        first_names: &[S],
        last_names: &[S],
        applicant_ids: &[u64],
        principals: &[PrincipalId],
    ) -> Result<usize, RegistryError> {
        self.apply(caller, Submission::Batch, || {
            batch::applicant_rows(first_names, last_names, applicant_ids, principals)
        })
    }

    pub fn get_approved_applicant(
        &self,
        principal: PrincipalId,
    ) -> Result<ApprovedApplicant, RegistryError> {
        self.ledger.read().applicant(principal).cloned()
    }

    pub fn verify_approved_applicant(
        &self,
        principal: PrincipalId,
        first_name: &str,
        last_name: &str,
        applicant_id: u64,
    ) -> bool {
        self.ledger
            .read()
            .verify_applicant(principal, first_name, last_name, applicant_id)
    }

    /// The predicate downstream consumers (e.g. token pools) gate on.
    pub fn approved_applicant_is_registered(&self, principal: PrincipalId) -> bool {
        self.ledger.read().applicant_is_registered(principal)
    }

    pub fn get_approved_applicants_accounts(&self) -> Vec<PrincipalId> {
        self.ledger.read().applicant_accounts().to_vec()
    }

    // ── Granted applications ─────────────────────────────────────────

    /// Grant one application from `certifier` to `applicant`.
    pub fn add_granted_application(
        &self,
        caller: PrincipalId,
        certifier: PrincipalId,
        applicant: PrincipalId,
        application_id: ApplicationId,
    ) -> Result<(), RegistryError> {
        let row = GrantedApplication::new(application_id, certifier, applicant);
        self.apply(caller, Submission::Single, || Ok(vec![row]))
            .map(|_| ())
    }

    /// Grant a batch of applications atomically.
    pub fn add_granted_applications(
        &self,
        caller: PrincipalId,
        certifiers: &[PrincipalId],
        applicants: &[PrincipalId],
        application_ids: &[ApplicationId],
    ) -> Result<usize, RegistryError> {
        self.apply(caller, Submission::Batch, || {
            batch::grant_rows(certifiers, applicants, application_ids)
        })
    }

    pub fn get_granted_application(
        &self,
        application_id: ApplicationId,
    ) -> Result<GrantedApplication, RegistryError> {
        self.ledger.read().grant(application_id).copied()
    }

    /// Every granted application id in grant order.
    pub fn get_granted_application_ids(&self) -> Vec<ApplicationId> {
        self.ledger.read().application_ids().to_vec()
    }

    /// Applications granted by `principal`, oldest first.
    pub fn get_certifier_application_ids(&self, principal: PrincipalId) -> Vec<ApplicationId> {
        self.ledger
            .read()
            .certifier_application_ids(principal)
            .to_vec()
    }

    /// Applications granted to `principal`, oldest first.
    pub fn get_approved_applicant_application_ids(
        &self,
        principal: PrincipalId,
    ) -> Vec<ApplicationId> {
        self.ledger
            .read()
            .applicant_application_ids(principal)
            .to_vec()
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn certifier_count(&self) -> usize {
        self.ledger.read().certifier_count()
    }

    pub fn applicant_count(&self) -> usize {
        self.ledger.read().applicant_count()
    }

    pub fn application_count(&self) -> usize {
        self.ledger.read().application_count()
    }

    /// Run `f` against a consistent view of the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.ledger.read())
    }

    // ── Mutation pipeline ────────────────────────────────────────────

    /// Authorize, assemble, stage, commit, notify.
    ///
    /// Authorization runs first, so an unauthorized caller learns nothing
    /// about its input. Column assembly runs before the lock is taken.
    fn apply<R: LedgerRow>(
        &self,
        caller: PrincipalId,
        submission: Submission,
        assemble: impl FnOnce() -> Result<Vec<R>, RegistryError>,
    ) -> Result<usize, RegistryError> {
        let result = self
            .access
            .authorize(caller)
            .and_then(|()| assemble())
            .and_then(|rows| self.stage_and_commit(rows, submission));

        match result {
            Ok(count) => {
                tracing::info!(table = R::TABLE, count, caller = %caller, "registry mutation committed");
                self.notifier.publish(R::added(count));
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(table = R::TABLE, caller = %caller, error = %e, "registry mutation rejected");
                Err(e)
            }
        }
    }

    fn stage_and_commit<R: LedgerRow>(
        &self,
        rows: Vec<R>,
        submission: Submission,
    ) -> Result<usize, RegistryError> {
        let mut ledger = self.ledger.write();
        let staged = Staged::stage(&ledger, rows).map_err(|rejected| match submission {
            Submission::Single => rejected.error,
            Submission::Batch => rejected.into_batch_error(),
        })?;
        Ok(staged.commit(&mut ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use poi_core::ErrorKind;

    fn principal(byte: u8) -> PrincipalId {
        PrincipalId::from_bytes([byte; 20])
    }

    const GOVERNOR: u8 = 0xff;

    fn make_registry() -> (ProofOfIntegrity, Arc<EventLog>) {
        let log = Arc::new(EventLog::new());
        let registry = ProofOfIntegrity::new(RegistryConfig {
            governor: principal(GOVERNOR),
        })
        .with_sink(log.clone());
        (registry, log)
    }

    #[test]
    fn test_governor_is_fixed_at_construction() {
        let (registry, _) = make_registry();
        assert_eq!(registry.governor(), principal(GOVERNOR));
        assert_eq!(registry.config().governor, principal(GOVERNOR));
    }

    #[test]
    fn test_single_add_emits_one_event() {
        let (registry, log) = make_registry();
        registry
            .add_certifier(principal(GOVERNOR), "A", "B", 42, principal(1))
            .unwrap();
        assert_eq!(log.events(), vec![RegistryEvent::CertifiersAdded { count: 1 }]);
    }

    #[test]
    fn test_single_add_error_is_not_wrapped() {
        let (registry, log) = make_registry();
        let gov = principal(GOVERNOR);
        registry.add_certifier(gov, "A", "B", 1, principal(1)).unwrap();
        let err = registry
            .add_certifier(gov, "A", "B", 1, principal(1))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicatePrincipal {
                principal: principal(1)
            }
        );
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_batch_error_names_row() {
        let (registry, log) = make_registry();
        let gov = principal(GOVERNOR);
        let err = registry
            .add_approved_applicants(
                gov,
                &["A", "B", "C"],
                &["X", "Y", "Z"],
                &[1, 2, 3],
                &[principal(1), principal(2), principal(1)],
            )
            .unwrap_err();
        assert_eq!(err.batch_row(), Some(2));
        assert_eq!(err.kind(), ErrorKind::DuplicatePrincipal);
        assert_eq!(registry.applicant_count(), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_unauthorized_checked_before_lengths() {
        let (registry, _) = make_registry();
        let err = registry
            .add_certifiers(principal(1), &["A"], &["B", "C"], &[1], &[principal(2)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_empty_batch_succeeds_with_zero_count() {
        let (registry, log) = make_registry();
        let empty: [&str; 0] = [];
        let count = registry
            .add_certifiers(principal(GOVERNOR), &empty, &empty, &[], &[])
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(log.events(), vec![RegistryEvent::CertifiersAdded { count: 0 }]);
    }

    #[test]
    fn test_grant_lookup_round_trip() {
        let (registry, _) = make_registry();
        let gov = principal(GOVERNOR);
        registry.add_certifier(gov, "C", "C", 1, principal(1)).unwrap();
        registry
            .add_approved_applicant(gov, "A", "A", 2, principal(2))
            .unwrap();
        registry
            .add_granted_application(gov, principal(1), principal(2), ApplicationId::new(5))
            .unwrap();
        let g = registry.get_granted_application(ApplicationId::new(5)).unwrap();
        assert_eq!(g.certifier(), principal(1));
        assert_eq!(g.applicant(), principal(2));
        assert_eq!(registry.read(|l| l.application_count()), 1);
    }
}
