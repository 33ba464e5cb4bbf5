//! # Registry Core — Ledger Tables and Derived Indices
//!
//! Three append-only tables plus two derived indices:
//!
//! ```text
//! certifiers    PrincipalId   -> Certifier            (+ insertion order)
//! applicants    PrincipalId   -> ApprovedApplicant    (+ insertion order)
//! applications  ApplicationId -> GrantedApplication   (+ insertion order)
//!
//! certifier_applications  PrincipalId -> [ApplicationId]   (derived)
//! applicant_applications  PrincipalId -> [ApplicationId]   (derived)
//! ```
//!
//! ## Invariants
//!
//! - A principal appears at most once in the certifier table, and at most
//!   once in the applicant table. The two tables are independent: the same
//!   principal may hold both roles.
//! - An application id appears at most once.
//! - A grant references a registered certifier and a registered applicant.
//! - Every grant is appended exactly once to both derived indices, in
//!   insertion order.
//! - Nothing is ever removed or rewritten.
//!
//! Every `add_*` method validates before it writes, so a failed call leaves
//! the ledger untouched. The `check_*` methods run the same validation
//! without writing; the batch stager builds on them.
//!
//! The ledger itself is not synchronized. [`crate::ProofOfIntegrity`] owns
//! it behind a lock and gates every mutation through access control.

use std::collections::HashMap;

use poi_core::{
    ApplicationId, ApprovedApplicant, Certifier, GrantedApplication, PrincipalId, RegistryError,
};

/// The registry's tables and indices.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    certifiers: HashMap<PrincipalId, Certifier>,
    certifier_accounts: Vec<PrincipalId>,
    applicants: HashMap<PrincipalId, ApprovedApplicant>,
    applicant_accounts: Vec<PrincipalId>,
    applications: HashMap<ApplicationId, GrantedApplication>,
    application_ids: Vec<ApplicationId>,
    certifier_applications: HashMap<PrincipalId, Vec<ApplicationId>>,
    applicant_applications: HashMap<PrincipalId, Vec<ApplicationId>>,
}

impl Ledger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Certifiers ───────────────────────────────────────────────────

    /// Validate a certifier registration without writing it.
    pub fn check_certifier(&self, certifier: &Certifier) -> Result<(), RegistryError> {
        let principal = certifier.principal();
        if self.certifiers.contains_key(&principal) {
            return Err(RegistryError::DuplicatePrincipal { principal });
        }
        Ok(())
    }

    /// Register a certifier.
    pub fn add_certifier(&mut self, certifier: Certifier) -> Result<(), RegistryError> {
        self.check_certifier(&certifier)?;
        self.insert_certifier(certifier);
        Ok(())
    }

    /// Strict lookup.
    pub fn certifier(&self, principal: PrincipalId) -> Result<&Certifier, RegistryError> {
        self.certifiers
            .get(&principal)
            .ok_or(RegistryError::NotRegistered { principal })
    }

    /// `true` only if the principal is registered with exactly these fields.
    pub fn verify_certifier(
        &self,
        principal: PrincipalId,
        first_name: &str,
        last_name: &str,
        certifier_id: u64,
    ) -> bool {
        self.certifier(principal)
            .map(|c| c.matches(first_name, last_name, certifier_id))
            .unwrap_or(false)
    }

    pub fn certifier_is_registered(&self, principal: PrincipalId) -> bool {
        self.certifiers.contains_key(&principal)
    }

    /// Registered certifier principals in insertion order.
    pub fn certifier_accounts(&self) -> &[PrincipalId] {
        &self.certifier_accounts
    }

    /// Certifier records in insertion order.
    pub fn certifiers(&self) -> impl Iterator<Item = &Certifier> + '_ {
        self.certifier_accounts
            .iter()
            .filter_map(move |p| self.certifiers.get(p))
    }

    // ── Approved applicants ──────────────────────────────────────────

    /// Validate an applicant registration without writing it.
    pub fn check_applicant(&self, applicant: &ApprovedApplicant) -> Result<(), RegistryError> {
        let principal = applicant.principal();
        if self.applicants.contains_key(&principal) {
            return Err(RegistryError::DuplicatePrincipal { principal });
        }
        Ok(())
    }

    /// Register an approved applicant.
    pub fn add_applicant(&mut self, applicant: ApprovedApplicant) -> Result<(), RegistryError> {
        self.check_applicant(&applicant)?;
        self.insert_applicant(applicant);
        Ok(())
    }

    /// Strict lookup.
    pub fn applicant(&self, principal: PrincipalId) -> Result<&ApprovedApplicant, RegistryError> {
        self.applicants
            .get(&principal)
            .ok_or(RegistryError::NotRegistered { principal })
    }

    /// `true` only if the principal is registered with exactly these fields.
    pub fn verify_applicant(
        &self,
        principal: PrincipalId,
        first_name: &str,
        last_name: &str,
        applicant_id: u64,
    ) -> bool {
        self.applicant(principal)
            .map(|a| a.matches(first_name, last_name, applicant_id))
            .unwrap_or(false)
    }

    pub fn applicant_is_registered(&self, principal: PrincipalId) -> bool {
        self.applicants.contains_key(&principal)
    }

    /// Registered applicant principals in insertion order.
    pub fn applicant_accounts(&self) -> &[PrincipalId] {
        &self.applicant_accounts
    }

    /// Applicant records in insertion order.
    pub fn applicants(&self) -> impl Iterator<Item = &ApprovedApplicant> + '_ {
        self.applicant_accounts
            .iter()
            .filter_map(move |p| self.applicants.get(p))
    }

    // ── Granted applications ─────────────────────────────────────────

    /// Validate a grant without writing it.
    ///
    /// Checks run in a fixed order: certifier, then applicant, then the
    /// application id. The first failure wins.
    pub fn check_grant(&self, grant: &GrantedApplication) -> Result<(), RegistryError> {
        if !self.certifier_is_registered(grant.certifier()) {
            return Err(RegistryError::InvalidCertifier {
                principal: grant.certifier(),
            });
        }
        if !self.applicant_is_registered(grant.applicant()) {
            return Err(RegistryError::InvalidApplicant {
                principal: grant.applicant(),
            });
        }
        if self.applications.contains_key(&grant.application_id()) {
            return Err(RegistryError::DuplicateApplicationId {
                application_id: grant.application_id(),
            });
        }
        Ok(())
    }

    /// Record a granted application and mirror it into both indices.
    pub fn add_grant(&mut self, grant: GrantedApplication) -> Result<(), RegistryError> {
        self.check_grant(&grant)?;
        self.insert_grant(grant);
        Ok(())
    }

    /// Strict lookup by application id.
    pub fn grant(&self, application_id: ApplicationId) -> Result<&GrantedApplication, RegistryError> {
        self.applications
            .get(&application_id)
            .ok_or(RegistryError::ApplicationNotFound { application_id })
    }

    pub fn application_is_granted(&self, application_id: ApplicationId) -> bool {
        self.applications.contains_key(&application_id)
    }

    /// Granted application ids in insertion order.
    pub fn application_ids(&self) -> &[ApplicationId] {
        &self.application_ids
    }

    /// Grant records in insertion order.
    pub fn grants(&self) -> impl Iterator<Item = &GrantedApplication> + '_ {
        self.application_ids
            .iter()
            .filter_map(move |id| self.applications.get(id))
    }

    /// Applications granted by a certifier, oldest first. Empty if none.
    pub fn certifier_application_ids(&self, principal: PrincipalId) -> &[ApplicationId] {
        self.certifier_applications
            .get(&principal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Applications granted to an applicant, oldest first. Empty if none.
    pub fn applicant_application_ids(&self, principal: PrincipalId) -> &[ApplicationId] {
        self.applicant_applications
            .get(&principal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn certifier_count(&self) -> usize {
        self.certifier_accounts.len()
    }

    pub fn applicant_count(&self) -> usize {
        self.applicant_accounts.len()
    }

    pub fn application_count(&self) -> usize {
        self.application_ids.len()
    }

    // ── Unchecked writes (callers must have validated) ───────────────

    pub(crate) fn insert_certifier(&mut self, certifier: Certifier) {
        let principal = certifier.principal();
        self.certifier_accounts.push(principal);
        self.certifiers.insert(principal, certifier);
    }

    pub(crate) fn insert_applicant(&mut self, applicant: ApprovedApplicant) {
        let principal = applicant.principal();
        self.applicant_accounts.push(principal);
        self.applicants.insert(principal, applicant);
    }

    pub(crate) fn insert_grant(&mut self, grant: GrantedApplication) {
        let id = grant.application_id();
        self.application_ids.push(id);
        self.certifier_applications
            .entry(grant.certifier())
            .or_default()
            .push(id);
        self.applicant_applications
            .entry(grant.applicant())
            .or_default()
            .push(id);
        self.applications.insert(id, grant);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
