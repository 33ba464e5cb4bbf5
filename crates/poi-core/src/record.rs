//! # Registry Records
//!
//! The three record kinds stored by the registry. Each is created once and
//! never modified: fields are private and only readable through accessors.
//!
//! Certifiers and approved applicants share a shape but live in disjoint
//! tables, so they are distinct types. A `Certifier` cannot be inserted into
//! the applicant table by mistake.

use serde::{Deserialize, Serialize};

use crate::identity::{ApplicationId, PrincipalId};

/// A principal trusted to vouch for applicants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certifier {
    first_name: String,
    last_name: String,
    certifier_id: u64,
    principal: PrincipalId,
}

impl Certifier {
    /// Build a certifier record.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        certifier_id: u64,
        principal: PrincipalId,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            certifier_id,
            principal,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn certifier_id(&self) -> u64 {
        self.certifier_id
    }

    pub fn principal(&self) -> PrincipalId {
        self.principal
    }

    /// Whether the stored fields equal the supplied ones exactly.
    pub fn matches(&self, first_name: &str, last_name: &str, certifier_id: u64) -> bool {
        self.first_name == first_name
            && self.last_name == last_name
            && self.certifier_id == certifier_id
    }
}

/// A principal eligible to receive a grant from a certifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedApplicant {
    first_name: String,
    last_name: String,
    applicant_id: u64,
    principal: PrincipalId,
}

impl ApprovedApplicant {
    /// Build an approved applicant record.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        applicant_id: u64,
        principal: PrincipalId,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            applicant_id,
            principal,
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn applicant_id(&self) -> u64 {
        self.applicant_id
    }

    pub fn principal(&self) -> PrincipalId {
        self.principal
    }

    /// Whether the stored fields equal the supplied ones exactly.
    pub fn matches(&self, first_name: &str, last_name: &str, applicant_id: u64) -> bool {
        self.first_name == first_name
            && self.last_name == last_name
            && self.applicant_id == applicant_id
    }
}

/// An immutable link between one certifier and one applicant.
///
/// The `application_id` is the record's external identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantedApplication {
    application_id: ApplicationId,
    certifier: PrincipalId,
    applicant: PrincipalId,
}

impl GrantedApplication {
    /// Build a granted application record.
    pub fn new(application_id: ApplicationId, certifier: PrincipalId, applicant: PrincipalId) -> Self {
        Self {
            application_id,
            certifier,
            applicant,
        }
    }

    pub fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    pub fn certifier(&self) -> PrincipalId {
        self.certifier
    }

    pub fn applicant(&self) -> PrincipalId {
        self.applicant
    }
}
