//! # poi-core — Foundational Types for the Proof of Integrity Registry
//!
//! This crate is the leaf of the workspace. It defines the identifiers,
//! records, and errors that the registry and its tooling share. It depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `PrincipalId` and `ApplicationId`
//!    are distinct types. A certifier's principal can never be passed where
//!    an application id is expected.
//!
//! 2. **Immutable records.** `Certifier`, `ApprovedApplicant`, and
//!    `GrantedApplication` expose read accessors only. Once the registry
//!    stores a record, nothing can change it.
//!
//! 3. **`CanonicalBytes` for every digest.** Ledger digests are computed from
//!    JCS-canonical bytes, so the same ledger always hashes to the same value
//!    regardless of field order on disk.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `poi-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod record;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, ErrorKind, IdentityError, RegistryError};
pub use identity::{ApplicationId, PrincipalId, PRINCIPAL_LEN};
pub use record::{ApprovedApplicant, Certifier, GrantedApplication};
