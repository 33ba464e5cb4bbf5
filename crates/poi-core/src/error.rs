//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by the registry and its tooling. All
//! errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Registry errors are terminal and synchronous. Nothing is retried
//!   internally; the caller decides whether to resubmit corrected input.
//! - Every registry error carries the offending principal, application id,
//!   or batch row so the rejection can be traced back to its input.
//! - Display strings keep the revert reasons operators already know from the
//!   deployed registry ("Wallet address already in use", ...).

use thiserror::Error;

use crate::identity::{ApplicationId, PrincipalId};

/// The seven failure classes a registry operation can report.
///
/// [`RegistryError`] carries context; `ErrorKind` is what callers match on
/// when only the class of failure matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller is not the governor.
    Unauthorized,
    /// Principal already registered in the target table.
    DuplicatePrincipal,
    /// Strict lookup on an absent record.
    NotRegistered,
    /// Grant references a principal missing from the certifier table.
    InvalidCertifier,
    /// Grant references a principal missing from the applicant table.
    InvalidApplicant,
    /// Application id already granted.
    DuplicateApplicationId,
    /// Batch columns have different lengths.
    ArrayLengthMismatch,
}

impl ErrorKind {
    /// Stable identifier for logs and machine-readable output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::DuplicatePrincipal => "DUPLICATE_PRINCIPAL",
            Self::NotRegistered => "NOT_REGISTERED",
            Self::InvalidCertifier => "INVALID_CERTIFIER",
            Self::InvalidApplicant => "INVALID_APPLICANT",
            Self::DuplicateApplicationId => "DUPLICATE_APPLICATION_ID",
            Self::ArrayLengthMismatch => "ARRAY_LENGTH_MISMATCH",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by registry mutations and strict lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller is not the configured governor.
    #[error("The caller is not the governor. (caller {caller})")]
    Unauthorized {
        /// The principal that attempted the mutation.
        caller: PrincipalId,
    },

    /// The principal already holds a record in the target table.
    #[error("Wallet address already in use: {principal}")]
    DuplicatePrincipal {
        /// The principal that is already registered.
        principal: PrincipalId,
    },

    /// Strict lookup on a principal with no record in the target table.
    #[error("Invalid wallet address: {principal}")]
    NotRegistered {
        /// The principal that was looked up.
        principal: PrincipalId,
    },

    /// Strict lookup on an application id that was never granted.
    #[error("Invalid application ID: {application_id}")]
    ApplicationNotFound {
        /// The application id that was looked up.
        application_id: ApplicationId,
    },

    /// The certifier principal of a grant is not registered.
    #[error("Invalid certifier wallet address: {principal}")]
    InvalidCertifier {
        /// The unregistered certifier principal.
        principal: PrincipalId,
    },

    /// The applicant principal of a grant is not registered.
    #[error("Invalid applicant wallet address: {principal}")]
    InvalidApplicant {
        /// The unregistered applicant principal.
        principal: PrincipalId,
    },

    /// The application id has already been granted.
    #[error("Application ID already in use: {application_id}")]
    DuplicateApplicationId {
        /// The conflicting application id.
        application_id: ApplicationId,
    },

    /// Batch columns do not all have the same length.
    #[error("Invalid arrays length: {lengths:?}")]
    ArrayLengthMismatch {
        /// The length of each column, in argument order.
        lengths: Vec<usize>,
    },

    /// A row of a batch violated an invariant; the whole batch was rejected.
    #[error("batch row {index} rejected: {source}")]
    BatchRow {
        /// Zero-based position of the offending row.
        index: usize,
        /// The per-row failure.
        #[source]
        source: Box<RegistryError>,
    },
}

impl RegistryError {
    /// The failure class, looking through batch row wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::DuplicatePrincipal { .. } => ErrorKind::DuplicatePrincipal,
            Self::NotRegistered { .. } | Self::ApplicationNotFound { .. } => {
                ErrorKind::NotRegistered
            }
            Self::InvalidCertifier { .. } => ErrorKind::InvalidCertifier,
            Self::InvalidApplicant { .. } => ErrorKind::InvalidApplicant,
            Self::DuplicateApplicationId { .. } => ErrorKind::DuplicateApplicationId,
            Self::ArrayLengthMismatch { .. } => ErrorKind::ArrayLengthMismatch,
            Self::BatchRow { source, .. } => source.kind(),
        }
    }

    /// The offending batch row, if this error rejected a batch.
    pub fn batch_row(&self) -> Option<usize> {
        match self {
            Self::BatchRow { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Wrap this error with the batch row that produced it.
    pub fn at_row(self, index: usize) -> Self {
        Self::BatchRow {
            index,
            source: Box::new(self),
        }
    }
}

/// A principal identifier could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The text form is not `0x` followed by 40 hex digits.
    #[error("invalid principal identifier {input:?}: {reason}")]
    InvalidPrincipal {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
