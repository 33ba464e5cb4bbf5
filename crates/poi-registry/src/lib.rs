//! # poi-registry — Permissioned Credential Registry
//!
//! The registry records who may certify, who has been approved, and which
//! applications were granted by which certifier to which applicant. Only the
//! governor may write. Records are never edited or removed.
//!
//! ## Components
//!
//! - [`access`] — the governor gate.
//! - [`ledger`] — the three tables and the two derived per-principal
//!   application indices.
//! - [`batch`] — column assembly and all-or-nothing staging.
//! - [`events`] — one notification per successful mutation.
//! - [`registry`] — [`ProofOfIntegrity`], the thread-safe facade tying the
//!   above together.
//! - [`snapshot`] — durable JSON form with a SHA-256 ledger digest.
//!
//! ## Example
//!
//! ```
//! use poi_core::{ApplicationId, PrincipalId};
//! use poi_registry::{ProofOfIntegrity, RegistryConfig};
//!
//! let governor = PrincipalId::from_bytes([0xaa; 20]);
//! let cert = PrincipalId::from_bytes([1; 20]);
//! let appl = PrincipalId::from_bytes([2; 20]);
//!
//! let registry = ProofOfIntegrity::new(RegistryConfig { governor });
//! registry.add_certifier(governor, "Ada", "Lovelace", 1, cert).unwrap();
//! registry.add_approved_applicant(governor, "Alan", "Turing", 2, appl).unwrap();
//! registry
//!     .add_granted_application(governor, cert, appl, ApplicationId::new(100))
//!     .unwrap();
//!
//! assert!(registry.approved_applicant_is_registered(appl));
//! assert_eq!(
//!     registry.get_certifier_application_ids(cert),
//!     vec![ApplicationId::new(100)]
//! );
//! ```

pub mod access;
pub mod batch;
pub mod events;
pub mod ledger;
pub mod registry;
pub mod snapshot;

pub use access::AccessControl;
pub use events::{EventLog, EventSink, Notifier, RegistryEvent, TracingSink};
pub use ledger::Ledger;
pub use registry::{ProofOfIntegrity, RegistryConfig};
pub use snapshot::{RegistrySnapshot, SnapshotError, SNAPSHOT_FORMAT_VERSION};
