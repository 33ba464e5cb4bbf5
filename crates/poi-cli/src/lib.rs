//! # poi-cli — Proof of Integrity Administration Tool
//!
//! Provides the `poi` command-line interface: deploys a registry into a
//! ledger file and drives it as the governor.
//!
//! ## Subcommands
//!
//! - `poi init` — create a ledger and fix its governor.
//! - `poi certifier` / `poi applicant` — add, show, verify, list.
//! - `poi grant` — add, show, list granted applications.
//! - `poi import` — apply a YAML batch manifest.
//! - `poi status` — governor, counts, digest.
//!
//! ```bash
//! poi init --governor 0x9090909090909090909090909090909090909090
//! poi certifier add --caller 0x9090... --first-name Ada --last-name Lovelace \
//!     --id 1 --principal 0x1111...
//! poi certifier verify --principal 0x1111... --first-name Ada \
//!     --last-name Lovelace --id 1
//! ```
//!
//! ## Concurrency
//!
//! Each command holds an exclusive lock on `<ledger>.lock` from load to
//! save. A second `poi` command against the same ledger fails instead of
//! overwriting the first one's result.
//!
//! ## Exit Codes
//!
//! `0` success, `1` error, `2` a `verify` that did not match.

pub mod grant;
pub mod import;
pub mod init;
pub mod ledger_file;
pub mod lock;
pub mod party;
pub mod status;
