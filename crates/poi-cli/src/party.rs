//! # Certifier and Applicant Subcommands
//!
//! `poi certifier ...` and `poi applicant ...` share one argument shape and
//! differ only in which table they address.
//!
//! - `add` — register one party (governor only).
//! - `show` — print a registered party and its application ids.
//! - `verify` — exit 0 if the stored fields match, 2 if not.
//! - `list` — print every registered principal in registration order.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use poi_core::{ApplicationId, PrincipalId};
use poi_registry::ProofOfIntegrity;

use crate::ledger_file::LedgerFile;

/// Which table a party command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Certifier,
    Applicant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certifier => "certifier",
            Self::Applicant => "applicant",
        }
    }
}

/// Arguments for `poi certifier` and `poi applicant`.
#[derive(Args, Debug)]
pub struct PartyArgs {
    #[command(subcommand)]
    pub command: PartyCommand,
}

#[derive(Subcommand, Debug)]
pub enum PartyCommand {
    /// Register a party.
    Add {
        /// Principal submitting the mutation; must be the governor.
        #[arg(long)]
        caller: PrincipalId,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// Certifier or applicant id.
        #[arg(long)]
        id: u64,
        /// The party's principal.
        #[arg(long)]
        principal: PrincipalId,
    },

    /// Show a registered party.
    Show {
        #[arg(long)]
        principal: PrincipalId,
    },

    /// Check a party's stored fields.
    Verify {
        #[arg(long)]
        principal: PrincipalId,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        id: u64,
    },

    /// List registered principals.
    List,
}

/// Execute a certifier or applicant subcommand.
pub fn run_party(role: Role, args: &PartyArgs, ledger: &Path) -> Result<u8> {
    let file = LedgerFile::open(ledger)?;
    match &args.command {
        PartyCommand::Add {
            caller,
            first_name,
            last_name,
            id,
            principal,
        } => cmd_add(&file, role, *caller, first_name, last_name, *id, *principal),
        PartyCommand::Show { principal } => cmd_show(file.registry(), role, *principal),
        PartyCommand::Verify {
            principal,
            first_name,
            last_name,
            id,
        } => Ok(cmd_verify(
            file.registry(),
            role,
            *principal,
            first_name,
            last_name,
            *id,
        )),
        PartyCommand::List => Ok(cmd_list(file.registry(), role)),
    }
}

fn cmd_add(
    file: &LedgerFile,
    role: Role,
    caller: PrincipalId,
    first_name: &str,
    last_name: &str,
    id: u64,
    principal: PrincipalId,
) -> Result<u8> {
    let registry = file.registry();
    match role {
        Role::Certifier => registry.add_certifier(caller, first_name, last_name, id, principal)?,
        Role::Applicant => {
            registry.add_approved_applicant(caller, first_name, last_name, id, principal)?
        }
    }
    file.commit()?;
    println!("OK: registered {} {principal}", role.as_str());
    for event in file.published() {
        println!("  Event: {event}");
    }
    Ok(0)
}

fn cmd_show(registry: &ProofOfIntegrity, role: Role, principal: PrincipalId) -> Result<u8> {
    let (first, last, id, applications) = match role {
        Role::Certifier => {
            let c = registry.get_certifier(principal)?;
            (
                c.first_name().to_string(),
                c.last_name().to_string(),
                c.certifier_id(),
                registry.get_certifier_application_ids(principal),
            )
        }
        Role::Applicant => {
            let a = registry.get_approved_applicant(principal)?;
            (
                a.first_name().to_string(),
                a.last_name().to_string(),
                a.applicant_id(),
                registry.get_approved_applicant_application_ids(principal),
            )
        }
    };
    println!("{}: {principal}", capitalize(role.as_str()));
    println!("  Name: {first} {last}");
    println!("  Id: {id}");
    println!("  Applications: {}", join_ids(&applications));
    Ok(0)
}

fn cmd_verify(
    registry: &ProofOfIntegrity,
    role: Role,
    principal: PrincipalId,
    first_name: &str,
    last_name: &str,
    id: u64,
) -> u8 {
    let matched = match role {
        Role::Certifier => registry.verify_certifier(principal, first_name, last_name, id),
        Role::Applicant => registry.verify_approved_applicant(principal, first_name, last_name, id),
    };
    if matched {
        println!("OK: {} {principal} verified", role.as_str());
        0
    } else {
        println!("MISMATCH: {} {principal} not verified", role.as_str());
        2
    }
}

fn cmd_list(registry: &ProofOfIntegrity, role: Role) -> u8 {
    let accounts = match role {
        Role::Certifier => registry.get_certifiers_accounts(),
        Role::Applicant => registry.get_approved_applicants_accounts(),
    };
    if accounts.is_empty() {
        println!("No {}s registered.", role.as_str());
    }
    for principal in accounts {
        println!("{principal}");
    }
    0
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Comma-separated ids, or `-` when there are none.
pub(crate) fn join_ids(ids: &[ApplicationId]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
