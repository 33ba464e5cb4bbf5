//! # Grant Subcommand
//!
//! Grants applications and queries the grant table and its per-principal
//! indices.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};

use poi_core::{ApplicationId, PrincipalId};

use crate::ledger_file::LedgerFile;

/// Arguments for `poi grant`.
#[derive(Args, Debug)]
pub struct GrantArgs {
    #[command(subcommand)]
    pub command: GrantCommand,
}

#[derive(Subcommand, Debug)]
pub enum GrantCommand {
    /// Grant an application from a certifier to an applicant.
    Add {
        /// Principal submitting the mutation; must be the governor.
        #[arg(long)]
        caller: PrincipalId,
        #[arg(long)]
        certifier: PrincipalId,
        #[arg(long)]
        applicant: PrincipalId,
        /// Application id; must be unused.
        #[arg(long)]
        id: u64,
    },

    /// Show one granted application.
    Show {
        #[arg(long)]
        id: u64,
    },

    /// List granted application ids, optionally for one party.
    List {
        /// Only applications granted by this certifier.
        #[arg(long, conflicts_with = "applicant")]
        certifier: Option<PrincipalId>,
        /// Only applications granted to this applicant.
        #[arg(long)]
        applicant: Option<PrincipalId>,
    },
}

/// Execute the grant subcommand.
pub fn run_grant(args: &GrantArgs, ledger: &Path) -> Result<u8> {
    let file = LedgerFile::open(ledger)?;
    let registry = file.registry();

    match &args.command {
        GrantCommand::Add {
            caller,
            certifier,
            applicant,
            id,
        } => {
            let id = ApplicationId::new(*id);
            registry.add_granted_application(*caller, *certifier, *applicant, id)?;
            file.commit()?;
            println!("OK: granted application {id} from {certifier} to {applicant}");
            for event in file.published() {
                println!("  Event: {event}");
            }
            Ok(0)
        }

        GrantCommand::Show { id } => {
            let grant = registry.get_granted_application(ApplicationId::new(*id))?;
            println!("Application: {}", grant.application_id());
            println!("  Certifier: {}", grant.certifier());
            println!("  Applicant: {}", grant.applicant());
            Ok(0)
        }

        GrantCommand::List {
            certifier,
            applicant,
        } => {
            let ids = match (certifier, applicant) {
                (Some(c), _) => registry.get_certifier_application_ids(*c),
                (None, Some(a)) => registry.get_approved_applicant_application_ids(*a),
                (None, None) => registry.get_granted_application_ids(),
            };
            if ids.is_empty() {
                println!("No applications granted.");
            }
            for id in ids {
                println!("{id}");
            }
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::{run_init, InitArgs};

    fn principal(byte: u8) -> PrincipalId {
        PrincipalId::from_bytes([byte; 20])
    }

    const GOV: u8 = 0x90;

    fn make_ledger_with_parties(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("ledger.json");
        run_init(
            &InitArgs {
                governor: principal(GOV),
            },
            &path,
        )
        .unwrap();
        let file = LedgerFile::open(&path).unwrap();
        let registry = file.registry();
        registry
            .add_certifier(principal(GOV), "C", "One", 1, principal(0xc1))
            .unwrap();
        registry
            .add_approved_applicant(principal(GOV), "A", "One", 2, principal(0xa1))
            .unwrap();
        file.commit().unwrap();
        path
    }

    fn add(id: u64, certifier: u8) -> GrantArgs {
        GrantArgs {
            command: GrantCommand::Add {
                caller: principal(GOV),
                certifier: principal(certifier),
                applicant: principal(0xa1),
                id,
            },
        }
    }

    #[test]
    fn grant_add_persists_indices() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_ledger_with_parties(&dir);
        assert_eq!(run_grant(&add(10, 0xc1), &path).unwrap(), 0);
        assert_eq!(run_grant(&add(4, 0xc1), &path).unwrap(), 0);

        let file = LedgerFile::open(&path).unwrap();
        assert_eq!(
            file.registry().get_certifier_application_ids(principal(0xc1)),
            vec![ApplicationId::new(10), ApplicationId::new(4)]
        );
    }

    #[test]
    fn grant_from_unknown_certifier_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_ledger_with_parties(&dir);
        let err = run_grant(&add(10, 0xc2), &path).unwrap_err();
        assert!(err.to_string().contains("Invalid certifier wallet address"));
    }

    #[test]
    fn grant_duplicate_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_ledger_with_parties(&dir);
        run_grant(&add(10, 0xc1), &path).unwrap();
        let err = run_grant(&add(10, 0xc1), &path).unwrap_err();
        assert!(err.to_string().contains("Application ID already in use"));
    }

    #[test]
    fn grant_show_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_ledger_with_parties(&dir);
        run_grant(&add(10, 0xc1), &path).unwrap();

        let show = GrantArgs {
            command: GrantCommand::Show { id: 10 },
        };
        assert_eq!(run_grant(&show, &path).unwrap(), 0);

        let missing = GrantArgs {
            command: GrantCommand::Show { id: 11 },
        };
        assert!(run_grant(&missing, &path).is_err());

        let list = GrantArgs {
            command: GrantCommand::List {
                certifier: None,
                applicant: Some(principal(0xa1)),
            },
        };
        assert_eq!(run_grant(&list, &path).unwrap(), 0);
    }
}
