//! # Init Subcommand
//!
//! Deploys a new, empty registry: writes a ledger file that fixes the
//! governor. Nothing can change the governor afterwards.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use poi_core::PrincipalId;

use crate::ledger_file::LedgerFile;

/// Arguments for `poi init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// The principal allowed to mutate the registry.
    #[arg(long)]
    pub governor: PrincipalId,
}

/// Create the ledger file.
pub fn run_init(args: &InitArgs, ledger: &Path) -> Result<u8> {
    let file = LedgerFile::create(ledger, args.governor)?;
    let snapshot = file.commit()?;
    tracing::info!(governor = %args.governor, path = %ledger.display(), "ledger initialized");
    println!(
        "OK: initialized {} governed by {}",
        ledger.display(),
        args.governor
    );
    println!("  Digest: {}", snapshot.digest);
    Ok(0)
}
