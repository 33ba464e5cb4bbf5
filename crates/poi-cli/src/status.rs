//! # Status Subcommand
//!
//! Summarizes a ledger: governor, table sizes and the current digest.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use poi_core::PrincipalId;

use crate::ledger_file::LedgerFile;

/// Arguments for `poi status`.
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable ledger summary.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub governor: PrincipalId,
    pub certifiers: usize,
    pub applicants: usize,
    pub applications: usize,
    pub digest: String,
}

impl StatusReport {
    pub fn collect(file: &LedgerFile) -> Result<Self> {
        let registry = file.registry();
        let snapshot = registry.snapshot()?;
        Ok(Self {
            governor: registry.governor(),
            certifiers: snapshot.certifiers.len(),
            applicants: snapshot.applicants.len(),
            applications: snapshot.applications.len(),
            digest: snapshot.digest,
        })
    }
}

/// Execute the status subcommand.
pub fn run_status(args: &StatusArgs, ledger: &Path) -> Result<u8> {
    let file = LedgerFile::open(ledger)?;
    let report = StatusReport::collect(&file)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(0);
    }

    println!("Ledger: {}", file.path().display());
    println!("  Governor: {}", report.governor);
    println!("  Certifiers: {}", report.certifiers);
    println!("  Applicants: {}", report.applicants);
    println!("  Applications: {}", report.applications);
    println!("  Digest: {}", report.digest);
    Ok(0)
}
