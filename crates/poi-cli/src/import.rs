//! # Import Subcommand
//!
//! Applies a YAML batch manifest. The manifest has up to three sections,
//! each given as parallel columns:
//!
//! ```yaml
//! certifiers:
//!   first_names: [Ada]
//!   last_names: [Lovelace]
//!   ids: [1]
//!   principals: ["0x1111111111111111111111111111111111111111"]
//! applicants:
//!   first_names: [Alan]
//!   last_names: [Turing]
//!   ids: [2]
//!   principals: ["0x2222222222222222222222222222222222222222"]
//! applications:
//!   certifiers: ["0x1111111111111111111111111111111111111111"]
//!   applicants: ["0x2222222222222222222222222222222222222222"]
//!   ids: [100]
//! ```
//!
//! Sections run in the order shown, each as one atomic batch, so a grant
//! may reference parties registered earlier in the same manifest. The
//! ledger file is written only if every section succeeds, and not at all
//! for a manifest with no sections.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use poi_core::{ApplicationId, PrincipalId};

use crate::ledger_file::LedgerFile;

/// Arguments for `poi import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the YAML manifest.
    pub manifest: PathBuf,

    /// Principal submitting the batches; must be the governor.
    #[arg(long)]
    pub caller: PrincipalId,
}

/// A batch manifest.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub certifiers: Option<PartyColumns>,
    #[serde(default)]
    pub applicants: Option<PartyColumns>,
    #[serde(default)]
    pub applications: Option<GrantColumns>,
}

/// Columns for a certifier or applicant batch.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartyColumns {
    #[serde(default)]
    pub first_names: Vec<String>,
    #[serde(default)]
    pub last_names: Vec<String>,
    #[serde(default)]
    pub ids: Vec<u64>,
    #[serde(default)]
    pub principals: Vec<PrincipalId>,
}

/// Columns for a grant batch.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantColumns {
    #[serde(default)]
    pub certifiers: Vec<PrincipalId>,
    #[serde(default)]
    pub applicants: Vec<PrincipalId>,
    #[serde(default)]
    pub ids: Vec<u64>,
}

impl Manifest {
    /// Whether the manifest names no section at all.
    pub fn is_empty(&self) -> bool {
        self.certifiers.is_none() && self.applicants.is_none() && self.applications.is_none()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse manifest {}", path.display()))
    }
}

/// Execute the import subcommand.
pub fn run_import(args: &ImportArgs, ledger: &Path) -> Result<u8> {
    let manifest = Manifest::load(&args.manifest)?;
    let file = LedgerFile::open(ledger)?;
    if manifest.is_empty() {
        println!("OK: {} has no sections; ledger unchanged", args.manifest.display());
        return Ok(0);
    }
    let registry = file.registry();
    let caller = args.caller;

    if let Some(c) = &manifest.certifiers {
        let n = registry
            .add_certifiers(caller, &c.first_names, &c.last_names, &c.ids, &c.principals)
            .context("certifiers section rejected")?;
        println!("  certifiers: {n} added");
    }
    if let Some(a) = &manifest.applicants {
        let n = registry
            .add_approved_applicants(caller, &a.first_names, &a.last_names, &a.ids, &a.principals)
            .context("applicants section rejected")?;
        println!("  applicants: {n} added");
    }
    if let Some(g) = &manifest.applications {
        let ids: Vec<ApplicationId> = g.ids.iter().copied().map(ApplicationId::new).collect();
        let n = registry
            .add_granted_applications(caller, &g.certifiers, &g.applicants, &ids)
            .context("applications section rejected")?;
        println!("  applications: {n} granted");
    }

    let snapshot = file.commit()?;
    println!(
        "OK: imported {} into {}",
        args.manifest.display(),
        ledger.display()
    );
    println!("  Digest: {}", snapshot.digest);
    Ok(0)
}
