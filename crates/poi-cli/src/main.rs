//! # poi CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use poi_cli::grant::{run_grant, GrantArgs};
use poi_cli::import::{run_import, ImportArgs};
use poi_cli::init::{run_init, InitArgs};
use poi_cli::ledger_file::DEFAULT_LEDGER;
use poi_cli::party::{run_party, PartyArgs, Role};
use poi_cli::status::{run_status, StatusArgs};

/// Proof of Integrity registry administration.
///
/// Keeps certifiers, approved applicants and granted applications in a
/// ledger file. Only the governor fixed at `init` may change it.
#[derive(Parser, Debug)]
#[command(name = "poi", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the ledger file.
    #[arg(long, global = true, default_value = DEFAULT_LEDGER)]
    ledger: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new ledger governed by one principal.
    Init(InitArgs),

    /// Register, show, verify or list certifiers.
    Certifier(PartyArgs),

    /// Register, show, verify or list approved applicants.
    Applicant(PartyArgs),

    /// Grant, show or list applications.
    Grant(GrantArgs),

    /// Apply a YAML batch manifest.
    Import(ImportArgs),

    /// Summarize the ledger.
    Status(StatusArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(ledger = %cli.ledger.display(), "poi starting");

    let ledger = cli.ledger.as_path();
    let result = match &cli.command {
        Commands::Init(args) => run_init(args, ledger),
        Commands::Certifier(args) => run_party(Role::Certifier, args, ledger),
        Commands::Applicant(args) => run_party(Role::Applicant, args, ledger),
        Commands::Grant(args) => run_grant(args, ledger),
        Commands::Import(args) => run_import(args, ledger),
        Commands::Status(args) => run_status(args, ledger),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::from(1)
        }
    }
}
