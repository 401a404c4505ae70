//! `trialgate` command-line tool: validate trial files and list the rule catalogue.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trialgate::{BindContext, Engine, RuleId, SignatureRegistry, TrialGateError};

#[derive(Parser)]
#[command(
    name = "trialgate",
    version,
    about = "Clinical-trial eligibility criteria checker"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v for debug, -vv for trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and bind every criterion of a trial file, reporting all problems.
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List every rule in the catalogue with its input signature.
    Rules,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Check { file } => check(&file),
        Command::Rules => {
            list_rules();
            Ok(true)
        }
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `Ok(false)` when the file loads but contains invalid criteria.
fn check(file: &Path) -> anyhow::Result<bool> {
    let engine = Engine::standard(BindContext::default())
        .context("standard rule registries are inconsistent")?;
    match engine.load_trial_file(file) {
        Ok(trial) => {
            println!("{}: {} criteria OK", file.display(), trial.len());
            Ok(true)
        }
        Err(TrialGateError::TrialLoad(error)) => {
            println!("{}: {error}", file.display());
            Ok(false)
        }
        Err(error) => {
            Err(error).with_context(|| format!("failed to check {}", file.display()))
        }
    }
}

fn list_rules() {
    let signatures = SignatureRegistry::standard();
    for rule in RuleId::ALL {
        match signatures.get(*rule) {
            Some(signature) if signature.is_empty() => println!("{rule}"),
            Some(signature) => println!("{rule} {signature}"),
            None => println!("{rule} (composite)"),
        }
    }
}
