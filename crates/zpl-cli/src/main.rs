//! # zpl CLI entry point
//!
//! Parses command-line arguments, loads the optional configuration file and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zpl_cli::config::CliConfig;
use zpl_cli::dump::{run_dump, DumpArgs};
use zpl_cli::lint::{run_lint, LintArgs};
use zpl_cli::relationships::{run_relationships, RelationshipsArgs};
use zpl_cli::yuml::{run_yuml, YumlArgs};

/// Zenpack specification compiler.
///
/// Compiles `!ZenPackSpec` YAML documents into a validated model, reports
/// every problem with its source position, and writes documents back out
/// in canonical form.
#[derive(Parser, Debug)]
#[command(name = "zpl", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a document and list every problem found.
    Lint(LintArgs),

    /// Rewrite a document in canonical form.
    Dump(DumpArgs),

    /// List resolved relationships per class.
    Relationships(RelationshipsArgs),

    /// Print class relationships as yUML or compact notation.
    Yuml(YumlArgs),
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

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| {
        tracing::debug!(?config, "configuration loaded");
        match &cli.command {
            Commands::Lint(args) => run_lint(args, &config),
            Commands::Dump(args) => run_dump(args, &config),
            Commands::Relationships(args) => run_relationships(args, &config),
            Commands::Yuml(args) => run_yuml(args, &config),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
