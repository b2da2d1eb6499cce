//! # Dump Subcommand
//!
//! Rewrites a document in canonical form: declared key order, `DEFAULTS`
//! first and every value equal to its default left out. With `--params`
//! the document's `DEFAULTS` entries are kept instead of being folded into
//! their siblings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use zpl_core::Mode;

use crate::config::{CliConfig, CompileFlags};
use crate::Compilation;

/// Arguments for the dump subcommand.
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Specification document.
    pub path: PathBuf,

    #[command(flatten)]
    pub flags: CompileFlags,

    /// Keep `DEFAULTS` entries.
    #[arg(long)]
    pub params: bool,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Compile the document named by `args` and return its canonical text.
pub fn dump_text(args: &DumpArgs, config: &CliConfig) -> Result<String> {
    let (mode, mut options) = args.flags.resolve(config, Mode::Strict);
    options.leave_defaults |= args.params;
    let spec = Compilation::run(&args.path, mode, &options)?.into_spec()?;
    zpl_codec::dump(&spec).context("failed to write specification")
}

/// Execute the dump subcommand.
pub fn run_dump(args: &DumpArgs, config: &CliConfig) -> Result<u8> {
    let text = dump_text(args, config)?;
    match &args.out {
        Some(out) => {
            std::fs::write(out, &text)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(out = %out.display(), "specification written");
        }
        None => print!("{text}"),
    }
    Ok(0)
}
