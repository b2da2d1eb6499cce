//! # zpl-cli — Command-Line Interface for Zenpack Specifications
//!
//! Provides the `zpl` binary over `zpl-codec`.
//!
//! ## Subcommands
//!
//! - `zpl lint` — Compile a document and list every problem found.
//! - `zpl dump` — Rewrite a document in canonical form, defaults omitted.
//! - `zpl relationships` — List resolved relationships per class.
//! - `zpl yuml` — Print class relationships as yUML or compact notation.
//!
//! ```bash
//! zpl lint zenpack.yaml
//! zpl dump zenpack.yaml --params --out zenpack.canonical.yaml
//! zpl relationships zenpack.yaml --format json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to `zpl-codec` and `zpl-spec`; no modeling logic
//!   lives here.

pub mod config;
pub mod dump;
pub mod lint;
pub mod relationships;
pub mod yuml;

use std::path::Path;

use anyhow::{Context, Result};
use zpl_codec::CompileOptions;
use zpl_core::{Diagnostic, Diagnostics, Mode, ZplError};
use zpl_spec::ZenPackSpec;

/// The result of compiling one document file.
#[derive(Debug)]
pub struct Compilation {
    /// The built specification, or the diagnostic that aborted the build.
    pub outcome: Result<ZenPackSpec, Diagnostic>,
    /// Everything reported without aborting.
    pub diagnostics: Diagnostics,
}

impl Compilation {
    /// Read and compile a document file.
    pub fn run(path: &Path, mode: Mode, options: &CompileOptions) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(ZplError::from)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let source = path.display().to_string();
        let mut diagnostics = Diagnostics::new(mode);
        let outcome = zpl_codec::compile(&source, &text, &mut diagnostics, options);
        Ok(Self {
            outcome,
            diagnostics,
        })
    }

    /// The specification, with anything reported along the way written to
    /// stderr.
    pub fn into_spec(self) -> Result<ZenPackSpec> {
        for diagnostic in self.diagnostics.diagnostics() {
            eprintln!("{diagnostic}");
        }
        let spec = self
            .outcome
            .map_err(ZplError::from)
            .context("compilation aborted")?;
        Ok(spec)
    }
}
