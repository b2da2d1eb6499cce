//! # yUML Subcommand
//!
//! Prints the class relationships of a document, one per line, as yUML
//! (`[Rack]++ -[Shelf]`) for pasting into a diagram tool, or in the compact
//! form used inside documents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use zpl_core::Mode;
use zpl_spec::ZenPackSpec;

use crate::config::{CliConfig, CompileFlags};
use crate::Compilation;

/// Arguments for the yuml subcommand.
#[derive(Args, Debug)]
pub struct YumlArgs {
    /// Specification document.
    pub path: PathBuf,

    #[command(flatten)]
    pub flags: CompileFlags,

    /// Print compact notation (`Rack 1:MC Shelf`) instead.
    #[arg(long)]
    pub compact: bool,
}

/// One notation line per class relationship, in declaration order.
pub fn notation_lines(spec: &ZenPackSpec, compact: bool) -> Result<Vec<String>> {
    spec.class_relationships()
        .iter()
        .map(|schema| {
            if compact {
                Ok(schema.to_notation())
            } else {
                schema
                    .to_yuml()
                    .with_context(|| format!("cannot write '{}' as yUML", schema.to_notation()))
            }
        })
        .collect()
}

/// Execute the yuml subcommand.
pub fn run_yuml(args: &YumlArgs, config: &CliConfig) -> Result<u8> {
    let (mode, options) = args.flags.resolve(config, Mode::Strict);
    let spec = Compilation::run(&args.path, mode, &options)?.into_spec()?;
    for line in notation_lines(&spec, args.compact)? {
        println!("{line}");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zpl_codec::CompileOptions;
    use zpl_core::Diagnostics;

    fn compile(text: &str) -> ZenPackSpec {
        let mut diags = Diagnostics::new(Mode::Strict);
        zpl_codec::compile("y.yaml", text, &mut diags, &CompileOptions::default()).unwrap()
    }

    #[test]
    fn yuml_lines_reparse_to_the_same_schemas() {
        let spec = compile(
            "!ZenPackSpec\nname: ZenPacks.test.Y\nclasses:\n  Rack: {}\n  Shelf: {}\n\
             class_relationships:\n  - Rack 1:MC Shelf\n  - Rack(spare) 1:1 (backup)Shelf\n",
        );
        let lines = notation_lines(&spec, false).unwrap();
        assert_eq!(lines[0], "[Rack]++ -[Shelf]");

        let block = lines.join("\n");
        let again = compile(&format!(
            "!ZenPackSpec\nname: ZenPacks.test.Y\nclasses:\n  Rack: {{}}\n  Shelf: {{}}\n\
             class_relationships: |\n  {}\n",
            block.replace('\n', "\n  ")
        ));
        assert_eq!(again.class_relationships(), spec.class_relationships());
    }

    #[test]
    fn compact_lines_omit_default_names() {
        let spec = compile(
            "!ZenPackSpec\nname: ZenPacks.test.Y\nclasses:\n  Rack: {}\n  Shelf: {}\n\
             class_relationships:\n  - Rack(shelfs) 1:MC (rack)Shelf\n",
        );
        assert_eq!(notation_lines(&spec, true).unwrap(), ["Rack 1:MC Shelf"]);
    }
}
