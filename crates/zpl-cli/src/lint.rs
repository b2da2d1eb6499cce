//! # Lint Subcommand
//!
//! Compiles a document (lenient unless configured otherwise) and prints one
//! line per problem, `source:line:column: message`, followed by a summary.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use zpl_core::Mode;

use crate::config::{CliConfig, CompileFlags};
use crate::Compilation;

/// Arguments for the lint subcommand.
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Specification document.
    pub path: PathBuf,

    #[command(flatten)]
    pub flags: CompileFlags,

    /// Fail when warnings are reported.
    #[arg(long)]
    pub deny_warnings: bool,
}

/// Counts of what a lint run found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintSummary {
    pub errors: usize,
    pub warnings: usize,
    pub aborted: bool,
}

impl LintSummary {
    pub fn exit_code(&self, deny_warnings: bool) -> u8 {
        let failed = self.aborted || self.errors > 0 || (deny_warnings && self.warnings > 0);
        u8::from(failed)
    }
}

impl std::fmt::Display for LintSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} error{}, {} warning{}",
            self.errors,
            if self.errors == 1 { "" } else { "s" },
            self.warnings,
            if self.warnings == 1 { "" } else { "s" },
        )?;
        if self.aborted {
            write!(f, " (aborted)")?;
        }
        Ok(())
    }
}

/// Output lines for a compilation: every diagnostic, the aborting one last.
pub fn lint_lines(compilation: &Compilation) -> (Vec<String>, LintSummary) {
    let mut lines: Vec<String> = compilation
        .diagnostics
        .diagnostics()
        .iter()
        .map(ToString::to_string)
        .collect();
    let mut summary = LintSummary {
        errors: compilation.diagnostics.errors().count(),
        warnings: compilation.diagnostics.warnings().count(),
        aborted: false,
    };
    if let Err(fatal) = &compilation.outcome {
        lines.push(fatal.to_string());
        summary.errors += 1;
        summary.aborted = true;
    }
    (lines, summary)
}

/// Execute the lint subcommand.
pub fn run_lint(args: &LintArgs, config: &CliConfig) -> Result<u8> {
    let (mode, options) = args.flags.resolve(config, Mode::Lenient);
    tracing::debug!(path = %args.path.display(), ?mode, "linting");
    let compilation = Compilation::run(&args.path, mode, &options)?;
    let (lines, summary) = lint_lines(&compilation);
    for line in &lines {
        println!("{line}");
    }
    println!("{summary}");
    Ok(summary.exit_code(args.deny_warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zpl_codec::CompileOptions;

    const PROBLEMS: &str = "\
!ZenPackSpec
name: ZenPacks.test.Pods
classes:
  Pod:
    foo: 1
class_relationships:
  - Pod 1:MC Tray
";

    fn write(text: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zenpack.yaml");
        std::fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[test]
    fn lenient_lint_lists_every_problem() {
        let (_dir, path) = write(PROBLEMS);
        let compilation = Compilation::run(&path, Mode::Lenient, &CompileOptions::default()).unwrap();
        let (lines, summary) = lint_lines(&compilation);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("unrecognized parameter 'foo' found while processing ClassSpec"), "{}", lines[0]);
        assert!(lines[0].contains("zenpack.yaml:5:5: "), "{}", lines[0]);
        assert_eq!(
            summary,
            LintSummary {
                errors: 1,
                warnings: 1,
                aborted: false
            }
        );
        assert_eq!(summary.to_string(), "1 error, 1 warning");
        assert_eq!(summary.exit_code(false), 1);
    }

    #[test]
    fn strict_lint_stops_at_the_first_error() {
        let (_dir, path) = write(PROBLEMS);
        let compilation = Compilation::run(&path, Mode::Strict, &CompileOptions::default()).unwrap();
        let (lines, summary) = lint_lines(&compilation);
        assert_eq!(lines.len(), 1);
        assert!(summary.aborted);
        assert_eq!(summary.to_string(), "1 error, 0 warnings (aborted)");
    }

    #[test]
    fn warnings_fail_only_when_denied() {
        let summary = LintSummary {
            errors: 0,
            warnings: 2,
            aborted: false,
        };
        assert_eq!(summary.exit_code(false), 0);
        assert_eq!(summary.exit_code(true), 1);
    }

    #[test]
    fn clean_document_passes() {
        let (_dir, path) = write("!ZenPackSpec\nname: ZenPacks.test.Pods\nclasses:\n  Pod: {}\n");
        let args = LintArgs {
            path,
            flags: CompileFlags::default(),
            deny_warnings: true,
        };
        assert_eq!(run_lint(&args, &CliConfig::default()).unwrap(), 0);
    }
}
