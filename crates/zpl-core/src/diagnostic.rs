//! # Diagnostics Channel
//!
//! One record per problem, rendered as `source:line:column: message` (or
//! `source:/path/to/node: message` when the node cannot be located in the
//! source text). Both the relationship notation parser and the codec's
//! decode path report through a [`Diagnostics`] sink.
//!
//! ## Modes
//!
//! - [`Mode::Strict`] — the first error aborts compilation.
//! - [`Mode::Lenient`] — recoverable errors are recorded and the offending
//!   entry is skipped, so the rest of the document still compiles.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SpecError;
use crate::source::SourceIndex;

/// Error propagation policy for a compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Abort on the first error.
    #[default]
    Strict,
    /// Record recoverable errors, skip the offending entry, continue.
    Lenient,
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// The offending entry was skipped or compilation was aborted.
    Error,
    /// The model compiled, but part of it is probably not what the author
    /// intended. Never aborts compilation.
    Warning,
}

impl Level {
    /// Returns the lowercase name of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// Where a problem was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    /// Document name, usually a file path.
    pub source: String,
    /// Path of mapping keys and sequence indexes from the document root.
    pub path: Vec<String>,
    /// 1-based line, when known.
    pub line: Option<usize>,
    /// 1-based column, when known.
    pub column: Option<usize>,
}

impl Location {
    /// A location at the root of the named document.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// The location of a child node one path segment below this one.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(segment.into());
        Self {
            source: self.source.clone(),
            path,
            line: None,
            column: None,
        }
    }

    /// Returns this location with an explicit line and column.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// The path rendered as a JSON-pointer-like string (`/classes/Pod`).
    pub fn pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            out.push('/');
            out.push_str(segment);
        }
        out
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = if self.source.is_empty() {
            "<input>"
        } else {
            self.source.as_str()
        };
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{source}:{line}:{column}"),
            (Some(line), None) => write!(f, "{source}:{line}"),
            _ if self.path.is_empty() => write!(f, "{source}"),
            _ => write!(f, "{source}:{}", self.pointer()),
        }
    }
}

/// A located problem.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{location}: {error}")]
pub struct Diagnostic {
    /// Error or warning.
    pub level: Level,
    /// Where the problem was found.
    pub location: Location,
    /// What the problem is.
    pub error: SpecError,
}

impl Diagnostic {
    /// An error-level diagnostic.
    pub fn error(location: Location, error: SpecError) -> Self {
        Self {
            level: Level::Error,
            location,
            error,
        }
    }

    /// A warning-level diagnostic.
    pub fn warning(location: Location, error: SpecError) -> Self {
        Self {
            level: Level::Warning,
            location,
            error,
        }
    }
}

/// Accumulating sink for diagnostics, applying the configured [`Mode`].
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    mode: Mode,
    items: Vec<Diagnostic>,
    index: Option<SourceIndex>,
}

impl Diagnostics {
    /// Create an empty sink with the given propagation mode.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            items: Vec::new(),
            index: None,
        }
    }

    /// Attach a source index so that reported locations carry line and
    /// column numbers.
    pub fn with_source_index(mut self, index: SourceIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Attach or replace the source index of an existing sink.
    pub fn set_source_index(&mut self, index: SourceIndex) {
        self.index = Some(index);
    }

    /// Returns the propagation mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns true when running in strict mode.
    pub fn is_strict(&self) -> bool {
        self.mode == Mode::Strict
    }

    /// Fill in line and column for `location` from the source index, if one
    /// is attached and the location does not already carry them.
    pub fn locate(&self, location: &Location) -> Location {
        let mut located = location.clone();
        if located.line.is_none() {
            if let Some((line, column)) =
                self.index.as_ref().and_then(|i| i.position(&location.path))
            {
                located.line = Some(line);
                located.column = Some(column);
            }
        }
        located
    }

    /// Report a problem found at `location`.
    ///
    /// # Errors
    ///
    /// Returns the located diagnostic when running in strict mode or when
    /// the error is not recoverable. Otherwise records it and returns `Ok`,
    /// and the caller skips the offending entry.
    pub fn report(&mut self, location: &Location, error: SpecError) -> Result<(), Diagnostic> {
        let diagnostic = Diagnostic::error(self.locate(location), error);
        self.handle(diagnostic)
    }

    /// Report a problem found while parsing relationship notation.
    ///
    /// Identical to [`report`](Self::report) except that an orientation
    /// error is recoverable here: the offending line is skipped.
    ///
    /// # Errors
    ///
    /// Returns the located diagnostic in strict mode or for errors that are
    /// fatal even on the notation path.
    pub fn report_notation(
        &mut self,
        location: &Location,
        error: SpecError,
    ) -> Result<(), Diagnostic> {
        let diagnostic = Diagnostic::error(self.locate(location), error);
        if matches!(diagnostic.error, SpecError::Orientation { .. }) && !self.is_strict() {
            self.items.push(diagnostic);
            return Ok(());
        }
        self.handle(diagnostic)
    }

    /// Handle a diagnostic that was already located, typically one returned
    /// by a child node's construction.
    ///
    /// # Errors
    ///
    /// Returns the diagnostic back in strict mode or when it is fatal.
    pub fn handle(&mut self, diagnostic: Diagnostic) -> Result<(), Diagnostic> {
        if diagnostic.level == Level::Warning {
            self.items.push(diagnostic);
            return Ok(());
        }
        if self.is_strict() || !diagnostic.error.is_recoverable() {
            return Err(diagnostic);
        }
        self.items.push(diagnostic);
        Ok(())
    }

    /// Record a warning. Warnings never abort, in either mode.
    pub fn warn(&mut self, location: &Location, error: SpecError) {
        let diagnostic = Diagnostic::warning(self.locate(location), error);
        self.items.push(diagnostic);
    }

    /// Returns every recorded diagnostic in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Returns the recorded error-level diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.level == Level::Error)
    }

    /// Returns the recorded warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.level == Level::Warning)
    }

    /// Returns true if any error-level diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Returns the number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes self and returns the recorded diagnostics.
    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(param: &str) -> SpecError {
        SpecError::UnknownParameter {
            spec_type: "ClassSpec",
            param: param.to_string(),
        }
    }

    #[test]
    fn location_display_prefers_line_and_column() {
        let loc = Location::new("zenpack.yaml").child("classes").child("Pod");
        assert_eq!(loc.to_string(), "zenpack.yaml:/classes/Pod");
        assert_eq!(loc.at(4, 3).to_string(), "zenpack.yaml:4:3");
        assert_eq!(Location::default().to_string(), "<input>");
    }

    #[test]
    fn strict_mode_returns_first_error() {
        let mut diags = Diagnostics::new(Mode::Strict);
        let err = diags
            .report(&Location::new("a.yaml"), unknown("foo"))
            .unwrap_err();
        assert_eq!(err.error, unknown("foo"));
        assert!(diags.is_empty());
    }

    #[test]
    fn lenient_mode_accumulates_recoverable_errors() {
        let mut diags = Diagnostics::new(Mode::Lenient);
        diags.report(&Location::new("a.yaml"), unknown("foo")).unwrap();
        diags.report(&Location::new("a.yaml"), unknown("bar")).unwrap();
        assert_eq!(diags.len(), 2);
        assert!(diags.has_errors());
    }

    #[test]
    fn lenient_mode_still_aborts_on_construction_error() {
        let mut diags = Diagnostics::new(Mode::Lenient);
        let result = diags.report(
            &Location::new("a.yaml"),
            SpecError::construction("ZenPackSpec", "missing required parameter 'name'"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn orientation_is_recoverable_only_on_the_notation_path() {
        let orientation = SpecError::Orientation {
            left: "A".into(),
            right: "B".into(),
        };
        let mut diags = Diagnostics::new(Mode::Lenient);
        assert!(diags
            .report(&Location::default(), orientation.clone())
            .is_err());
        assert!(diags
            .report_notation(&Location::default(), orientation.clone())
            .is_ok());
        assert_eq!(diags.len(), 1);

        let mut strict = Diagnostics::new(Mode::Strict);
        assert!(strict
            .report_notation(&Location::default(), orientation)
            .is_err());
    }

    #[test]
    fn warnings_never_abort() {
        let mut diags = Diagnostics::new(Mode::Strict);
        diags.warn(&Location::default(), unknown("x"));
        assert_eq!(diags.warnings().count(), 1);
        assert!(!diags.has_errors());
    }

    #[test]
    fn source_index_fills_positions() {
        let text = "name: ZenPacks.test.Pods\nclasses:\n  Pod:\n    foo: 1\n";
        let mut diags =
            Diagnostics::new(Mode::Lenient).with_source_index(SourceIndex::scan(text));
        let loc = Location::new("pods.yaml")
            .child("classes")
            .child("Pod")
            .child("foo");
        diags.report(&loc, unknown("foo")).unwrap();
        assert_eq!(
            diags.to_string(),
            "pods.yaml:4:5: unrecognized parameter 'foo' found while processing ClassSpec"
        );
    }
}
