//! # Error Types — Specification Compiler Error Taxonomy
//!
//! Every problem the compiler can find in a specification is a [`SpecError`].
//! Problems found while reading a document are wrapped in a
//! [`Diagnostic`](crate::Diagnostic) that adds a source location and a level.
//!
//! ## Design
//!
//! - Document-shape problems (`Structural`, `UnknownParameter`,
//!   `TypeCoercion`, `AmbiguousNotation`) are recoverable: lenient mode
//!   records them and skips the offending entry.
//! - Modeling contradictions (`Orientation`) and failures after a node has
//!   been chosen for construction (`Construction`) are fatal.
//! - `Configuration` and `Encode` signal defects in the parameter tables or
//!   in an in-memory model, never in user input.
//! - `Unresolved` is only ever reported at warning level.

use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// Top-level error type for the specification compiler.
#[derive(Error, Debug)]
pub enum ZplError {
    /// A located problem in a specification document or model.
    #[error(transparent)]
    Diagnostic(#[from] Diagnostic),

    /// IO error reading or writing a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single problem with a specification document or model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecError {
    /// The document has the wrong shape at this point.
    #[error("expected {expected}, but found {found}")]
    Structural {
        /// What the schema requires here.
        expected: &'static str,
        /// What the document contains instead.
        found: String,
    },

    /// A document key does not match any declared parameter.
    #[error("unrecognized parameter '{param}' found while processing {spec_type}")]
    UnknownParameter {
        /// Name of the specification type being decoded.
        spec_type: &'static str,
        /// The external (document) name that was not recognized.
        param: String,
    },

    /// A value cannot be coerced to the parameter's declared kind.
    #[error("{spec_type}.{param}: cannot use {value} as {expected}")]
    TypeCoercion {
        /// Name of the specification type being decoded.
        spec_type: &'static str,
        /// Parameter whose value was rejected.
        param: String,
        /// Human-readable description of the accepted values.
        expected: String,
        /// The rejected value, rendered for display.
        value: String,
    },

    /// Two relationship endpoint kinds do not form a permitted pair.
    #[error("in {left} - {right}, invalid orientation: left and right may be reversed")]
    Orientation {
        /// Left endpoint, rendered as `Class(relname) Kind`.
        left: String,
        /// Right endpoint, rendered as `Kind (relname)Class`.
        right: String,
    },

    /// A relationship notation line does not match the grammar.
    #[error("relationship notation '{text}' is not valid: {reason}")]
    AmbiguousNotation {
        /// The offending line.
        text: String,
        /// Which part of the grammar failed.
        reason: String,
    },

    /// A node could not be built from otherwise well-formed parameters.
    #[error("cannot construct {spec_type}: {reason}")]
    Construction {
        /// Name of the specification type being constructed.
        spec_type: &'static str,
        /// Reason construction failed.
        reason: String,
    },

    /// A parameter table is inconsistent.
    #[error("invalid parameter table for {spec_type}: {reason}")]
    Configuration {
        /// Name of the specification type whose table failed validation.
        spec_type: &'static str,
        /// The violated table invariant.
        reason: String,
    },

    /// A node could not be serialized.
    #[error("unable to serialize {spec_type} object: parameter {param} {reason}")]
    Encode {
        /// Name of the specification type being encoded.
        spec_type: &'static str,
        /// Parameter that failed.
        param: String,
        /// Reason the parameter could not be encoded.
        reason: String,
    },

    /// A reference to a class or relationship that the model does not
    /// define. Reported as a warning; never aborts compilation.
    #[error("{spec_type} '{name}': {reason}")]
    Unresolved {
        /// Name of the specification type holding the reference.
        spec_type: &'static str,
        /// Name of the node holding the reference.
        name: String,
        /// What could not be resolved.
        reason: String,
    },

    /// The document is not syntactically valid YAML.
    #[error("{0}")]
    Syntax(String),
}

impl SpecError {
    /// Returns true if lenient mode may record this error and skip the
    /// offending entry instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Structural { .. }
            | Self::UnknownParameter { .. }
            | Self::TypeCoercion { .. }
            | Self::AmbiguousNotation { .. }
            | Self::Unresolved { .. } => true,
            Self::Orientation { .. }
            | Self::Construction { .. }
            | Self::Configuration { .. }
            | Self::Encode { .. }
            | Self::Syntax(_) => false,
        }
    }

    /// Short stable identifier for this error class, used in machine-readable
    /// diagnostic output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Structural { .. } => "structural",
            Self::UnknownParameter { .. } => "unknown-parameter",
            Self::TypeCoercion { .. } => "type-coercion",
            Self::Orientation { .. } => "orientation",
            Self::AmbiguousNotation { .. } => "ambiguous-notation",
            Self::Construction { .. } => "construction",
            Self::Configuration { .. } => "configuration",
            Self::Encode { .. } => "encode",
            Self::Unresolved { .. } => "unresolved",
            Self::Syntax(_) => "syntax",
        }
    }

    /// Shorthand for a [`SpecError::Structural`] error.
    pub fn structural(expected: &'static str, found: impl Into<String>) -> Self {
        Self::Structural {
            expected,
            found: found.into(),
        }
    }

    /// Shorthand for a [`SpecError::Construction`] error.
    pub fn construction(spec_type: &'static str, reason: impl Into<String>) -> Self {
        Self::Construction {
            spec_type,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classes_match_lenient_policy() {
        assert!(SpecError::structural("a mapping", "a sequence").is_recoverable());
        assert!(SpecError::UnknownParameter {
            spec_type: "ClassSpec",
            param: "foo".into(),
        }
        .is_recoverable());
        assert!(!SpecError::Orientation {
            left: "A".into(),
            right: "B".into(),
        }
        .is_recoverable());
        assert!(!SpecError::construction("ZenPackSpec", "missing name").is_recoverable());
        assert!(!SpecError::Syntax("bad indent".into()).is_recoverable());
    }

    #[test]
    fn unknown_parameter_message_names_type_and_key() {
        let err = SpecError::UnknownParameter {
            spec_type: "ClassSpec",
            param: "foo".into(),
        };
        assert_eq!(
            err.to_string(),
            "unrecognized parameter 'foo' found while processing ClassSpec"
        );
        assert_eq!(err.code(), "unknown-parameter");
    }
}
