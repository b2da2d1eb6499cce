//! # zpl-core — Foundational Types for the Specification Compiler
//!
//! Leaf crate of the workspace. Defines the vocabulary every other crate
//! shares: the error taxonomy, the diagnostics channel with its strict and
//! lenient modes, the closed enumerations that appear in specification
//! documents (event severity, relationship kind), the naming rules used to
//! derive relationship names from class names, and a YAML source index that
//! maps document paths back to `line:column` positions.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zpl-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod diagnostic;
pub mod error;
pub mod naming;
pub mod relation;
pub mod severity;
pub mod source;

// Re-export primary types for ergonomic imports.
pub use diagnostic::{Diagnostic, Diagnostics, Level, Location, Mode};
pub use error::{SpecError, ZplError};
pub use naming::{is_qualified, pluralize, qualify, relname_from_classname, ucfirst};
pub use relation::RelationKind;
pub use severity::{InvalidSeverity, Severity};
pub use source::SourceIndex;
