//! # Parameter Values
//!
//! [`ParamValue`] is the owned, recursive value of one specification
//! parameter. A [`ParamMap`] holds the parameters of one node keyed by their
//! internal names; it is what the codec produces on decode, what node
//! constructors consume, and what `Spec::to_params` gives back.
//!
//! Nested collections are carried as [`SpecParams`] (child name to child
//! parameters), so a whole specification tree can be held as plain data
//! before any node is constructed.

use std::fmt;

use indexmap::IndexMap;
use serde_yaml::Mapping;
use zpl_core::{is_qualified, qualify, Severity};

use crate::kind::SpecKind;
use crate::relationship::RelationshipDecl;

/// Parameters of one node, keyed by internal parameter name, in declared
/// order.
pub type ParamMap = IndexMap<&'static str, ParamValue>;

/// Parameters of a named collection of child nodes.
pub type SpecParams = IndexMap<String, ParamMap>;

/// A reference to a class, either defined in the same specification or
/// provided by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassRef {
    /// A class defined in this specification, by its unqualified name.
    Local(String),
    /// An external class, by its fully-qualified name
    /// (`zenpacklib.Component`, `Products.ZenModel.Device.Device`).
    External(String),
}

impl ClassRef {
    /// Classify a class token as written in a document.
    pub fn parse(token: &str) -> Self {
        if is_qualified(token) {
            Self::External(token.to_string())
        } else {
            Self::Local(token.to_string())
        }
    }

    /// The token as written.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local(name) | Self::External(name) => name,
        }
    }

    /// Returns true for a class defined in this specification.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// The fully-qualified name, qualifying local names against `namespace`.
    pub fn qualified(&self, namespace: &str) -> String {
        match self {
            Self::Local(name) => qualify(namespace, name),
            Self::External(name) => name.clone(),
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ClassRef {
    fn from(token: &str) -> Self {
        Self::parse(token)
    }
}

/// The value of one specification parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Unset.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    StrList(Vec<String>),
    ClassRef(ClassRef),
    ClassRefList(Vec<ClassRef>),
    Relationship(RelationshipDecl),
    RelationshipList(Vec<RelationshipDecl>),
    Severity(Severity),
    /// Free-form mapping, passed through unchanged.
    Dict(Mapping),
    /// Named child nodes of one kind.
    Specs(SpecKind, SpecParams),
    /// Groups of named child nodes of one kind.
    SpecsDict(SpecKind, IndexMap<String, SpecParams>),
}

impl ParamValue {
    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::StrList(_) => "list of strings",
            Self::ClassRef(_) => "class",
            Self::ClassRefList(_) => "list of classes",
            Self::Relationship(_) => "relationship schema",
            Self::RelationshipList(_) => "list of relationship schemas",
            Self::Severity(_) => "severity",
            Self::Dict(_) => "dict",
            Self::Specs(..) => "specs",
            Self::SpecsDict(..) => "dict of specs",
        }
    }

    /// Returns true for [`ParamValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the child parameters, if this is a collection of specs.
    pub fn as_specs(&self) -> Option<&SpecParams> {
        match self {
            Self::Specs(_, specs) => Some(specs),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::StrList(value)
    }
}

impl From<Vec<ClassRef>> for ParamValue {
    fn from(value: Vec<ClassRef>) -> Self {
        Self::ClassRefList(value)
    }
}

impl From<Severity> for ParamValue {
    fn from(value: Severity) -> Self {
        Self::Severity(value)
    }
}

impl From<Mapping> for ParamValue {
    fn from(value: Mapping) -> Self {
        Self::Dict(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
