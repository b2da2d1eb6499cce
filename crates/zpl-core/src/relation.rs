//! # Relationship Kinds
//!
//! The cardinality of one side of a relationship, as seen from the class
//! that owns that side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cardinality of one relationship endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Points at exactly one remote object (host type `ToOne`).
    Single,
    /// Points at many remote objects (host type `ToMany`).
    Multi,
    /// Contains many remote objects; their lifetime is bound to the owner
    /// (host type `ToManyCont`).
    MultiOwning,
}

impl RelationKind {
    /// All kinds in canonical order.
    pub fn all() -> &'static [RelationKind] {
        &[Self::Single, Self::Multi, Self::MultiOwning]
    }

    /// Returns the snake_case identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
            Self::MultiOwning => "multi_owning",
        }
    }

    /// Returns the name of the host relationship type for this kind.
    pub fn host_type(&self) -> &'static str {
        match self {
            Self::Single => "ToOne",
            Self::Multi => "ToMany",
            Self::MultiOwning => "ToManyCont",
        }
    }

    /// Returns the token this kind contributes to a cardinality string.
    pub fn cardinality_token(&self) -> &'static str {
        match self {
            Self::Single => "1",
            Self::Multi => "M",
            Self::MultiOwning => "MC",
        }
    }

    /// Returns true for [`RelationKind::Single`].
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_type())
    }
}

impl FromStr for RelationKind {
    type Err = String;

    /// Accepts both the snake_case identifiers and the host type names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" | "ToOne" => Ok(Self::Single),
            "multi" | "ToMany" => Ok(Self::Multi),
            "multi_owning" | "ToManyCont" => Ok(Self::MultiOwning),
            other => Err(format!("unrecognized relationship type '{other}'")),
        }
    }
}
