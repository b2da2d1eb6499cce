//! # Specification Kinds
//!
//! The closed set of specification node types. Every parameter table, every
//! codec dispatch and every node constructor is keyed by a [`SpecKind`];
//! there is no way to register a new kind at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A specification node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecKind {
    /// Top-level zenpack specification.
    ZenPack,
    /// A configuration property declared by the zenpack.
    ZProperty,
    /// A device class created or configured by the zenpack.
    DeviceClass,
    /// A model class.
    Class,
    /// A property of a model class.
    ClassProperty,
    /// Display options for one relationship of a model class.
    ClassRelationship,
    /// A monitoring template.
    RrdTemplate,
    /// A threshold within a monitoring template.
    RrdThreshold,
    /// A datasource within a monitoring template.
    RrdDatasource,
    /// A datapoint within a datasource.
    RrdDatapoint,
    /// A graph within a monitoring template.
    GraphDefinition,
    /// A point within a graph.
    GraphPoint,
}

impl SpecKind {
    /// Number of specification kinds.
    pub const COUNT: usize = 12;

    /// Returns all kinds in declaration order.
    pub fn all() -> &'static [SpecKind] {
        &[
            Self::ZenPack,
            Self::ZProperty,
            Self::DeviceClass,
            Self::Class,
            Self::ClassProperty,
            Self::ClassRelationship,
            Self::RrdTemplate,
            Self::RrdThreshold,
            Self::RrdDatasource,
            Self::RrdDatapoint,
            Self::GraphDefinition,
            Self::GraphPoint,
        ]
    }

    /// Returns the type name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZenPack => "ZenPackSpec",
            Self::ZProperty => "ZPropertySpec",
            Self::DeviceClass => "DeviceClassSpec",
            Self::Class => "ClassSpec",
            Self::ClassProperty => "ClassPropertySpec",
            Self::ClassRelationship => "ClassRelationshipSpec",
            Self::RrdTemplate => "RRDTemplateSpec",
            Self::RrdThreshold => "RRDThresholdSpec",
            Self::RrdDatasource => "RRDDatasourceSpec",
            Self::RrdDatapoint => "RRDDatapointSpec",
            Self::GraphDefinition => "GraphDefinitionSpec",
            Self::GraphPoint => "GraphPointSpec",
        }
    }

    /// Position of this kind in [`SpecKind::all`].
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    /// Returns true if a document may give a child of this kind as a single
    /// scalar instead of a mapping.
    pub fn has_scalar_shorthand(&self) -> bool {
        matches!(self, Self::RrdDatapoint)
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown specification type '{s}'"))
    }
}
