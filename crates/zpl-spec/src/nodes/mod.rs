//! # Specification Node Types
//!
//! One struct per [`SpecKind`], each holding what the author wrote plus
//! accessors for derived values. [`SpecNode`] is the closed sum over all of
//! them, for code that handles nodes without knowing their kind up front.

pub mod class;
pub mod class_property;
pub mod class_relationship;
pub mod device_class;
pub mod graph;
pub mod rrd;
pub mod zproperty;

pub use class::ClassSpec;
pub use class_property::ClassPropertySpec;
pub use class_relationship::ClassRelationshipSpec;
pub use device_class::DeviceClassSpec;
pub use graph::{GraphDefinitionSpec, GraphPointSpec};
pub use rrd::{RrdDatapointSpec, RrdDatasourceSpec, RrdTemplateSpec, RrdThresholdSpec};
pub use zproperty::ZPropertySpec;

use zpl_core::Diagnostic;

use crate::kind::SpecKind;
use crate::spec::{BuildContext, Spec};
use crate::value::ParamMap;
use crate::zenpack::ZenPackSpec;

/// Any specification node.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecNode {
    ZenPack(ZenPackSpec),
    ZProperty(ZPropertySpec),
    DeviceClass(DeviceClassSpec),
    Class(ClassSpec),
    ClassProperty(ClassPropertySpec),
    ClassRelationship(ClassRelationshipSpec),
    RrdTemplate(RrdTemplateSpec),
    RrdThreshold(RrdThresholdSpec),
    RrdDatasource(RrdDatasourceSpec),
    RrdDatapoint(RrdDatapointSpec),
    GraphDefinition(GraphDefinitionSpec),
    GraphPoint(GraphPointSpec),
}

macro_rules! dispatch {
    ($node:expr, $inner:ident => $body:expr) => {
        match $node {
            SpecNode::ZenPack($inner) => $body,
            SpecNode::ZProperty($inner) => $body,
            SpecNode::DeviceClass($inner) => $body,
            SpecNode::Class($inner) => $body,
            SpecNode::ClassProperty($inner) => $body,
            SpecNode::ClassRelationship($inner) => $body,
            SpecNode::RrdTemplate($inner) => $body,
            SpecNode::RrdThreshold($inner) => $body,
            SpecNode::RrdDatasource($inner) => $body,
            SpecNode::RrdDatapoint($inner) => $body,
            SpecNode::GraphDefinition($inner) => $body,
            SpecNode::GraphPoint($inner) => $body,
        }
    };
}

impl SpecNode {
    /// The node's kind.
    pub fn kind(&self) -> SpecKind {
        match self {
            Self::ZenPack(_) => SpecKind::ZenPack,
            Self::ZProperty(_) => SpecKind::ZProperty,
            Self::DeviceClass(_) => SpecKind::DeviceClass,
            Self::Class(_) => SpecKind::Class,
            Self::ClassProperty(_) => SpecKind::ClassProperty,
            Self::ClassRelationship(_) => SpecKind::ClassRelationship,
            Self::RrdTemplate(_) => SpecKind::RrdTemplate,
            Self::RrdThreshold(_) => SpecKind::RrdThreshold,
            Self::RrdDatasource(_) => SpecKind::RrdDatasource,
            Self::RrdDatapoint(_) => SpecKind::RrdDatapoint,
            Self::GraphDefinition(_) => SpecKind::GraphDefinition,
            Self::GraphPoint(_) => SpecKind::GraphPoint,
        }
    }

    /// The node's name within its parent collection.
    pub fn name(&self) -> &str {
        dispatch!(self, n => n.name())
    }

    /// The node's parameters.
    pub fn to_params(&self) -> ParamMap {
        dispatch!(self, n => n.to_params())
    }

    /// Build a node of `kind` from its parameters.
    ///
    /// # Errors
    ///
    /// As for [`Spec::from_params`].
    pub fn from_params(
        kind: SpecKind,
        ctx: &mut BuildContext<'_>,
        parent: &str,
        name: &str,
        params: ParamMap,
    ) -> Result<Self, Diagnostic> {
        Ok(match kind {
            SpecKind::ZenPack => Self::ZenPack(ZenPackSpec::from_params(ctx, parent, name, params)?),
            SpecKind::ZProperty => {
                Self::ZProperty(ZPropertySpec::from_params(ctx, parent, name, params)?)
            }
            SpecKind::DeviceClass => {
                Self::DeviceClass(DeviceClassSpec::from_params(ctx, parent, name, params)?)
            }
            SpecKind::Class => Self::Class(ClassSpec::from_params(ctx, parent, name, params)?),
            SpecKind::ClassProperty => {
                Self::ClassProperty(ClassPropertySpec::from_params(ctx, parent, name, params)?)
            }
            SpecKind::ClassRelationship => Self::ClassRelationship(
                ClassRelationshipSpec::from_params(ctx, parent, name, params)?,
            ),
            SpecKind::RrdTemplate => {
                Self::RrdTemplate(RrdTemplateSpec::from_params(ctx, parent, name, params)?)
            }
            SpecKind::RrdThreshold => {
                Self::RrdThreshold(RrdThresholdSpec::from_params(ctx, parent, name, params)?)
            }
            SpecKind::RrdDatasource => {
                Self::RrdDatasource(RrdDatasourceSpec::from_params(ctx, parent, name, params)?)
            }
            SpecKind::RrdDatapoint => {
                Self::RrdDatapoint(RrdDatapointSpec::from_params(ctx, parent, name, params)?)
            }
            SpecKind::GraphDefinition => Self::GraphDefinition(
                GraphDefinitionSpec::from_params(ctx, parent, name, params)?,
            ),
            SpecKind::GraphPoint => {
                Self::GraphPoint(GraphPointSpec::from_params(ctx, parent, name, params)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::param_table;
    use zpl_core::{Diagnostics, Mode};

    /// Every table parameter is a field of the node and every field is in
    /// the table, in table order.
    #[test]
    fn tables_match_node_fields() {
        for &kind in SpecKind::all() {
            let mut diags = Diagnostics::new(Mode::Strict);
            let mut ctx = BuildContext::new(&mut diags, "fields.yaml");
            let mut params = ParamMap::new();
            if kind == SpecKind::ZenPack {
                params.insert("name", "ZenPacks.test.Fields".into());
            }
            let node = SpecNode::from_params(kind, &mut ctx, "parent", "node", params).unwrap();
            assert_eq!(node.kind(), kind);
            let table = param_table(kind).unwrap();
            let fields: Vec<_> = node.to_params().keys().copied().collect();
            let declared: Vec<_> = table.defs().iter().map(|d| d.name).collect();
            assert_eq!(fields, declared, "{kind}");
        }
    }

    #[test]
    fn nodes_rebuild_from_their_own_params() {
        for &kind in SpecKind::all() {
            let mut diags = Diagnostics::new(Mode::Strict);
            let mut ctx = BuildContext::new(&mut diags, "fields.yaml");
            let mut params = ParamMap::new();
            if kind == SpecKind::ZenPack {
                params.insert("name", "ZenPacks.test.Fields".into());
            }
            let node = SpecNode::from_params(kind, &mut ctx, "parent", "node", params).unwrap();
            let again =
                SpecNode::from_params(kind, &mut ctx, "parent", "node", node.to_params()).unwrap();
            assert_eq!(node, again, "{kind}");
        }
    }

    #[test]
    fn nodes_of_different_kinds_differ() {
        let mut diags = Diagnostics::new(Mode::Strict);
        let mut ctx = BuildContext::new(&mut diags, "x.yaml");
        let a = SpecNode::from_params(SpecKind::RrdDatapoint, &mut ctx, "p", "n", ParamMap::new())
            .unwrap();
        let b = SpecNode::from_params(SpecKind::ClassRelationship, &mut ctx, "p", "n", ParamMap::new())
            .unwrap();
        assert_ne!(a, b);
    }
}
