//! # zpl-spec — Specification Object Model
//!
//! The typed tree a zenpack specification document compiles into, and the
//! rules for building it from plain parameters:
//!
//! - **Parameter tables** (`params.rs`): one static table per node kind
//!   declaring each parameter's internal and external name, value kind and
//!   default. Encoding, decoding and node construction are all driven by
//!   these tables.
//!
//! - **DEFAULTS overlay** (`defaults.rs`): the reserved `DEFAULTS` entry of
//!   any named collection is merged under every sibling entry.
//!
//! - **Relationships** (`relationship.rs`, `notation.rs`): declared and
//!   resolved two-sided relationships, the compact `A 1:MC B` notation and
//!   the yUML block notation.
//!
//! - **Nodes** (`nodes/`): one struct per node kind, holding authored values
//!   and computing derived ones on access.
//!
//! - **Specification** (`zenpack.rs`, `table.rs`): the two-pass build of the
//!   root node. Relationship cross-links live in a side table rather than on
//!   the class nodes.
//!
//! ## Crate Policy
//!
//! - Depends only on `zpl-core` internally.
//! - Nodes are immutable once built. Nothing here reads or writes YAML text;
//!   that is `zpl-codec`.
//! - Every error carries the document location it was found at.

pub mod defaults;
pub mod kind;
pub mod nodes;
pub mod notation;
pub mod params;
pub mod relationship;
pub mod spec;
pub mod table;
pub mod value;
pub mod zenpack;

pub use defaults::{apply_defaults, document_defaults, Overlay, DEFAULTS_KEY};
pub use kind::SpecKind;
pub use nodes::{
    ClassPropertySpec, ClassRelationshipSpec, ClassSpec, DeviceClassSpec, GraphDefinitionSpec,
    GraphPointSpec, RrdDatapointSpec, RrdDatasourceSpec, RrdTemplateSpec, RrdThresholdSpec,
    SpecNode, ZPropertySpec,
};
pub use notation::{parse_relationship, parse_schema_notation, parse_yuml, parse_yuml_line};
pub use params::{param_table, ParamDef, ParamDefault, ParamTable, ValueKind};
pub use relationship::{RelationshipDecl, RelationshipEndpoint, RelationshipSchema, RelationshipView};
pub use spec::{BuildContext, ParamReader, Spec, SpecMap};
pub use table::RelationshipTable;
pub use value::{ClassRef, ParamMap, ParamValue, SpecParams};
pub use zenpack::ZenPackSpec;
