//! # Parameter Metadata
//!
//! Every specification kind declares its parameters in a static table of
//! [`ParamDef`] entries: the internal name, the external (document) name,
//! the [`ValueKind`], the default and a block-style hint. The codec is
//! driven entirely by these tables; no node type carries hand-written
//! (de)serialization code.
//!
//! ## Registration
//!
//! Tables are validated on first access through [`param_table`] and cached
//! for the life of the process in a [`OnceLock`]. Validation is pure, so a
//! race on first access computes the same result twice and keeps one. A
//! table that fails validation yields [`SpecError::Configuration`] on every
//! access, before any document is decoded.
//!
//! ## Null defaults
//!
//! A parameter declared with [`ParamDefault::None`] whose kind is a list,
//! dict or nested collection defaults to the empty value of that kind, not
//! to null.

use std::collections::HashMap;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde_yaml::Mapping;
use zpl_core::SpecError;

use crate::kind::SpecKind;
use crate::nodes;
use crate::value::{ClassRef, ParamValue};

/// The declared kind of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    StrList,
    /// One class token, local or qualified.
    ClassRef,
    /// A list of class tokens.
    ClassRefList,
    /// One relationship, as notation text in documents.
    RelationshipSchema,
    /// A list of relationships, as notation lines in documents.
    RelationshipSchemaList,
    /// Event severity, an integer or a name in documents.
    Severity,
    /// Free-form mapping.
    Dict,
    /// Named children of the given kind.
    Specs(SpecKind),
    /// Named groups of named children of the given kind.
    DictOfSpecs(SpecKind),
    /// Concrete kind chosen by the value of the sibling parameter `field`.
    TypedBy {
        /// Internal name of the sibling parameter.
        field: &'static str,
    },
}

impl ValueKind {
    /// Human-readable description used in type coercion errors.
    pub fn describe(&self) -> String {
        match self {
            Self::Bool => "a boolean".to_string(),
            Self::Int => "an integer".to_string(),
            Self::Float => "a number".to_string(),
            Self::Str => "a string".to_string(),
            Self::StrList => "a list of strings".to_string(),
            Self::ClassRef => "a class name".to_string(),
            Self::ClassRefList => "a list of class names".to_string(),
            Self::RelationshipSchema => "a relationship notation string".to_string(),
            Self::RelationshipSchemaList => "a list of relationship notation strings".to_string(),
            Self::Severity => "a severity (0-5 or a severity name)".to_string(),
            Self::Dict => "a mapping".to_string(),
            Self::Specs(kind) => format!("a mapping of {kind} entries"),
            Self::DictOfSpecs(kind) => format!("a mapping of mappings of {kind} entries"),
            Self::TypedBy { field } => format!("a value whose type is given by '{field}'"),
        }
    }

    /// Returns true for list, dict and nested collection kinds.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::StrList
                | Self::ClassRefList
                | Self::RelationshipSchemaList
                | Self::Dict
                | Self::Specs(_)
                | Self::DictOfSpecs(_)
        )
    }

    /// The empty value for collection kinds, `Null` for everything else.
    pub fn null_default(&self) -> ParamValue {
        match self {
            Self::StrList => ParamValue::StrList(Vec::new()),
            Self::ClassRefList => ParamValue::ClassRefList(Vec::new()),
            Self::RelationshipSchemaList => ParamValue::RelationshipList(Vec::new()),
            Self::Dict => ParamValue::Dict(Mapping::new()),
            Self::Specs(kind) => ParamValue::Specs(*kind, IndexMap::new()),
            Self::DictOfSpecs(kind) => ParamValue::SpecsDict(*kind, IndexMap::new()),
            Self::Bool
            | Self::Int
            | Self::Float
            | Self::Str
            | Self::ClassRef
            | Self::RelationshipSchema
            | Self::Severity
            | Self::TypedBy { .. } => ParamValue::Null,
        }
    }
}

/// The static default of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    /// The parameter must be given.
    Required,
    /// No default; see the module docs for collection kinds.
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
    StrList(&'static [&'static str]),
    ClassRefList(&'static [&'static str]),
}

/// Metadata for one parameter of a specification kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDef {
    /// Internal parameter name.
    pub name: &'static str,
    /// Name used in documents.
    pub external_name: &'static str,
    /// Declared value kind.
    pub kind: ValueKind,
    /// Static default.
    pub default: ParamDefault,
    /// Emit this parameter in block style when the writer supports it.
    pub block_style: bool,
}

impl ParamDef {
    /// A parameter with no default whose external name is its own name.
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            external_name: name,
            kind,
            default: ParamDefault::None,
            block_style: false,
        }
    }

    /// Use a different name in documents.
    pub const fn renamed(mut self, external_name: &'static str) -> Self {
        self.external_name = external_name;
        self
    }

    /// Set the static default.
    pub const fn with_default(mut self, default: ParamDefault) -> Self {
        self.default = default;
        self
    }

    /// Mark the parameter as required.
    pub const fn required(mut self) -> Self {
        self.default = ParamDefault::Required;
        self
    }

    /// Mark the parameter for block-style output.
    pub const fn block_style(mut self) -> Self {
        self.block_style = true;
        self
    }

    /// Returns true if the parameter has no default.
    pub fn is_required(&self) -> bool {
        matches!(self.default, ParamDefault::Required)
    }

    /// The resolved static default, or `None` for a required parameter.
    pub fn default_value(&self) -> Option<ParamValue> {
        let value = match self.default {
            ParamDefault::Required => return None,
            ParamDefault::None => self.kind.null_default(),
            ParamDefault::Bool(b) => ParamValue::Bool(b),
            ParamDefault::Int(i) => match self.kind {
                ValueKind::Float => ParamValue::Float(i as f64),
                _ => ParamValue::Int(i),
            },
            ParamDefault::Float(f) => ParamValue::Float(f),
            ParamDefault::Str(s) => ParamValue::Str(s.to_string()),
            ParamDefault::StrList(items) => {
                ParamValue::StrList(items.iter().map(|s| s.to_string()).collect())
            }
            ParamDefault::ClassRefList(items) => {
                ParamValue::ClassRefList(items.iter().map(|s| ClassRef::parse(s)).collect())
            }
        };
        Some(value)
    }

    /// Returns true if the static default fits the declared kind.
    fn default_fits_kind(&self) -> bool {
        match (self.default, self.kind) {
            (ParamDefault::Required | ParamDefault::None, _) => true,
            (ParamDefault::Bool(_), ValueKind::Bool) => true,
            (ParamDefault::Int(_), ValueKind::Int | ValueKind::Float) => true,
            (ParamDefault::Float(_), ValueKind::Float) => true,
            (ParamDefault::Str(_), ValueKind::Str | ValueKind::TypedBy { .. }) => true,
            (ParamDefault::StrList(_), ValueKind::StrList) => true,
            (ParamDefault::ClassRefList(_), ValueKind::ClassRefList) => true,
            _ => false,
        }
    }
}

/// The validated parameter table of one specification kind.
#[derive(Debug)]
pub struct ParamTable {
    kind: SpecKind,
    defs: &'static [ParamDef],
    by_name: HashMap<&'static str, usize>,
    by_external: HashMap<&'static str, usize>,
}

impl ParamTable {
    /// Validate `defs` as the table for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Configuration`] when internal or external names
    /// collide, when a default does not fit its kind, or when a `TypedBy`
    /// parameter names a sibling that is missing or not a string.
    pub fn new(kind: SpecKind, defs: &'static [ParamDef]) -> Result<Self, SpecError> {
        let fail = |reason: String| SpecError::Configuration {
            spec_type: kind.as_str(),
            reason,
        };

        let mut by_name = HashMap::with_capacity(defs.len());
        let mut by_external = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if by_name.insert(def.name, i).is_some() {
                return Err(fail(format!("parameter '{}' is declared twice", def.name)));
            }
            if by_external.insert(def.external_name, i).is_some() {
                return Err(fail(format!(
                    "external name '{}' is used by more than one parameter",
                    def.external_name
                )));
            }
            if !def.default_fits_kind() {
                return Err(fail(format!(
                    "default {:?} of parameter '{}' is not {}",
                    def.default,
                    def.name,
                    def.kind.describe()
                )));
            }
        }

        for def in defs {
            if let ValueKind::TypedBy { field } = def.kind {
                match by_name.get(field).map(|&i| defs[i].kind) {
                    Some(ValueKind::Str) => {}
                    Some(other) => {
                        return Err(fail(format!(
                            "parameter '{}' is typed by '{field}', which is {} rather than a string",
                            def.name,
                            other.describe()
                        )))
                    }
                    None => {
                        return Err(fail(format!(
                            "parameter '{}' is typed by undeclared parameter '{field}'",
                            def.name
                        )))
                    }
                }
            }
        }

        Ok(Self {
            kind,
            defs,
            by_name,
            by_external,
        })
    }

    /// The kind this table describes.
    pub fn kind(&self) -> SpecKind {
        self.kind
    }

    /// All parameter definitions in declared order.
    pub fn defs(&self) -> &'static [ParamDef] {
        self.defs
    }

    /// Look up a parameter by internal name.
    pub fn get(&self, name: &str) -> Option<&'static ParamDef> {
        self.by_name.get(name).map(|&i| &self.defs[i])
    }

    /// Look up a parameter by external (document) name.
    pub fn by_external(&self, external_name: &str) -> Option<&'static ParamDef> {
        self.by_external.get(external_name).map(|&i| &self.defs[i])
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns true if the kind declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// The static definitions for `kind`, before validation.
fn definitions(kind: SpecKind) -> &'static [ParamDef] {
    match kind {
        SpecKind::ZenPack => crate::zenpack::PARAMS,
        SpecKind::ZProperty => nodes::zproperty::PARAMS,
        SpecKind::DeviceClass => nodes::device_class::PARAMS,
        SpecKind::Class => nodes::class::PARAMS,
        SpecKind::ClassProperty => nodes::class_property::PARAMS,
        SpecKind::ClassRelationship => nodes::class_relationship::PARAMS,
        SpecKind::RrdTemplate => nodes::rrd::TEMPLATE_PARAMS,
        SpecKind::RrdThreshold => nodes::rrd::THRESHOLD_PARAMS,
        SpecKind::RrdDatasource => nodes::rrd::DATASOURCE_PARAMS,
        SpecKind::RrdDatapoint => nodes::rrd::DATAPOINT_PARAMS,
        SpecKind::GraphDefinition => nodes::graph::DEFINITION_PARAMS,
        SpecKind::GraphPoint => nodes::graph::POINT_PARAMS,
    }
}

/// Returns the validated parameter table for `kind`.
///
/// # Errors
///
/// Returns [`SpecError::Configuration`] if the kind's static table is
/// inconsistent.
pub fn param_table(kind: SpecKind) -> Result<&'static ParamTable, SpecError> {
    static REGISTRY: OnceLock<Vec<Result<ParamTable, SpecError>>> = OnceLock::new();
    let registry = REGISTRY.get_or_init(|| {
        SpecKind::all()
            .iter()
            .map(|&k| ParamTable::new(k, definitions(k)))
            .collect()
    });
    match registry.get(kind.index()) {
        Some(Ok(table)) => Ok(table),
        Some(Err(e)) => Err(e.clone()),
        None => Err(SpecError::Configuration {
            spec_type: kind.as_str(),
            reason: "no parameter table is registered".to_string(),
        }),
    }
}

/// Resolve the concrete kind of a `TypedBy` parameter of `kind` from the
/// value of its sibling field.
pub fn resolve_typed_kind(kind: SpecKind, sibling: Option<&str>) -> ValueKind {
    match kind {
        SpecKind::ZProperty => nodes::zproperty::value_kind_for_type(sibling),
        _ => ValueKind::Str,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_table_is_valid() {
        for kind in SpecKind::all() {
            let table = param_table(*kind).unwrap();
            assert_eq!(table.kind(), *kind);
        }
    }

    #[test]
    fn external_names_map_back() {
        let table = param_table(SpecKind::ClassProperty).unwrap();
        let def = table.by_external("type").unwrap();
        assert_eq!(def.name, "type_");
        assert!(table.by_external("type_").is_none());
        assert!(table.get("type_").is_some());
    }

    #[test]
    fn only_zenpack_name_is_required() {
        for kind in SpecKind::all() {
            let table = param_table(*kind).unwrap();
            for def in table.defs() {
                assert_eq!(
                    def.is_required(),
                    *kind == SpecKind::ZenPack && def.name == "name",
                    "{kind}.{}",
                    def.name
                );
            }
        }
    }

    #[test]
    fn collection_kinds_default_to_empty() {
        let def = ParamDef::new("impacts", ValueKind::StrList);
        assert_eq!(def.default_value(), Some(ParamValue::StrList(Vec::new())));
        let def = ParamDef::new("properties", ValueKind::Specs(SpecKind::ClassProperty));
        assert_eq!(
            def.default_value(),
            Some(ParamValue::Specs(SpecKind::ClassProperty, IndexMap::new()))
        );
        let def = ParamDef::new("label", ValueKind::Str);
        assert_eq!(def.default_value(), Some(ParamValue::Null));
        assert_eq!(ParamDef::new("name", ValueKind::Str).required().default_value(), None);
    }

    #[test]
    fn int_default_on_float_param_is_float() {
        let def = ParamDef::new("order", ValueKind::Float).with_default(ParamDefault::Int(5));
        assert_eq!(def.default_value(), Some(ParamValue::Float(5.0)));
    }

    static DUPLICATE_EXTERNAL: &[ParamDef] = &[
        ParamDef::new("type_", ValueKind::Str).renamed("type"),
        ParamDef::new("type", ValueKind::Str),
    ];

    static BAD_DEFAULT: &[ParamDef] =
        &[ParamDef::new("display", ValueKind::Bool).with_default(ParamDefault::Str("yes"))];

    static DANGLING_TYPED_BY: &[ParamDef] =
        &[ParamDef::new("default", ValueKind::TypedBy { field: "type_" })];

    #[test]
    fn inconsistent_tables_are_configuration_errors() {
        for defs in [DUPLICATE_EXTERNAL, BAD_DEFAULT, DANGLING_TYPED_BY] {
            let err = ParamTable::new(SpecKind::ZProperty, defs).unwrap_err();
            assert_eq!(err.code(), "configuration", "{err}");
        }
    }
}
