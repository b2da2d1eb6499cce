//! # Class Specifications
//!
//! A class of modeled object: its base classes, its properties, the display
//! settings of its relationships, and the labels and widths the UI uses.
//!
//! Most presentation values are derived when not given:
//!
//! | value                | fallback                                   |
//! |----------------------|--------------------------------------------|
//! | `meta_type`          | class name                                 |
//! | `label`              | `meta_type`                                |
//! | `plural_label`       | `label` pluralized                         |
//! | `short_label`        | `label`                                    |
//! | `plural_short_label` | `short_label` pluralized if a short label was given, else `plural_label` |
//! | `plural_label_width` | `label_width + 7`                          |
//! | `content_width`      | `label_width`                              |
//! | `monitoring_templates` | `label` without spaces                   |
//! | `dynamicview_group`  | `plural_short_label`                       |
//!
//! Queries that need the rest of the model (inherited properties, base
//! class lookup) live on [`ZenPackSpec`](crate::ZenPackSpec).

use serde_yaml::Mapping;
use zpl_core::{pluralize, Diagnostic, SpecError};

use crate::kind::SpecKind;
use crate::nodes::class_property::{banded_order, ClassPropertySpec};
use crate::nodes::class_relationship::ClassRelationshipSpec;
use crate::params::{ParamDef, ParamDefault, ValueKind};
use crate::spec::{
    build_specs, impl_spec_eq, specs_to_param, BuildContext, ParamReader, Spec, SpecMap,
};
use crate::value::{ClassRef, ParamMap};

/// Base class used when none is given.
pub const DEFAULT_BASE: &str = "zenpacklib.Component";

pub static PARAMS: &[ParamDef] = &[
    ParamDef::new("base", ValueKind::ClassRefList)
        .with_default(ParamDefault::ClassRefList(&[DEFAULT_BASE])),
    ParamDef::new("meta_type", ValueKind::Str),
    ParamDef::new("label", ValueKind::Str),
    ParamDef::new("plural_label", ValueKind::Str),
    ParamDef::new("short_label", ValueKind::Str),
    ParamDef::new("plural_short_label", ValueKind::Str),
    ParamDef::new("auto_expand_column", ValueKind::Str).with_default(ParamDefault::Str("name")),
    ParamDef::new("label_width", ValueKind::Int).with_default(ParamDefault::Int(80)),
    ParamDef::new("plural_label_width", ValueKind::Int),
    ParamDef::new("content_width", ValueKind::Int),
    ParamDef::new("icon", ValueKind::Str),
    ParamDef::new("order", ValueKind::Float),
    ParamDef::new("properties", ValueKind::Specs(SpecKind::ClassProperty)),
    ParamDef::new("relationships", ValueKind::Specs(SpecKind::ClassRelationship)),
    ParamDef::new("impacts", ValueKind::StrList),
    ParamDef::new("impacted_by", ValueKind::StrList),
    ParamDef::new("monitoring_templates", ValueKind::StrList),
    ParamDef::new("filter_display", ValueKind::Bool).with_default(ParamDefault::Bool(true)),
    ParamDef::new("dynamicview_views", ValueKind::StrList),
    ParamDef::new("dynamicview_group", ValueKind::Str),
    ParamDef::new("dynamicview_relations", ValueKind::Dict),
];

/// A class of modeled object.
#[derive(Debug, Clone)]
pub struct ClassSpec {
    zenpack: String,
    name: String,
    bases: Vec<ClassRef>,
    meta_type: Option<String>,
    label: Option<String>,
    plural_label: Option<String>,
    short_label: Option<String>,
    plural_short_label: Option<String>,
    auto_expand_column: String,
    label_width: i64,
    plural_label_width: Option<i64>,
    content_width: Option<i64>,
    icon: Option<String>,
    order: Option<f64>,
    properties: SpecMap<ClassPropertySpec>,
    relationships: SpecMap<ClassRelationshipSpec>,
    impacts: Vec<String>,
    impacted_by: Vec<String>,
    monitoring_templates: Vec<String>,
    filter_display: bool,
    dynamicview_views: Vec<String>,
    dynamicview_group: Option<String>,
    dynamicview_relations: Mapping,
}

impl_spec_eq!(ClassSpec);

impl ClassSpec {
    /// Name of the owning specification.
    pub fn zenpack(&self) -> &str {
        &self.zenpack
    }

    /// Base classes, local or external, in declared order.
    pub fn bases(&self) -> &[ClassRef] {
        &self.bases
    }

    pub fn meta_type(&self) -> &str {
        self.meta_type.as_deref().unwrap_or(&self.name)
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.meta_type())
    }

    pub fn plural_label(&self) -> String {
        self.plural_label
            .clone()
            .unwrap_or_else(|| pluralize(self.label()))
    }

    pub fn short_label(&self) -> &str {
        self.short_label.as_deref().unwrap_or_else(|| self.label())
    }

    pub fn plural_short_label(&self) -> String {
        if let Some(given) = &self.plural_short_label {
            return given.clone();
        }
        match &self.short_label {
            Some(short) => pluralize(short),
            None => self.plural_label(),
        }
    }

    /// Grid column that expands to fill the available width.
    pub fn auto_expand_column(&self) -> &str {
        &self.auto_expand_column
    }

    pub fn label_width(&self) -> i64 {
        self.label_width
    }

    pub fn plural_label_width(&self) -> i64 {
        self.plural_label_width.unwrap_or(self.label_width + 7)
    }

    pub fn content_width(&self) -> i64 {
        self.content_width.unwrap_or(self.label_width)
    }

    /// Icon file name; `{class}.png` unless given.
    pub fn icon(&self) -> String {
        self.icon
            .clone()
            .unwrap_or_else(|| format!("{}.png", self.name))
    }

    /// Sort order in the 5.0-6.0 band; 5.5 unless given.
    pub fn order(&self) -> f64 {
        banded_order(5.0, self.order)
    }

    /// Properties declared on this class, without inherited ones.
    pub fn properties(&self) -> &SpecMap<ClassPropertySpec> {
        &self.properties
    }

    /// Relationship display settings declared on this class.
    pub fn relationships(&self) -> &SpecMap<ClassRelationshipSpec> {
        &self.relationships
    }

    pub fn impacts(&self) -> &[String] {
        &self.impacts
    }

    pub fn impacted_by(&self) -> &[String] {
        &self.impacted_by
    }

    /// Monitoring templates bound to instances; the label with spaces
    /// removed unless given.
    pub fn monitoring_templates(&self) -> Vec<String> {
        if self.monitoring_templates.is_empty() {
            vec![self.label().replace(' ', "")]
        } else {
            self.monitoring_templates.clone()
        }
    }

    pub fn filter_display(&self) -> bool {
        self.filter_display
    }

    /// Dynamic views the class appears in; `service_view` unless given.
    pub fn dynamicview_views(&self) -> Vec<String> {
        if self.dynamicview_views.is_empty() {
            vec!["service_view".to_string()]
        } else {
            self.dynamicview_views.clone()
        }
    }

    pub fn dynamicview_group(&self) -> String {
        self.dynamicview_group
            .clone()
            .unwrap_or_else(|| self.plural_short_label())
    }

    /// Extra dynamic view relations, tag to relationship or method names.
    pub fn dynamicview_relations(&self) -> &Mapping {
        &self.dynamicview_relations
    }
}

struct Scalars {
    bases: Vec<ClassRef>,
    meta_type: Option<String>,
    label: Option<String>,
    plural_label: Option<String>,
    short_label: Option<String>,
    plural_short_label: Option<String>,
    auto_expand_column: String,
    label_width: i64,
    plural_label_width: Option<i64>,
    content_width: Option<i64>,
    icon: Option<String>,
    order: Option<f64>,
    impacts: Vec<String>,
    impacted_by: Vec<String>,
    monitoring_templates: Vec<String>,
    filter_display: bool,
    dynamicview_views: Vec<String>,
    dynamicview_group: Option<String>,
    dynamicview_relations: Mapping,
}

impl Scalars {
    fn read(r: &mut ParamReader) -> Result<Self, SpecError> {
        Ok(Self {
            bases: r.class_refs("base")?,
            meta_type: r.opt_string("meta_type")?,
            label: r.opt_string("label")?,
            plural_label: r.opt_string("plural_label")?,
            short_label: r.opt_string("short_label")?,
            plural_short_label: r.opt_string("plural_short_label")?,
            auto_expand_column: r.string("auto_expand_column")?,
            label_width: r.opt_int("label_width")?.unwrap_or(80),
            plural_label_width: r.opt_int("plural_label_width")?,
            content_width: r.opt_int("content_width")?,
            icon: r.opt_string("icon")?,
            order: r.opt_float("order")?,
            impacts: r.str_list("impacts")?,
            impacted_by: r.str_list("impacted_by")?,
            monitoring_templates: r.str_list("monitoring_templates")?,
            filter_display: r.bool("filter_display")?,
            dynamicview_views: r.str_list("dynamicview_views")?,
            dynamicview_group: r.opt_string("dynamicview_group")?,
            dynamicview_relations: r.dict("dynamicview_relations")?,
        })
    }
}

impl Spec for ClassSpec {
    const KIND: SpecKind = SpecKind::Class;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("base", self.bases.clone().into());
        params.insert("meta_type", self.meta_type.clone().into());
        params.insert("label", self.label.clone().into());
        params.insert("plural_label", self.plural_label.clone().into());
        params.insert("short_label", self.short_label.clone().into());
        params.insert("plural_short_label", self.plural_short_label.clone().into());
        params.insert("auto_expand_column", self.auto_expand_column.clone().into());
        params.insert("label_width", self.label_width.into());
        params.insert("plural_label_width", self.plural_label_width.into());
        params.insert("content_width", self.content_width.into());
        params.insert("icon", self.icon.clone().into());
        params.insert("order", self.order.into());
        params.insert("properties", specs_to_param(&self.properties));
        params.insert("relationships", specs_to_param(&self.relationships));
        params.insert("impacts", self.impacts.clone().into());
        params.insert("impacted_by", self.impacted_by.clone().into());
        params.insert("monitoring_templates", self.monitoring_templates.clone().into());
        params.insert("filter_display", self.filter_display.into());
        params.insert("dynamicview_views", self.dynamicview_views.clone().into());
        params.insert("dynamicview_group", self.dynamicview_group.clone().into());
        params.insert(
            "dynamicview_relations",
            self.dynamicview_relations.clone().into(),
        );
        params
    }

    fn from_params(
        ctx: &mut BuildContext<'_>,
        parent: &str,
        name: &str,
        params: ParamMap,
    ) -> Result<Self, Diagnostic> {
        let mut reader = ParamReader::new(Self::KIND, params).map_err(|e| ctx.error(e))?;
        let scalars = Scalars::read(&mut reader).map_err(|e| ctx.error(e))?;
        let properties = reader
            .specs("properties", SpecKind::ClassProperty)
            .map_err(|e| ctx.error(e))?;
        let relationships = reader
            .specs("relationships", SpecKind::ClassRelationship)
            .map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;

        let properties = build_specs(ctx, name, "properties", properties)?;
        let relationships = build_specs(ctx, name, "relationships", relationships)?;
        tracing::debug!(
            class = name,
            properties = properties.len(),
            relationships = relationships.len(),
            "built class"
        );

        let Scalars {
            bases,
            meta_type,
            label,
            plural_label,
            short_label,
            plural_short_label,
            auto_expand_column,
            label_width,
            plural_label_width,
            content_width,
            icon,
            order,
            impacts,
            impacted_by,
            monitoring_templates,
            filter_display,
            dynamicview_views,
            dynamicview_group,
            dynamicview_relations,
        } = scalars;

        Ok(Self {
            zenpack: parent.to_string(),
            name: name.to_string(),
            bases,
            meta_type,
            label,
            plural_label,
            short_label,
            plural_short_label,
            auto_expand_column,
            label_width,
            plural_label_width,
            content_width,
            icon,
            order,
            properties,
            relationships,
            impacts,
            impacted_by,
            monitoring_templates,
            filter_display,
            dynamicview_views,
            dynamicview_group,
            dynamicview_relations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DEFAULTS_KEY;
    use crate::value::{ParamValue, SpecParams};
    use zpl_core::{Diagnostics, Mode};

    fn build(fields: &[(&'static str, ParamValue)]) -> ClassSpec {
        let mut diags = Diagnostics::new(Mode::Strict);
        let mut ctx = BuildContext::new(&mut diags, "c.yaml");
        ClassSpec::from_params(
            &mut ctx,
            "ZenPacks.test.Pods",
            "FabricPod",
            fields.iter().cloned().collect(),
        )
        .unwrap()
    }

    #[test]
    fn derived_labels() {
        let class = build(&[]);
        assert_eq!(class.meta_type(), "FabricPod");
        assert_eq!(class.label(), "FabricPod");
        assert_eq!(class.plural_label(), "FabricPods");
        assert_eq!(class.short_label(), "FabricPod");
        assert_eq!(class.plural_short_label(), "FabricPods");
        assert_eq!(class.plural_label_width(), 87);
        assert_eq!(class.content_width(), 80);
        assert_eq!(class.order(), 5.5);
        assert_eq!(class.icon(), "FabricPod.png");
        assert_eq!(class.bases(), [ClassRef::External(DEFAULT_BASE.into())]);
    }

    #[test]
    fn short_label_drives_plural_short_label() {
        let class = build(&[("label", "Fabric Pod".into()), ("short_label", "Pod".into())]);
        assert_eq!(class.plural_label(), "Fabric Pods");
        assert_eq!(class.plural_short_label(), "Pods");
        assert_eq!(class.dynamicview_group(), "Pods");
        assert_eq!(class.monitoring_templates(), ["FabricPod"]);
        assert_eq!(class.dynamicview_views(), ["service_view"]);
    }

    #[test]
    fn given_values_win() {
        let class = build(&[
            ("monitoring_templates", vec!["PodStats".to_string()].into()),
            ("order", ParamValue::Float(10.0)),
            ("plural_label_width", ParamValue::Int(100)),
        ]);
        assert_eq!(class.monitoring_templates(), ["PodStats"]);
        assert!((class.order() - 5.1).abs() < 1e-9);
        assert_eq!(class.plural_label_width(), 100);
    }

    #[test]
    fn property_defaults_overlay() {
        let mut props = SpecParams::new();
        let mut defaults = ParamMap::new();
        defaults.insert("display", false.into());
        props.insert(DEFAULTS_KEY.to_string(), defaults);
        props.insert("status".to_string(), ParamMap::new());
        let mut name = ParamMap::new();
        name.insert("display", true.into());
        props.insert("name".to_string(), name);

        let class = build(&[("properties", ParamValue::Specs(SpecKind::ClassProperty, props))]);
        assert!(!class.properties()["status"].display());
        assert!(class.properties()["name"].display());
        assert_eq!(class.properties()["status"].class_name(), "FabricPod");
    }
}
