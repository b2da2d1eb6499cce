//! Typed properties of a class.
//!
//! The node keeps what the author wrote. Accessors such as
//! [`ClassPropertySpec::label`] and [`ClassPropertySpec::order`] compute the
//! value the rest of the model uses.

use zpl_core::{Diagnostic, SpecError};

use crate::kind::SpecKind;
use crate::params::{ParamDef, ParamDefault, ValueKind};
use crate::spec::{impl_spec_eq, BuildContext, ParamReader, Spec};
use crate::value::ParamMap;

/// Renderer used for `entity` properties that do not name one.
pub const ENTITY_RENDERER: &str = "Zenoss.render.zenpacklib_entityLinkFromGrid";

const API_BACKENDTYPES: &[&str] = &["property", "method"];
const INDEX_SCOPES: &[&str] = &["device", "global", "both"];

pub static PARAMS: &[ParamDef] = &[
    ParamDef::new("type_", ValueKind::Str)
        .renamed("type")
        .with_default(ParamDefault::Str("string")),
    ParamDef::new("label", ValueKind::Str),
    ParamDef::new("short_label", ValueKind::Str),
    ParamDef::new("index_type", ValueKind::Str),
    ParamDef::new("label_width", ValueKind::Int).with_default(ParamDefault::Int(80)),
    ParamDef::new("default", ValueKind::Str),
    ParamDef::new("content_width", ValueKind::Int),
    ParamDef::new("display", ValueKind::Bool).with_default(ParamDefault::Bool(true)),
    ParamDef::new("details_display", ValueKind::Bool).with_default(ParamDefault::Bool(true)),
    ParamDef::new("grid_display", ValueKind::Bool).with_default(ParamDefault::Bool(true)),
    ParamDef::new("renderer", ValueKind::Str),
    ParamDef::new("order", ValueKind::Float),
    ParamDef::new("editable", ValueKind::Bool).with_default(ParamDefault::Bool(false)),
    ParamDef::new("api_only", ValueKind::Bool).with_default(ParamDefault::Bool(false)),
    ParamDef::new("api_backendtype", ValueKind::Str).with_default(ParamDefault::Str("property")),
    ParamDef::new("enum", ValueKind::StrList),
    ParamDef::new("datapoint", ValueKind::Str),
    ParamDef::new("datapoint_default", ValueKind::Str),
    ParamDef::new("datapoint_cached", ValueKind::Bool).with_default(ParamDefault::Bool(true)),
    ParamDef::new("index_scope", ValueKind::Str).with_default(ParamDefault::Str("device")),
];

/// Map an author-supplied order (0-100) into `base .. base + 1`.
pub(crate) fn banded_order(base: f64, order: Option<f64>) -> f64 {
    match order {
        Some(order) if order != 0.0 => base + order.clamp(0.0, 100.0) / 100.0,
        _ => base + 0.5,
    }
}

/// One property of a class.
#[derive(Debug, Clone)]
pub struct ClassPropertySpec {
    class_name: String,
    name: String,
    type_: String,
    label: Option<String>,
    short_label: Option<String>,
    index_type: Option<String>,
    label_width: i64,
    default: Option<String>,
    content_width: Option<i64>,
    display: bool,
    details_display: bool,
    grid_display: bool,
    renderer: Option<String>,
    order: Option<f64>,
    editable: bool,
    api_only: bool,
    api_backendtype: String,
    enum_: Vec<String>,
    datapoint: Option<String>,
    datapoint_default: Option<String>,
    datapoint_cached: bool,
    index_scope: String,
}

impl_spec_eq!(ClassPropertySpec);

impl ClassPropertySpec {
    /// The class this property belongs to.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Property data type, `string` unless given.
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// Display label; the property name unless given.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Short label for grid headings; the label unless given.
    pub fn short_label(&self) -> &str {
        self.short_label.as_deref().unwrap_or_else(|| self.label())
    }

    /// Catalog index type (`field`, `keyword`, ...), if indexed.
    pub fn index_type(&self) -> Option<&str> {
        self.index_type.as_deref()
    }

    /// `device`, `global` or `both`.
    pub fn index_scope(&self) -> &str {
        &self.index_scope
    }

    pub fn label_width(&self) -> i64 {
        self.label_width
    }

    /// Content width; the label width unless given.
    pub fn content_width(&self) -> i64 {
        self.content_width.unwrap_or(self.label_width)
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn display(&self) -> bool {
        self.display
    }

    pub fn details_display(&self) -> bool {
        self.details_display
    }

    pub fn grid_display(&self) -> bool {
        self.grid_display
    }

    /// Javascript renderer. `entity` properties get a link renderer unless
    /// one is given.
    pub fn renderer(&self) -> Option<&str> {
        match self.renderer.as_deref() {
            Some(renderer) => Some(renderer),
            None if self.type_ == "entity" => Some(ENTITY_RENDERER),
            None => None,
        }
    }

    /// Sort order in the 4.0-5.0 band; 4.5 unless given.
    pub fn order(&self) -> f64 {
        banded_order(4.0, self.order)
    }

    pub fn editable(&self) -> bool {
        self.editable
    }

    /// True when given, and always for datapoint-backed properties.
    pub fn api_only(&self) -> bool {
        self.api_only || self.datapoint.is_some()
    }

    /// `property` or `method`; always `method` for datapoint-backed
    /// properties.
    pub fn api_backendtype(&self) -> &str {
        if self.datapoint.is_some() {
            "method"
        } else {
            &self.api_backendtype
        }
    }

    /// Allowed values, in order.
    pub fn enum_values(&self) -> &[String] {
        &self.enum_
    }

    /// Datapoint whose last value backs this property.
    pub fn datapoint(&self) -> Option<&str> {
        self.datapoint.as_deref()
    }

    pub fn datapoint_default(&self) -> Option<&str> {
        self.datapoint_default.as_deref()
    }

    pub fn datapoint_cached(&self) -> bool {
        self.datapoint_cached
    }

    fn check_choice(&self, param: &str, value: &str, allowed: &[&str]) -> Result<(), SpecError> {
        if allowed.contains(&value) {
            return Ok(());
        }
        Err(SpecError::TypeCoercion {
            spec_type: Self::KIND.as_str(),
            param: param.to_string(),
            expected: format!("one of {}", allowed.join(", ")),
            value: format!("'{value}' for property '{}'", self.name),
        })
    }
}

impl Spec for ClassPropertySpec {
    const KIND: SpecKind = SpecKind::ClassProperty;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("type_", self.type_.clone().into());
        params.insert("label", self.label.clone().into());
        params.insert("short_label", self.short_label.clone().into());
        params.insert("index_type", self.index_type.clone().into());
        params.insert("label_width", self.label_width.into());
        params.insert("default", self.default.clone().into());
        params.insert("content_width", self.content_width.into());
        params.insert("display", self.display.into());
        params.insert("details_display", self.details_display.into());
        params.insert("grid_display", self.grid_display.into());
        params.insert("renderer", self.renderer.clone().into());
        params.insert("order", self.order.into());
        params.insert("editable", self.editable.into());
        params.insert("api_only", self.api_only.into());
        params.insert("api_backendtype", self.api_backendtype.clone().into());
        params.insert("enum", self.enum_.clone().into());
        params.insert("datapoint", self.datapoint.clone().into());
        params.insert("datapoint_default", self.datapoint_default.clone().into());
        params.insert("datapoint_cached", self.datapoint_cached.into());
        params.insert("index_scope", self.index_scope.clone().into());
        params
    }

    fn from_params(
        ctx: &mut BuildContext<'_>,
        parent: &str,
        name: &str,
        params: ParamMap,
    ) -> Result<Self, Diagnostic> {
        let mut reader = ParamReader::new(Self::KIND, params).map_err(|e| ctx.error(e))?;
        let read = |r: &mut ParamReader| -> Result<Self, SpecError> {
            Ok(Self {
                class_name: parent.to_string(),
                name: name.to_string(),
                type_: r.string("type_")?,
                label: r.opt_string("label")?,
                short_label: r.opt_string("short_label")?,
                index_type: r.opt_string("index_type")?,
                label_width: r.opt_int("label_width")?.unwrap_or(80),
                default: r.opt_string("default")?,
                content_width: r.opt_int("content_width")?,
                display: r.bool("display")?,
                details_display: r.bool("details_display")?,
                grid_display: r.bool("grid_display")?,
                renderer: r.opt_string("renderer")?,
                order: r.opt_float("order")?,
                editable: r.bool("editable")?,
                api_only: r.bool("api_only")?,
                api_backendtype: r.string("api_backendtype")?,
                enum_: r.str_list("enum")?,
                datapoint: r.opt_string("datapoint")?,
                datapoint_default: r.opt_string("datapoint_default")?,
                datapoint_cached: r.bool("datapoint_cached")?,
                index_scope: r.string("index_scope")?,
            })
        };
        let spec = read(&mut reader).map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;

        spec.check_choice("api_backendtype", spec.api_backendtype(), API_BACKENDTYPES)
            .and_then(|()| spec.check_choice("index_scope", &spec.index_scope, INDEX_SCOPES))
            .map_err(|e| ctx.error(e))?;
        Ok(spec)
    }
}
