//! Configuration properties declared by a specification.
//!
//! The kind of `default` depends on the property's `type`: a `boolean`
//! property takes a boolean default, `lines` a list of strings, and so on.

use zpl_core::{Diagnostic, SpecError};

use crate::kind::SpecKind;
use crate::params::{ParamDef, ParamDefault, ValueKind};
use crate::spec::{impl_spec_eq, BuildContext, ParamReader, Spec};
use crate::value::{ParamMap, ParamValue};

pub static PARAMS: &[ParamDef] = &[
    ParamDef::new("type_", ValueKind::Str)
        .renamed("type")
        .with_default(ParamDefault::Str("string")),
    ParamDef::new("default", ValueKind::TypedBy { field: "type_" }),
    ParamDef::new("category", ValueKind::Str),
];

/// The value kind of a `default` for a property of type `type_`.
pub fn value_kind_for_type(type_: Option<&str>) -> ValueKind {
    match type_ {
        Some("boolean") => ValueKind::Bool,
        Some("int") => ValueKind::Int,
        Some("float") => ValueKind::Float,
        Some("lines") => ValueKind::StrList,
        _ => ValueKind::Str,
    }
}

/// A configuration property.
#[derive(Debug, Clone)]
pub struct ZPropertySpec {
    zenpack: String,
    name: String,
    type_: String,
    default: ParamValue,
    category: Option<String>,
}

impl_spec_eq!(ZPropertySpec);

impl ZPropertySpec {
    /// Name of the owning specification.
    pub fn zenpack(&self) -> &str {
        &self.zenpack
    }

    /// `boolean`, `int`, `float`, `string`, `password` or `lines`.
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// The default as written; null when not given.
    pub fn default(&self) -> &ParamValue {
        &self.default
    }

    /// The default, falling back to the empty value of the type.
    pub fn effective_default(&self) -> ParamValue {
        if !self.default.is_null() {
            return self.default.clone();
        }
        match self.type_.as_str() {
            "string" | "password" => ParamValue::Str(String::new()),
            "lines" => ParamValue::StrList(Vec::new()),
            "boolean" => ParamValue::Bool(false),
            _ => ParamValue::Null,
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// Read a default decoded before its type was known as `kind`. Values
/// that cannot be read are returned unchanged.
fn retype(kind: ValueKind, default: ParamValue) -> ParamValue {
    let retyped = match (kind, &default) {
        (ValueKind::Bool, ParamValue::Str(text)) => {
            match text.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" => Some(ParamValue::Bool(true)),
                "false" | "no" | "off" => Some(ParamValue::Bool(false)),
                _ => None,
            }
        }
        (ValueKind::Int, ParamValue::Str(text)) => text.trim().parse().ok().map(ParamValue::Int),
        (ValueKind::Int, ParamValue::Float(f)) if f.fract() == 0.0 => {
            Some(ParamValue::Int(*f as i64))
        }
        (ValueKind::Float, ParamValue::Str(text)) => {
            text.trim().parse().ok().map(ParamValue::Float)
        }
        (ValueKind::Float, ParamValue::Int(i)) => Some(ParamValue::Float(*i as f64)),
        (ValueKind::StrList, ParamValue::Str(text)) => Some(ParamValue::StrList(vec![text.clone()])),
        (ValueKind::Str, ParamValue::Bool(b)) => Some(ParamValue::Str(b.to_string())),
        (ValueKind::Str, ParamValue::Int(i)) => Some(ParamValue::Str(i.to_string())),
        (ValueKind::Str, ParamValue::Float(f)) => {
            Some(ParamValue::Str(serde_yaml::Number::from(*f).to_string()))
        }
        _ => None,
    };
    retyped.unwrap_or(default)
}

fn fits(kind: ValueKind, value: &ParamValue) -> bool {
    matches!(
        (kind, value),
        (_, ParamValue::Null)
            | (ValueKind::Bool, ParamValue::Bool(_))
            | (ValueKind::Int, ParamValue::Int(_))
            | (ValueKind::Float, ParamValue::Float(_) | ParamValue::Int(_))
            | (ValueKind::StrList, ParamValue::StrList(_))
            | (ValueKind::Str, ParamValue::Str(_))
    )
}

impl Spec for ZPropertySpec {
    const KIND: SpecKind = SpecKind::ZProperty;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("type_", self.type_.clone().into());
        params.insert("default", self.default.clone());
        params.insert("category", self.category.clone().into());
        params
    }

    fn from_params(
        ctx: &mut BuildContext<'_>,
        parent: &str,
        name: &str,
        params: ParamMap,
    ) -> Result<Self, Diagnostic> {
        let mut reader = ParamReader::new(Self::KIND, params).map_err(|e| ctx.error(e))?;
        let type_ = reader.string("type_").map_err(|e| ctx.error(e))?;
        let default = reader.value("default").map_err(|e| ctx.error(e))?;
        let category = reader.opt_string("category").map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;

        let kind = value_kind_for_type(Some(&type_));
        let default = retype(kind, default);
        if !fits(kind, &default) {
            return Err(ctx.error(SpecError::TypeCoercion {
                spec_type: Self::KIND.as_str(),
                param: "default".to_string(),
                expected: kind.describe(),
                value: format!("a {} value", default.type_name()),
            }));
        }

        Ok(Self {
            zenpack: parent.to_string(),
            name: name.to_string(),
            type_,
            default,
            category,
        })
    }
}
