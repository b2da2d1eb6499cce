//! # Decoding
//!
//! YAML values to parameter maps, driven by the kind's parameter table.
//!
//! Document keys are mapped from external to internal names. Values are
//! coerced to their declared kind:
//!
//! | Kind | Accepted |
//! |------|----------|
//! | bool | booleans, `true/false/yes/no/on/off` strings |
//! | int, float | numbers, numeric strings |
//! | string | any scalar |
//! | lists | sequences of scalars, or one scalar |
//! | severity | `0`-`5`, or a name such as `warn`, `error`, `critical` |
//! | relationships | compact notation, yUML lines, or a yUML block string |
//!
//! A problem with one key is reported through the build context and the key
//! is skipped. In strict mode the report aborts decoding instead. A child of
//! a nested collection that is not a mapping is skipped the same way, unless
//! its kind accepts scalar shorthand.

use serde_yaml::{Mapping, Value};
use zpl_core::{Diagnostic, SpecError};
use zpl_spec::nodes::rrd::datapoint_from_shorthand;
use zpl_spec::notation::is_skippable;
use zpl_spec::params::resolve_typed_kind;
use zpl_spec::{
    document_defaults, param_table, parse_relationship, BuildContext, ClassRef, ParamDef,
    ParamMap, ParamTable, ParamValue, RelationshipDecl, SpecKind, SpecParams, ValueKind,
    DEFAULTS_KEY,
};

/// Decode a document mapping into the parameters of a node of `kind`.
///
/// # Errors
///
/// Returns the diagnostic that aborted decoding: any reported problem in
/// strict mode, or a document that is not a mapping at all.
pub fn decode(
    kind: SpecKind,
    document: &Value,
    ctx: &mut BuildContext<'_>,
) -> Result<ParamMap, Diagnostic> {
    let table = param_table(kind).map_err(|e| ctx.error(e))?;
    let mapping = match document {
        Value::Null => return Ok(ParamMap::new()),
        Value::Mapping(mapping) => mapping,
        other => return Err(ctx.error(SpecError::structural("a mapping", describe(other)))),
    };

    let mut params = ParamMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            ctx.report(SpecError::structural("a string key", describe(key)))?;
            continue;
        };
        let Some(def) = table.by_external(key) else {
            tracing::debug!(spec_type = kind.as_str(), key, "unknown parameter");
            ctx.within(key, |ctx| {
                ctx.report(SpecError::UnknownParameter {
                    spec_type: kind.as_str(),
                    param: key.to_string(),
                })
            })?;
            continue;
        };
        // Without a sibling in this mapping the type may still come from
        // DEFAULTS, so the value keeps its YAML type until the node is built.
        let value_kind = match def.kind {
            ValueKind::TypedBy { field } => match sibling(table, mapping, field) {
                Some(type_) => resolve_typed_kind(kind, Some(type_)),
                None => def.kind,
            },
            declared => declared,
        };
        let decoded = ctx.within(key, |ctx| decode_value(ctx, kind, def, value_kind, value))?;
        if let Some(decoded) = decoded {
            params.insert(def.name, decoded);
        }
    }
    Ok(params)
}

/// The string value of a sibling parameter, by internal name.
fn sibling<'m>(table: &ParamTable, mapping: &'m Mapping, field: &str) -> Option<&'m str> {
    let def = table.get(field)?;
    mapping.get(def.external_name)?.as_str()
}

fn decode_value(
    ctx: &mut BuildContext<'_>,
    kind: SpecKind,
    def: &ParamDef,
    value_kind: ValueKind,
    value: &Value,
) -> Result<Option<ParamValue>, Diagnostic> {
    if value.is_null() {
        return Ok(Some(ParamValue::Null));
    }
    match value_kind {
        ValueKind::Specs(child) => {
            return Ok(decode_specs(ctx, child, value)?.map(|s| ParamValue::Specs(child, s)));
        }
        ValueKind::DictOfSpecs(child) => {
            let Some(groups) = expect_mapping(ctx, value)? else {
                return Ok(None);
            };
            let mut decoded = indexmap::IndexMap::new();
            for (group, children) in groups {
                let Some(group) = scalar_string(group) else {
                    ctx.report(SpecError::structural("a group name", describe(group)))?;
                    continue;
                };
                let specs = ctx.within(group.clone(), |ctx| decode_specs(ctx, child, children))?;
                if let Some(specs) = specs {
                    decoded.insert(group, specs);
                }
            }
            return Ok(Some(ParamValue::SpecsDict(child, decoded)));
        }
        ValueKind::Dict => {
            return Ok(expect_mapping(ctx, value)?.map(|m| ParamValue::Dict(m.clone())));
        }
        ValueKind::RelationshipSchema => {
            return Ok(decode_relationship(ctx, value)?.map(ParamValue::Relationship));
        }
        ValueKind::RelationshipSchemaList => {
            return Ok(Some(ParamValue::RelationshipList(decode_relationships(
                ctx, value,
            )?)));
        }
        _ => {}
    }

    match coerce(value_kind, value) {
        Some(decoded) => Ok(Some(decoded)),
        None => {
            ctx.report(SpecError::TypeCoercion {
                spec_type: kind.as_str(),
                param: def.external_name.to_string(),
                expected: value_kind.describe(),
                value: render(value),
            })?;
            Ok(None)
        }
    }
}

/// Coerce a scalar or list value. `None` if the value does not fit.
fn coerce(kind: ValueKind, value: &Value) -> Option<ParamValue> {
    let coerced = match kind {
        ValueKind::Bool => ParamValue::Bool(match value {
            Value::Bool(b) => *b,
            Value::String(s) => parse_bool(s)?,
            _ => return None,
        }),
        ValueKind::Int => ParamValue::Int(match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        }),
        ValueKind::Float => ParamValue::Float(match value {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        }),
        ValueKind::Str => ParamValue::Str(scalar_string(value)?),
        ValueKind::TypedBy { .. } => match value {
            Value::Bool(b) => ParamValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => ParamValue::Float(n.as_f64()?),
            },
            Value::String(s) => ParamValue::Str(s.clone()),
            Value::Sequence(_) => ParamValue::StrList(string_list(value)?),
            _ => return None,
        },
        ValueKind::StrList => ParamValue::StrList(string_list(value)?),
        ValueKind::ClassRef => ParamValue::ClassRef(ClassRef::parse(&scalar_string(value)?)),
        ValueKind::ClassRefList => ParamValue::ClassRefList(
            string_list(value)?
                .iter()
                .map(|token| ClassRef::parse(token))
                .collect(),
        ),
        ValueKind::Severity => ParamValue::Severity(match value {
            Value::Number(n) => zpl_core::Severity::from_int(n.as_i64().or_else(|| {
                n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)
            })?)?,
            Value::String(s) => s.parse().ok()?,
            _ => return None,
        }),
        ValueKind::Dict
        | ValueKind::Specs(_)
        | ValueKind::DictOfSpecs(_)
        | ValueKind::RelationshipSchema
        | ValueKind::RelationshipSchemaList => return None,
    };
    Some(coerced)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => items.iter().map(scalar_string).collect(),
        scalar => Some(vec![scalar_string(scalar)?]),
    }
}

fn expect_mapping<'v>(
    ctx: &mut BuildContext<'_>,
    value: &'v Value,
) -> Result<Option<&'v Mapping>, Diagnostic> {
    match value {
        Value::Mapping(mapping) => Ok(Some(mapping)),
        other => {
            ctx.report(SpecError::structural("a mapping", describe(other)))?;
            Ok(None)
        }
    }
}

/// Decode a named collection of children of `kind`.
///
/// # Errors
///
/// As for [`decode`].
pub fn decode_specs(
    ctx: &mut BuildContext<'_>,
    kind: SpecKind,
    value: &Value,
) -> Result<Option<SpecParams>, Diagnostic> {
    let Some(mapping) = expect_mapping(ctx, value)? else {
        return Ok(None);
    };

    let mut skip_defaults = false;
    if let Err(bad) = document_defaults(mapping) {
        ctx.within(DEFAULTS_KEY, |ctx| {
            ctx.report(SpecError::structural("a mapping", describe(bad)))
        })?;
        skip_defaults = true;
    }

    let mut children = SpecParams::with_capacity(mapping.len());
    for (name, child) in mapping {
        let Some(name) = scalar_string(name) else {
            ctx.report(SpecError::structural("an entry name", describe(name)))?;
            continue;
        };
        if skip_defaults && name == DEFAULTS_KEY {
            continue;
        }
        let decoded = ctx.within(name.clone(), |ctx| decode_child(ctx, kind, child))?;
        if let Some(params) = decoded {
            children.insert(name, params);
        }
    }
    Ok(Some(children))
}

fn decode_child(
    ctx: &mut BuildContext<'_>,
    kind: SpecKind,
    child: &Value,
) -> Result<Option<ParamMap>, Diagnostic> {
    match child {
        Value::Null | Value::Mapping(_) => decode(kind, child, ctx).map(Some),
        other if kind.has_scalar_shorthand() => {
            let Some(text) = scalar_string(other) else {
                ctx.report(SpecError::structural("a mapping or shorthand string", describe(other)))?;
                return Ok(None);
            };
            match datapoint_from_shorthand(&text) {
                Ok(params) => Ok(Some(params)),
                Err(e) => {
                    ctx.report(e)?;
                    Ok(None)
                }
            }
        }
        other => {
            ctx.report(SpecError::structural("a mapping", describe(other)))?;
            Ok(None)
        }
    }
}

fn decode_relationship(
    ctx: &mut BuildContext<'_>,
    value: &Value,
) -> Result<Option<RelationshipDecl>, Diagnostic> {
    let Some(text) = value.as_str() else {
        ctx.report(SpecError::structural("a relationship string", describe(value)))?;
        return Ok(None);
    };
    match parse_relationship(text) {
        Ok(decl) => Ok(Some(decl)),
        Err(e) => {
            ctx.report_notation(e)?;
            Ok(None)
        }
    }
}

/// A sequence of notation strings, or one string holding a block of lines.
fn decode_relationships(
    ctx: &mut BuildContext<'_>,
    value: &Value,
) -> Result<Vec<RelationshipDecl>, Diagnostic> {
    let mut decls = Vec::new();
    match value {
        Value::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                if let Some(decl) = ctx.within(i.to_string(), |ctx| decode_relationship(ctx, item))? {
                    decls.push(decl);
                }
            }
        }
        Value::String(block) if block.contains('\n') => {
            for (i, line) in block.lines().enumerate() {
                let decl = ctx.within(i.to_string(), |ctx| {
                    match is_skippable(line) {
                        Ok(true) => return Ok(None),
                        Ok(false) => {}
                        Err(e) => return Err(ctx.error(e)),
                    }
                    decode_relationship(ctx, &Value::String(line.to_string()))
                })?;
                decls.extend(decl);
            }
        }
        Value::String(_) => decls.extend(decode_relationship(ctx, value)?),
        other => {
            ctx.report(SpecError::structural("a list of relationship strings", describe(other)))?;
        }
    }
    Ok(decls)
}

/// Short description of a value's shape, for structural errors.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(s) => format!("the string '{s}'"),
        Value::Sequence(_) => "a sequence".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => format!("a value tagged {}", tagged.tag),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        other => match serde_yaml::to_string(other) {
            Ok(text) => text.trim_end().to_string(),
            Err(_) => describe(other),
        },
    }
}
