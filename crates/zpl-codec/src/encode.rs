//! # Encoding
//!
//! Parameter maps to YAML mappings, driven by the kind's parameter table.
//!
//! Parameters are written in declared order under their external names. A
//! parameter equal to its effective default is left out: the matching field
//! of the enclosing collection's `DEFAULTS` entry when there is one, the
//! static default otherwise. A null is written only where it overrides a
//! non-null `DEFAULTS` value of a scalar parameter.
//!
//! Nested collections write their `DEFAULTS` entry first and the remaining
//! entries sorted by name.

use serde_yaml::{Mapping, Number, Value};
use zpl_core::{Severity, SpecError};
use zpl_spec::{
    param_table, ParamDef, ParamMap, ParamValue, Spec, SpecKind, SpecParams, ValueKind,
    DEFAULTS_KEY,
};

/// Encode one node.
///
/// # Errors
///
/// As for [`encode`].
pub fn encode_node<T: Spec>(node: &T) -> Result<Mapping, SpecError> {
    encode(T::KIND, &node.to_params(), None)
}

/// Encode the parameters of one node of `kind`. `defaults` holds the
/// parameters of the `DEFAULTS` entry of the collection the node sits in.
///
/// # Errors
///
/// [`SpecError::Encode`] naming the kind and parameter when a declared
/// parameter is missing from `params` or holds a value its kind cannot
/// carry.
pub fn encode(
    kind: SpecKind,
    params: &ParamMap,
    defaults: Option<&ParamMap>,
) -> Result<Mapping, SpecError> {
    let table = param_table(kind)?;
    let mut out = Mapping::new();
    for def in table.defs() {
        let value = params
            .get(def.name)
            .ok_or_else(|| encode_error(kind, def, "is not set on this object".to_string()))?;
        let effective_default = defaults
            .and_then(|d| d.get(def.name))
            .cloned()
            .or_else(|| def.default_value());
        if value.is_null() {
            let overrides = !def.kind.is_collection()
                && effective_default.as_ref().is_some_and(|d| !d.is_null());
            if overrides {
                out.insert(Value::String(def.external_name.to_string()), Value::Null);
            }
            continue;
        }
        if effective_default.as_ref() == Some(value) {
            continue;
        }
        out.insert(
            Value::String(def.external_name.to_string()),
            encode_value(kind, def, value)?,
        );
    }
    Ok(out)
}

fn encode_value(kind: SpecKind, def: &ParamDef, value: &ParamValue) -> Result<Value, SpecError> {
    let encoded = match (def.kind, value) {
        (ValueKind::Bool, ParamValue::Bool(b)) => Value::Bool(*b),
        (ValueKind::Int, ParamValue::Int(i)) => Value::Number(Number::from(*i)),
        (ValueKind::Float, ParamValue::Float(f)) => Value::Number(Number::from(*f)),
        (ValueKind::Float, ParamValue::Int(i)) => Value::Number(Number::from(*i as f64)),
        (ValueKind::Str, ParamValue::Str(s)) => Value::String(s.clone()),
        (ValueKind::StrList, ParamValue::StrList(items)) => strings(items.iter().cloned()),
        (ValueKind::ClassRef, ParamValue::ClassRef(class)) => Value::String(class.to_string()),
        (ValueKind::ClassRefList, ParamValue::ClassRefList(classes)) => {
            strings(classes.iter().map(|c| c.to_string()))
        }
        (ValueKind::RelationshipSchema, ParamValue::Relationship(decl)) => Value::String(
            decl.to_notation()
                .map_err(|e| encode_error(kind, def, e.to_string()))?,
        ),
        (ValueKind::RelationshipSchemaList, ParamValue::RelationshipList(decls)) => {
            let lines = decls
                .iter()
                .map(|decl| decl.to_notation())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| encode_error(kind, def, e.to_string()))?;
            strings(lines.into_iter())
        }
        (ValueKind::Severity, ParamValue::Severity(severity)) => {
            Value::String(severity.as_str().to_string())
        }
        (ValueKind::Severity, ParamValue::Int(level)) => {
            let severity = Severity::from_int(*level).ok_or_else(|| {
                encode_error(kind, def, format!("has severity level {level} outside 0-5"))
            })?;
            Value::String(severity.as_str().to_string())
        }
        (ValueKind::Dict, ParamValue::Dict(mapping)) => Value::Mapping(mapping.clone()),
        (ValueKind::Specs(expected), ParamValue::Specs(found, children)) if expected == *found => {
            Value::Mapping(encode_specs(expected, children)?)
        }
        (ValueKind::DictOfSpecs(expected), ParamValue::SpecsDict(found, groups))
            if expected == *found =>
        {
            let mut out = Mapping::new();
            for (group, children) in groups {
                out.insert(
                    Value::String(group.clone()),
                    Value::Mapping(encode_specs(expected, children)?),
                );
            }
            Value::Mapping(out)
        }
        (ValueKind::TypedBy { .. }, ParamValue::Bool(b)) => Value::Bool(*b),
        (ValueKind::TypedBy { .. }, ParamValue::Int(i)) => Value::Number(Number::from(*i)),
        (ValueKind::TypedBy { .. }, ParamValue::Float(f)) => Value::Number(Number::from(*f)),
        (ValueKind::TypedBy { .. }, ParamValue::Str(s)) => Value::String(s.clone()),
        (ValueKind::TypedBy { .. }, ParamValue::StrList(items)) => strings(items.iter().cloned()),
        (declared, found) => {
            return Err(encode_error(
                kind,
                def,
                format!(
                    "holds {}, which cannot be written as {}",
                    found.type_name(),
                    declared.describe()
                ),
            ))
        }
    };
    Ok(encoded)
}

/// Encode a named collection of children of `kind`.
///
/// # Errors
///
/// As for [`encode`].
pub fn encode_specs(kind: SpecKind, children: &SpecParams) -> Result<Mapping, SpecError> {
    let defaults = children.get(DEFAULTS_KEY);
    let mut out = Mapping::new();
    if let Some(defaults) = defaults {
        out.insert(
            Value::String(DEFAULTS_KEY.to_string()),
            Value::Mapping(encode(kind, defaults, None)?),
        );
    }

    let mut entries: Vec<_> = children
        .iter()
        .filter(|(name, _)| name.as_str() != DEFAULTS_KEY)
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (name, params) in entries {
        out.insert(
            Value::String(name.clone()),
            Value::Mapping(encode(kind, params, defaults)?),
        );
    }
    Ok(out)
}

fn strings(items: impl Iterator<Item = String>) -> Value {
    Value::Sequence(items.map(Value::String).collect())
}

fn encode_error(kind: SpecKind, def: &ParamDef, reason: String) -> SpecError {
    SpecError::Encode {
        spec_type: kind.as_str(),
        param: def.external_name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zpl_spec::ClassRef;

    fn map(fields: &[(&'static str, ParamValue)]) -> ParamMap {
        fields.iter().cloned().collect()
    }

    fn full(kind: SpecKind, fields: &[(&'static str, ParamValue)]) -> ParamMap {
        let table = param_table(kind).unwrap();
        let mut params: ParamMap = table
            .defs()
            .iter()
            .map(|d| (d.name, d.default_value().unwrap_or(ParamValue::Null)))
            .collect();
        params.extend(fields.iter().cloned());
        params
    }

    #[test]
    fn static_defaults_are_omitted() {
        let params = full(
            SpecKind::ClassRelationship,
            &[("display", true.into()), ("label", "Fans".into())],
        );
        let out = encode(SpecKind::ClassRelationship, &params, None).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.get("label"), Some(&Value::String("Fans".into())));
    }

    #[test]
    fn external_names_and_order_are_used() {
        let params = full(
            SpecKind::ClassProperty,
            &[("label", "Status".into()), ("type_", "int".into())],
        );
        let out = encode(SpecKind::ClassProperty, &params, None).unwrap();
        let keys: Vec<_> = out.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["type", "label"]);
    }

    #[test]
    fn collection_defaults_are_contextual() {
        let defaults = full(SpecKind::ClassProperty, &[("display", false.into())]);
        let hidden = full(SpecKind::ClassProperty, &[("display", false.into())]);
        let shown = full(SpecKind::ClassProperty, &[("display", true.into())]);

        let out = encode(SpecKind::ClassProperty, &hidden, Some(&defaults)).unwrap();
        assert!(out.is_empty());
        let out = encode(SpecKind::ClassProperty, &shown, Some(&defaults)).unwrap();
        assert_eq!(out.get("display"), Some(&Value::Bool(true)));
    }

    #[test]
    fn null_is_written_only_over_a_defaults_value() {
        let defaults = full(SpecKind::ZProperty, &[("category", "Widgets".into())]);
        let cleared = full(SpecKind::ZProperty, &[]);
        let out = encode(SpecKind::ZProperty, &cleared, Some(&defaults)).unwrap();
        assert_eq!(out.get("category"), Some(&Value::Null));

        let out = encode(SpecKind::ZProperty, &cleared, None).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn defaults_entry_comes_first_and_names_are_sorted() {
        let mut children = SpecParams::new();
        children.insert("zeta".into(), full(SpecKind::ClassRelationship, &[]));
        children.insert("alpha".into(), full(SpecKind::ClassRelationship, &[]));
        children.insert(
            DEFAULTS_KEY.into(),
            full(SpecKind::ClassRelationship, &[("grid_display", false.into())]),
        );
        let out = encode_specs(SpecKind::ClassRelationship, &children).unwrap();
        let keys: Vec<_> = out.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, [DEFAULTS_KEY, "alpha", "zeta"]);
        assert_eq!(
            out.get(DEFAULTS_KEY).and_then(|d| d.get("grid_display")),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn severity_is_written_by_name() {
        let params = full(
            SpecKind::RrdThreshold,
            &[("severity", ParamValue::Severity(Severity::Warning))],
        );
        let out = encode(SpecKind::RrdThreshold, &params, None).unwrap();
        assert_eq!(out.get("severity"), Some(&Value::String("warn".into())));
    }

    #[test]
    fn class_refs_are_written_as_tokens() {
        let params = full(
            SpecKind::Class,
            &[(
                "base",
                ParamValue::ClassRefList(vec![
                    ClassRef::parse("Module"),
                    ClassRef::parse("zenpacklib.HardwareComponent"),
                ]),
            )],
        );
        let out = encode(SpecKind::Class, &params, None).unwrap();
        let base: Vec<_> = out
            .get("base")
            .and_then(Value::as_sequence)
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(base, ["Module", "zenpacklib.HardwareComponent"]);
    }

    #[test]
    fn missing_parameter_is_an_encode_error() {
        let err = encode(SpecKind::ClassRelationship, &map(&[]), None).unwrap_err();
        assert_eq!(err.code(), "encode");
        assert!(err.to_string().contains("ClassRelationshipSpec"), "{err}");
    }

    #[test]
    fn mismatched_value_is_an_encode_error() {
        let params = full(SpecKind::ClassRelationship, &[("display", "yes".into())]);
        let err = encode(SpecKind::ClassRelationship, &params, None).unwrap_err();
        assert!(matches!(err, SpecError::Encode { ref param, .. } if param == "display"));
    }
}
