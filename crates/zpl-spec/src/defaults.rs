//! # DEFAULTS Overlay
//!
//! A named collection may contain a reserved `DEFAULTS` entry. Its fields
//! are merged into every sibling entry, field by field; the sibling's own
//! fields win. The merge is shallow: a nested collection given in both
//! places is taken whole from the sibling.
//!
//! With `leave_defaults = false` the `DEFAULTS` entry is removed after the
//! overlay. With `leave_defaults = true` it stays in place as an ordinary,
//! already-resolved entry so that it can be written back out.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::value::ParamMap;

/// Reserved collection key holding sibling defaults.
pub const DEFAULTS_KEY: &str = "DEFAULTS";

/// A field map that can take fields from a defaults entry.
pub trait Overlay: Clone {
    /// Copy every field of `defaults` that `self` does not set.
    fn overlay(&mut self, defaults: &Self);
}

impl Overlay for ParamMap {
    fn overlay(&mut self, defaults: &Self) {
        for (name, value) in defaults {
            if !self.contains_key(name) {
                self.insert(*name, value.clone());
            }
        }
    }
}

/// Overlay the `DEFAULTS` entry of `collection` onto its other entries, in
/// place. A collection without `DEFAULTS` is left unchanged.
pub fn apply_defaults<M: Overlay>(collection: &mut IndexMap<String, M>, leave_defaults: bool) {
    let defaults = if leave_defaults {
        collection.get(DEFAULTS_KEY).cloned()
    } else {
        collection.shift_remove(DEFAULTS_KEY)
    };
    let Some(defaults) = defaults else {
        return;
    };
    for (name, entry) in collection.iter_mut() {
        if name != DEFAULTS_KEY {
            entry.overlay(&defaults);
        }
    }
}

/// Like [`apply_defaults`], but first seeds the `DEFAULTS` entry (creating it
/// if needed) with every field of `default_defaults` it does not set.
pub fn apply_defaults_with<M: Overlay + Default>(
    collection: &mut IndexMap<String, M>,
    default_defaults: &M,
    leave_defaults: bool,
) {
    collection
        .entry(DEFAULTS_KEY.to_string())
        .or_default()
        .overlay(default_defaults);
    apply_defaults(collection, leave_defaults);
}

/// Pure variant of [`apply_defaults`].
pub fn with_defaults<M: Overlay>(
    collection: &IndexMap<String, M>,
    leave_defaults: bool,
) -> IndexMap<String, M> {
    let mut resolved = collection.clone();
    apply_defaults(&mut resolved, leave_defaults);
    resolved
}

/// Returns the `DEFAULTS` mapping of a document collection, if any.
///
/// A null `DEFAULTS` value counts as an empty mapping. Any other non-mapping
/// value is returned as `Err` with the value, for the caller to report.
pub fn document_defaults(collection: &Mapping) -> Result<Option<Mapping>, &Value> {
    match collection.get(DEFAULTS_KEY) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(Mapping::new())),
        Some(Value::Mapping(m)) => Ok(Some(m.clone())),
        Some(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ParamValue;

    fn entry(fields: &[(&'static str, ParamValue)]) -> ParamMap {
        fields.iter().cloned().collect()
    }

    fn collection() -> IndexMap<String, ParamMap> {
        let mut c = IndexMap::new();
        c.insert(
            DEFAULTS_KEY.to_string(),
            entry(&[("display", ParamValue::Bool(false))]),
        );
        c.insert("status".to_string(), ParamMap::new());
        c.insert(
            "name".to_string(),
            entry(&[("display", ParamValue::Bool(true))]),
        );
        c
    }

    #[test]
    fn entry_fields_win_over_defaults() {
        let mut c = collection();
        apply_defaults(&mut c, false);
        assert!(!c.contains_key(DEFAULTS_KEY));
        assert_eq!(c["status"]["display"], ParamValue::Bool(false));
        assert_eq!(c["name"]["display"], ParamValue::Bool(true));
    }

    #[test]
    fn leave_defaults_keeps_entry_in_place() {
        let mut c = collection();
        apply_defaults(&mut c, true);
        assert_eq!(c.get_index(0).map(|(k, _)| k.as_str()), Some(DEFAULTS_KEY));
        assert_eq!(c.len(), 3);
        assert_eq!(c["status"]["display"], ParamValue::Bool(false));
    }

    #[test]
    fn removal_preserves_sibling_order() {
        let mut c = collection();
        apply_defaults(&mut c, false);
        let keys: Vec<_> = c.keys().map(String::as_str).collect();
        assert_eq!(keys, ["status", "name"]);
    }

    #[test]
    fn second_application_is_a_no_op() {
        let once = with_defaults(&collection(), false);
        let twice = with_defaults(&once, false);
        assert_eq!(once, twice);
    }

    #[test]
    fn pure_variant_leaves_input_untouched() {
        let c = collection();
        let _ = with_defaults(&c, false);
        assert!(c.contains_key(DEFAULTS_KEY));
        assert!(c["status"].is_empty());
    }

    #[test]
    fn default_defaults_seed_the_defaults_entry() {
        let mut c = IndexMap::new();
        c.insert("status".to_string(), ParamMap::new());
        c.insert(
            "name".to_string(),
            entry(&[("grid_display", ParamValue::Bool(true))]),
        );
        let seed = entry(&[("grid_display", ParamValue::Bool(false))]);
        apply_defaults_with(&mut c, &seed, false);
        assert_eq!(c["status"]["grid_display"], ParamValue::Bool(false));
        assert_eq!(c["name"]["grid_display"], ParamValue::Bool(true));
        assert!(!c.contains_key(DEFAULTS_KEY));
    }

    #[test]
    fn overlay_is_shallow() {
        use crate::kind::SpecKind;

        let nested = |name: &str| {
            let mut specs = IndexMap::new();
            specs.insert(name.to_string(), ParamMap::new());
            ParamValue::Specs(SpecKind::ClassProperty, specs)
        };
        let mut c = IndexMap::new();
        c.insert(DEFAULTS_KEY.to_string(), entry(&[("properties", nested("a"))]));
        c.insert("Pod".to_string(), entry(&[("properties", nested("b"))]));
        apply_defaults(&mut c, false);
        let props = c["Pod"]["properties"].as_specs().unwrap();
        assert!(props.contains_key("b"));
        assert!(!props.contains_key("a"));
    }

    #[test]
    fn null_defaults_document_entry_is_empty() {
        let doc: Mapping = serde_yaml::from_str("DEFAULTS:\nPod: {}\n").unwrap();
        assert_eq!(document_defaults(&doc).unwrap(), Some(Mapping::new()));
        let doc: Mapping = serde_yaml::from_str("DEFAULTS: [1]\n").unwrap();
        assert!(document_defaults(&doc).is_err());
    }
}
