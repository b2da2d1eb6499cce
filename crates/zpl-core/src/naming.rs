//! # Naming Rules
//!
//! Derivation of relationship names from class names and qualification of
//! class names against a specification namespace.

/// Returns true if `class_name` is already qualified with a module path.
pub fn is_qualified(class_name: &str) -> bool {
    class_name.contains('.')
}

/// Qualify `class_name` against `namespace` unless it is already qualified.
pub fn qualify(namespace: &str, class_name: &str) -> String {
    if is_qualified(class_name) || namespace.is_empty() {
        class_name.to_string()
    } else {
        format!("{namespace}.{class_name}")
    }
}

/// Return the relationship name conventionally used to point at
/// `class_name`.
///
/// The leading run of uppercase letters is lowercased (`FabricPod` →
/// `fabricPod`, `APIC` → `apic`, `SR` → `sr`). A qualified name is first
/// flattened (`Products.ZenModel.Device` → `products_zenmodel_device`).
/// `plural` appends `s`.
pub fn relname_from_classname(class_name: &str, plural: bool) -> String {
    let flattened;
    let name = if is_qualified(class_name) {
        flattened = class_name.replace('.', "_").to_lowercase();
        flattened.as_str()
    } else {
        class_name
    };

    let mut relname = String::with_capacity(name.len() + 1);
    let mut leading = true;
    for c in name.chars() {
        if leading && c.is_uppercase() {
            relname.extend(c.to_lowercase());
        } else {
            leading = false;
            relname.push(c);
        }
    }
    if plural {
        relname.push('s');
    }
    relname
}

/// Naive English plural used for derived labels.
pub fn pluralize(text: &str) -> String {
    if text.ends_with('s') {
        format!("{text}es")
    } else {
        format!("{text}s")
    }
}

/// Uppercase the first character without touching the rest.
pub fn ucfirst(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relname_lowercases_leading_uppercase_run() {
        assert_eq!(relname_from_classname("FabricPod", false), "fabricPod");
        assert_eq!(relname_from_classname("APIC", false), "apic");
        assert_eq!(relname_from_classname("FvAEPg", true), "fvAEPgs");
        assert_eq!(relname_from_classname("Fan", true), "fans");
        assert_eq!(relname_from_classname("pod", false), "pod");
    }

    #[test]
    fn relname_flattens_qualified_names() {
        assert_eq!(
            relname_from_classname("Products.ZenModel.Device.Device", false),
            "products_zenmodel_device_device"
        );
    }

    #[test]
    fn qualify_leaves_qualified_names_alone() {
        assert_eq!(qualify("ZenPacks.test.Pods", "Pod"), "ZenPacks.test.Pods.Pod");
        assert_eq!(
            qualify("ZenPacks.test.Pods", "Products.ZenModel.Device.Device"),
            "Products.ZenModel.Device.Device"
        );
        assert_eq!(qualify("", "Pod"), "Pod");
    }

    #[test]
    fn pluralize_and_ucfirst() {
        assert_eq!(pluralize("Pod"), "Pods");
        assert_eq!(pluralize("Chassis"), "Chassises");
        assert_eq!(ucfirst("fabricPod"), "FabricPod");
        assert_eq!(ucfirst(""), "");
    }
}
