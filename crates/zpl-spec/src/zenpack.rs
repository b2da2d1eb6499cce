//! # ZenPack Specification
//!
//! Root of the specification tree. Building runs in two passes:
//!
//! 1. Every collection is built (`zProperties`, `classes`,
//!    `device_classes`), each with its `DEFAULTS` overlaid first, and every
//!    entry of `class_relationships` is resolved into a
//!    [`RelationshipSchema`] against the specification's namespace.
//! 2. The schemas are linked to their classes in a [`RelationshipTable`].
//!    Class nodes built in pass 1 are not touched again.
//!
//! The specification's `name` is its namespace: unqualified class names
//! are qualified against it.

use std::collections::HashSet;

use indexmap::IndexMap;
use zpl_core::{Diagnostic, SpecError};

use crate::defaults::DEFAULTS_KEY;
use crate::kind::SpecKind;
use crate::nodes::{ClassPropertySpec, ClassRelationshipSpec, ClassSpec, DeviceClassSpec, ZPropertySpec};
use crate::params::{ParamDef, ValueKind};
use crate::relationship::{RelationshipSchema, RelationshipView};
use crate::spec::{build_specs, impl_spec_eq, specs_to_param, BuildContext, ParamReader, Spec, SpecMap};
use crate::table::RelationshipTable;
use crate::value::{ClassRef, ParamMap, ParamValue};

pub static PARAMS: &[ParamDef] = &[
    ParamDef::new("name", ValueKind::Str).required(),
    ParamDef::new("zProperties", ValueKind::Specs(SpecKind::ZProperty)),
    ParamDef::new("classes", ValueKind::Specs(SpecKind::Class)),
    ParamDef::new("class_relationships", ValueKind::RelationshipSchemaList).block_style(),
    ParamDef::new("device_classes", ValueKind::Specs(SpecKind::DeviceClass)),
];

/// External base classes that make a class a device.
pub const DEVICE_BASES: &[&str] = &["zenpacklib.Device", "Products.ZenModel.Device.Device"];

/// External base classes that make a class a component.
pub const COMPONENT_BASES: &[&str] = &[
    "zenpacklib.Component",
    "zenpacklib.HardwareComponent",
    "Products.ZenModel.DeviceComponent.DeviceComponent",
    "Products.ZenModel.HardwareComponent.HardwareComponent",
];

/// External base classes that make a class a hardware component.
pub const HARDWARE_COMPONENT_BASES: &[&str] = &[
    "zenpacklib.HardwareComponent",
    "Products.ZenModel.HardwareComponent.HardwareComponent",
];

/// A complete specification.
#[derive(Debug, Clone)]
pub struct ZenPackSpec {
    name: String,
    z_properties: SpecMap<ZPropertySpec>,
    classes: SpecMap<ClassSpec>,
    class_relationships: Vec<RelationshipSchema>,
    device_classes: SpecMap<DeviceClassSpec>,
    relationships: RelationshipTable,
}

impl_spec_eq!(ZenPackSpec);

impl ZenPackSpec {
    /// Build a specification from its top-level parameters.
    ///
    /// # Errors
    ///
    /// As for [`Spec::from_params`].
    pub fn build(ctx: &mut BuildContext<'_>, params: ParamMap) -> Result<Self, Diagnostic> {
        Self::from_params(ctx, "", "", params)
    }

    /// The namespace of the specification (`ZenPacks.example.Name`).
    pub fn namespace(&self) -> &str {
        &self.name
    }

    pub fn z_properties(&self) -> &SpecMap<ZPropertySpec> {
        &self.z_properties
    }

    pub fn classes(&self) -> &SpecMap<ClassSpec> {
        &self.classes
    }

    /// Classes sorted by their display order, ties in declaration order.
    pub fn ordered_classes(&self) -> Vec<&ClassSpec> {
        let mut ordered: Vec<_> = self.defined_classes().collect();
        ordered.sort_by(|a, b| a.order().total_cmp(&b.order()));
        ordered
    }

    /// Resolved relationship schemas, in declaration order.
    pub fn class_relationships(&self) -> &[RelationshipSchema] {
        &self.class_relationships
    }

    pub fn device_classes(&self) -> &SpecMap<DeviceClassSpec> {
        &self.device_classes
    }

    /// The side table linking relationships to classes.
    pub fn relationship_table(&self) -> &RelationshipTable {
        &self.relationships
    }

    /// Relationship `relation_name` as seen from `class`.
    pub fn relationship(&self, class: &str, relation_name: &str) -> Option<&RelationshipView> {
        self.relationships.get(class, relation_name)
    }

    /// Relationships attached to classes outside this specification, by
    /// qualified class name.
    pub fn external_relations(&self) -> &IndexMap<String, Vec<RelationshipView>> {
        self.relationships.external()
    }

    /// The fully-qualified name of a class token.
    pub fn qualified_class(&self, class: &str) -> String {
        ClassRef::parse(class).qualified(&self.name)
    }

    fn defined_classes(&self) -> impl Iterator<Item = &ClassSpec> {
        self.classes
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULTS_KEY)
            .map(|(_, class)| class)
    }

    /// Local base classes of `class`, in declared order. With `recursive`,
    /// each base is followed by its own bases, depth-first; a class reached
    /// twice is listed once.
    pub fn base_class_specs(&self, class: &str, recursive: bool) -> Vec<&ClassSpec> {
        let mut found = Vec::new();
        let mut seen = HashSet::from([class.to_string()]);
        self.collect_bases(class, recursive, &mut seen, &mut found);
        found
    }

    fn collect_bases<'s>(
        &'s self,
        class: &str,
        recursive: bool,
        seen: &mut HashSet<String>,
        found: &mut Vec<&'s ClassSpec>,
    ) {
        let Some(spec) = self.classes.get(class) else {
            return;
        };
        for base in spec.bases() {
            let ClassRef::Local(base) = base else {
                continue;
            };
            let Some(base_spec) = self.classes.get(base) else {
                continue;
            };
            if !seen.insert(base.clone()) {
                continue;
            }
            found.push(base_spec);
            if recursive {
                self.collect_bases(base, true, seen, found);
            }
        }
    }

    /// Classes that have `class` among their bases, directly or not.
    pub fn subclass_specs(&self, class: &str) -> Vec<&ClassSpec> {
        self.defined_classes()
            .filter(|spec| {
                self.base_class_specs(spec.name(), true)
                    .iter()
                    .any(|base| base.name() == class)
            })
            .collect()
    }

    /// Properties of `class` including those of its local bases. Bases are
    /// applied depth-first in declared order; the class's own properties
    /// are applied last and win.
    pub fn inherited_properties(&self, class: &str) -> IndexMap<String, &ClassPropertySpec> {
        let mut merged = IndexMap::new();
        self.overlay_lineage(class, &mut HashSet::new(), &mut |spec| {
            for (name, property) in spec.properties() {
                merged.insert(name.clone(), property);
            }
        });
        merged
    }

    /// Relationship display settings of `class` including those of its local
    /// bases, merged as for [`inherited_properties`](Self::inherited_properties).
    pub fn inherited_relationships(
        &self,
        class: &str,
    ) -> IndexMap<String, &ClassRelationshipSpec> {
        let mut merged = IndexMap::new();
        self.overlay_lineage(class, &mut HashSet::new(), &mut |spec| {
            for (name, relationship) in spec.relationships() {
                merged.insert(name.clone(), relationship);
            }
        });
        merged
    }

    /// Relationships of `class` and of its local bases.
    pub fn inherited_relationship_views(&self, class: &str) -> Vec<&RelationshipView> {
        let mut lineage = vec![class];
        lineage.extend(
            self.base_class_specs(class, true)
                .into_iter()
                .map(|spec| spec.name()),
        );
        lineage
            .into_iter()
            .flat_map(|c| self.relationships.of_class(c))
            .collect()
    }

    fn overlay_lineage<'s>(
        &'s self,
        class: &str,
        seen: &mut HashSet<String>,
        apply: &mut dyn FnMut(&'s ClassSpec),
    ) {
        if !seen.insert(class.to_string()) {
            return;
        }
        let Some(spec) = self.classes.get(class) else {
            return;
        };
        for base in spec.bases() {
            if let ClassRef::Local(base) = base {
                self.overlay_lineage(base, seen, apply);
            }
        }
        apply(spec);
    }

    /// External base class tokens of `class` and of all its local bases.
    fn external_bases(&self, class: &str) -> Vec<&str> {
        let mut lineage: Vec<&ClassSpec> = self.classes.get(class).into_iter().collect();
        lineage.extend(self.base_class_specs(class, true));
        lineage
            .into_iter()
            .flat_map(|spec| spec.bases())
            .filter(|base| !base.is_local())
            .map(ClassRef::as_str)
            .collect()
    }

    /// Returns true if `class` is `token` or derives from it. `token` is a
    /// local class name or a qualified external class.
    pub fn is_a(&self, class: &str, token: &str) -> bool {
        class == token
            || self
                .base_class_specs(class, true)
                .iter()
                .any(|base| base.name() == token)
            || self.external_bases(class).contains(&token)
    }

    fn is_any(&self, class: &str, tokens: &[&str]) -> bool {
        tokens.iter().any(|token| self.is_a(class, token))
    }

    pub fn is_device(&self, class: &str) -> bool {
        self.is_any(class, DEVICE_BASES)
    }

    pub fn is_component(&self, class: &str) -> bool {
        self.is_any(class, COMPONENT_BASES)
    }

    pub fn is_hardware_component(&self, class: &str) -> bool {
        self.is_any(class, HARDWARE_COMPONENT_BASES)
    }
}

impl Spec for ZenPackSpec {
    const KIND: SpecKind = SpecKind::ZenPack;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("name", self.name.clone().into());
        params.insert("zProperties", specs_to_param(&self.z_properties));
        params.insert("classes", specs_to_param(&self.classes));
        params.insert(
            "class_relationships",
            ParamValue::RelationshipList(
                self.class_relationships
                    .iter()
                    .map(RelationshipSchema::to_decl)
                    .collect(),
            ),
        );
        params.insert("device_classes", specs_to_param(&self.device_classes));
        params
    }

    fn from_params(
        ctx: &mut BuildContext<'_>,
        _parent: &str,
        _name: &str,
        params: ParamMap,
    ) -> Result<Self, Diagnostic> {
        let mut reader = ParamReader::new(Self::KIND, params).map_err(|e| ctx.error(e))?;
        let read = |r: &mut ParamReader| -> Result<_, SpecError> {
            Ok((
                r.string("name")?,
                r.specs("zProperties", SpecKind::ZProperty)?,
                r.specs("classes", SpecKind::Class)?,
                r.relationships("class_relationships")?,
                r.specs("device_classes", SpecKind::DeviceClass)?,
            ))
        };
        let (name, z_properties, classes, decls, device_classes) =
            read(&mut reader).map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;
        ctx.set_namespace(name.clone());
        tracing::debug!(zenpack = %name, classes = classes.len(), "building specification");

        let z_properties = build_specs(ctx, &name, "zProperties", z_properties)?;
        let classes = build_specs(ctx, &name, "classes", classes)?;
        let device_classes = build_specs(ctx, &name, "device_classes", device_classes)?;

        let namespace = name.clone();
        let class_relationships = ctx.within("class_relationships", |ctx| {
            decls
                .iter()
                .enumerate()
                .map(|(i, decl)| {
                    decl.resolve(&namespace)
                        .map_err(|e| ctx.within(i.to_string(), |ctx| ctx.error(e)))
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        let relationships = RelationshipTable::build(ctx, &classes, &class_relationships)?;

        Ok(Self {
            name,
            z_properties,
            classes,
            class_relationships,
            device_classes,
            relationships,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::parse_relationship;
    use crate::value::SpecParams;
    use zpl_core::{Diagnostics, Mode, RelationKind};

    const NS: &str = "ZenPacks.test.Pods";

    fn class(bases: &[&str]) -> ParamMap {
        let mut params = ParamMap::new();
        if !bases.is_empty() {
            params.insert(
                "base",
                ParamValue::ClassRefList(bases.iter().map(|b| ClassRef::parse(b)).collect()),
            );
        }
        params
    }

    fn zenpack(classes: &[(&str, ParamMap)], rels: &[&str]) -> ParamMap {
        let classes: SpecParams = classes
            .iter()
            .map(|(name, params)| (name.to_string(), params.clone()))
            .collect();
        let mut params = ParamMap::new();
        params.insert("name", NS.into());
        params.insert("classes", ParamValue::Specs(SpecKind::Class, classes));
        params.insert(
            "class_relationships",
            ParamValue::RelationshipList(
                rels.iter().map(|r| parse_relationship(r).unwrap()).collect(),
            ),
        );
        params
    }

    fn build(params: ParamMap, mode: Mode) -> (Result<ZenPackSpec, Diagnostic>, Diagnostics) {
        let mut diags = Diagnostics::new(mode);
        let mut ctx = BuildContext::new(&mut diags, "pods.yaml");
        let result = ZenPackSpec::build(&mut ctx, params);
        (result, diags)
    }

    #[test]
    fn containment_links_both_classes() {
        let params = zenpack(
            &[("Pod", class(&["zenpacklib.Device"])), ("Fan", class(&[]))],
            &["[Pod]++-[Fan]"],
        );
        let (zp, diags) = build(params, Mode::Strict);
        let zp = zp.unwrap();
        assert!(diags.is_empty());

        let fans = zp.relationship("Pod", "fans").unwrap();
        assert_eq!(fans.kind, RelationKind::MultiOwning);
        assert_eq!(fans.remote_qualified_class, "ZenPacks.test.Pods.Fan");
        let pod = zp.relationship("Fan", "pod").unwrap();
        assert_eq!(pod.kind, RelationKind::Single);
        assert!(pod.is_contained());
        assert_eq!(&fans.mirror(), pod);
    }

    #[test]
    fn external_endpoints_are_collected() {
        let params = zenpack(
            &[("Pod", class(&[]))],
            &["Products.ZenModel.Device.Device(pods) 1:MC Pod"],
        );
        let (zp, _) = build(params, Mode::Strict);
        let zp = zp.unwrap();
        let external = &zp.external_relations()["Products.ZenModel.Device.Device"];
        assert_eq!(external[0].relation_name, "pods");
        assert_eq!(
            zp.relationship("Pod", "products_zenmodel_device_device")
                .unwrap()
                .remote_class,
            "Products.ZenModel.Device.Device"
        );
    }

    #[test]
    fn namespace_qualified_names_count_as_local() {
        let params = zenpack(
            &[("Pod", class(&[])), ("Fan", class(&[]))],
            &["ZenPacks.test.Pods.Pod(fans) 1:MC Fan"],
        );
        let (zp, _) = build(params, Mode::Strict);
        let zp = zp.unwrap();
        assert!(zp.relationship("Pod", "fans").is_some());
        assert!(zp.external_relations().is_empty());
    }

    #[test]
    fn undefined_local_class_is_a_warning() {
        let params = zenpack(&[("Pod", class(&[]))], &["Pod 1:MC Fan"]);
        let (zp, diags) = build(params, Mode::Strict);
        let zp = zp.unwrap();
        assert!(zp.relationship("Pod", "fans").is_some());
        assert_eq!(diags.warnings().count(), 1);
        assert!(!diags.has_errors());
    }

    #[test]
    fn duplicate_relation_name_is_fatal() {
        let params = zenpack(
            &[("Pod", class(&[])), ("Fan", class(&[])), ("Tray", class(&[]))],
            &["Pod(things) 1:MC Fan", "Pod(things) 1:MC Tray"],
        );
        let (result, _) = build(params, Mode::Lenient);
        let err = result.unwrap_err();
        assert_eq!(err.error.code(), "construction");
        assert_eq!(err.location.pointer(), "/class_relationships/1");
    }

    #[test]
    fn invalid_declared_orientation_is_fatal() {
        use crate::relationship::{RelationshipDecl, RelationshipEndpoint};
        let mut params = zenpack(&[("Pod", class(&[])), ("Fan", class(&[]))], &[]);
        params.insert(
            "class_relationships",
            ParamValue::RelationshipList(vec![RelationshipDecl::new(
                RelationshipEndpoint::new("Fan", None, RelationKind::Single),
                RelationshipEndpoint::new("Pod", None, RelationKind::MultiOwning),
            )]),
        );
        let (result, _) = build(params, Mode::Lenient);
        assert_eq!(result.unwrap_err().error.code(), "orientation");
    }

    #[test]
    fn missing_name_is_a_construction_error() {
        let (result, _) = build(ParamMap::new(), Mode::Lenient);
        assert_eq!(result.unwrap_err().error.code(), "construction");
    }

    #[test]
    fn class_hierarchy_queries() {
        let mut base = class(&["zenpacklib.HardwareComponent"]);
        let mut props = SpecParams::new();
        props.insert("serial".to_string(), ParamMap::new());
        props.insert("status".to_string(), ParamMap::new());
        base.insert("properties", ParamValue::Specs(SpecKind::ClassProperty, props));

        let mut fan = class(&["Module"]);
        let mut props = SpecParams::new();
        let mut status = ParamMap::new();
        status.insert("label", "Fan Status".into());
        props.insert("status".to_string(), status);
        props.insert("rpm".to_string(), ParamMap::new());
        fan.insert("properties", ParamValue::Specs(SpecKind::ClassProperty, props));

        let params = zenpack(
            &[
                ("Module", base),
                ("Fan", fan),
                ("BigFan", class(&["Fan"])),
                ("Pod", class(&["zenpacklib.Device"])),
            ],
            &[],
        );
        let (zp, _) = build(params, Mode::Strict);
        let zp = zp.unwrap();

        let bases: Vec<_> = zp.base_class_specs("BigFan", true).into_iter().map(|c| c.name()).collect();
        assert_eq!(bases, ["Fan", "Module"]);
        let direct: Vec<_> = zp.base_class_specs("BigFan", false).into_iter().map(|c| c.name()).collect();
        assert_eq!(direct, ["Fan"]);

        let subs: Vec<_> = zp.subclass_specs("Module").into_iter().map(|c| c.name()).collect();
        assert_eq!(subs, ["Fan", "BigFan"]);

        let props = zp.inherited_properties("BigFan");
        assert_eq!(props.keys().collect::<Vec<_>>(), ["serial", "status", "rpm"]);
        assert_eq!(props["status"].label(), "Fan Status");

        assert!(zp.is_component("BigFan"));
        assert!(zp.is_hardware_component("BigFan"));
        assert!(!zp.is_device("BigFan"));
        assert!(zp.is_device("Pod"));
        assert!(zp.is_a("BigFan", "Module"));
    }

    #[test]
    fn inherited_relationship_views_walk_local_bases() {
        let params = zenpack(
            &[
                ("Pod", class(&["zenpacklib.Device"])),
                ("Module", class(&[])),
                ("Fan", class(&["Module"])),
            ],
            &["Pod 1:MC Module", "Pod(spares) 1:M (spare_for)Fan"],
        );
        let (zp, _) = build(params, Mode::Strict);
        let zp = zp.unwrap();

        let own: Vec<_> = zp
            .relationship_table()
            .of_class("Fan")
            .map(|v| v.relation_name.as_str())
            .collect();
        assert_eq!(own, ["spare_for"]);

        let views: Vec<_> = zp
            .inherited_relationship_views("Fan")
            .into_iter()
            .map(|v| format!("{}.{}", v.class_name, v.relation_name))
            .collect();
        assert_eq!(views, ["Fan.spare_for", "Module.pod"]);
    }

    #[test]
    fn base_cycles_terminate() {
        let params = zenpack(&[("A", class(&["B"])), ("B", class(&["A"]))], &[]);
        let (zp, _) = build(params, Mode::Strict);
        let zp = zp.unwrap();
        let bases: Vec<_> = zp.base_class_specs("A", true).into_iter().map(|c| c.name()).collect();
        assert_eq!(bases, ["B"]);
        assert!(zp.inherited_properties("A").is_empty());
    }

    #[test]
    fn unknown_base_and_unmatched_relationship_warn() {
        let mut pod = class(&["Chassis"]);
        let mut rels = SpecParams::new();
        rels.insert("trays".to_string(), ParamMap::new());
        pod.insert("relationships", ParamValue::Specs(SpecKind::ClassRelationship, rels));
        let params = zenpack(&[("Pod", pod)], &[]);
        let (zp, diags) = build(params, Mode::Strict);
        assert!(zp.is_ok());
        let pointers: Vec<_> = diags.warnings().map(|d| d.location.pointer()).collect();
        assert_eq!(pointers, ["/classes/Pod", "/classes/Pod/relationships/trays"]);
    }

    #[test]
    fn ordered_classes_sort_by_order() {
        let mut late = class(&[]);
        late.insert("order", ParamValue::Float(90.0));
        let mut early = class(&[]);
        early.insert("order", ParamValue::Float(10.0));
        let params = zenpack(&[("Late", late), ("Plain", class(&[])), ("Early", early)], &[]);
        let (zp, _) = build(params, Mode::Strict);
        let zp = zp.unwrap();
        let names: Vec<_> = zp.ordered_classes().into_iter().map(|c| c.name()).collect();
        assert_eq!(names, ["Early", "Plain", "Late"]);
    }
}
