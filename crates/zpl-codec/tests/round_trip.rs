//! # Round-Trip Tests
//!
//! A document exercising every node kind is compiled, written back out and
//! compiled again; the two trees must be equal. Written documents must not
//! carry values equal to their defaults.

use proptest::prelude::*;
use zpl_codec::{compile, decode, dump, encode, load_params, CompileOptions};
use zpl_core::{Diagnostics, Mode};
use zpl_spec::{
    parse_relationship, BuildContext, ClassPropertySpec, ParamValue, Spec, SpecKind, ZenPackSpec,
};

const WIDGETS: &str = "\
!ZenPackSpec
name: ZenPacks.acme.Widgets

zProperties:
  DEFAULTS:
    category: Widgets
  zWidgetPort:
    type: int
    default: 8080
  zWidgetRatio:
    type: float
    default: 1
  zWidgetHosts:
    type: lines
    default: [alpha, beta]
  zWidgetSecure:
    type: boolean

classes:
  DEFAULTS:
    base: [zenpacklib.Component]
  Rack:
    base: [zenpacklib.Device]
    label: Widget Rack
    dynamicview_relations:
      impacts: [widgets]
  Widget:
    base: [zenpacklib.HardwareComponent]
    order: 20
    monitoring_templates: [Widget, WidgetExtra]
    impacted_by: [rack]
    properties:
      DEFAULTS:
        grid_display: false
      serial:
        label: Serial Number
        index_type: field
      speed:
        type: int
        datapoint: speed_speed
        order: 10
      mode:
        enum: [auto, manual]
        api_backendtype: method
    relationships:
      rack:
        label: Parent Rack
        render_with_type: true
  Gadget:
    base: [Widget]
    filter_display: false

class_relationships:
  - Rack 1:MC Widget
  - Widget(gadgets) 1:M (owner)Gadget

device_classes:
  /Server/Widgets:
    remove: true
    zProperties:
      zPythonClass: ZenPacks.acme.Widgets.Rack
      zCollectorPlugins: [acme.Widgets]
    templates:
      Rack:
        description: Rack health
        targetPythonClass: ZenPacks.acme.Widgets.Rack
        thresholds:
          hot:
            dsnames: [temp_temp]
            maxval: '90'
            severity: crit
            eventClass: /Status/Heat
        datasources:
          temp:
            type: COMMAND
            cycletime: 60
            commandTemplate: widget-temp
            datapoints:
              temp: GAUGE_MIN_0_MAX_150
              fans:
                rrdtype: DERIVE
                description: Fan count
        graphs:
          Temperature:
            units: degrees C
            miny: 0
            graphpoints:
              Temperature:
                dpName: temp_temp
                format: '%5.1lf'
                includeThresholds: true
    component_templates:
      Widget:
        WidgetExtra:
          datasources:
            status:
              type: SNMP
              severity: 4
";

fn compile_strict(text: &str) -> ZenPackSpec {
    let mut diags = Diagnostics::new(Mode::Strict);
    let spec = compile("widgets.yaml", text, &mut diags, &CompileOptions::default()).unwrap();
    assert!(!diags.has_errors(), "{diags}");
    spec
}

#[test]
fn every_node_kind_round_trips() {
    let spec = compile_strict(WIDGETS);
    let written = dump(&spec).unwrap();
    let again = compile_strict(&written);
    assert_eq!(again, spec, "{written}");
}

#[test]
fn compiled_tree_has_every_node() {
    let spec = compile_strict(WIDGETS);

    let zprops = spec.z_properties();
    assert_eq!(zprops["zWidgetPort"].default(), &ParamValue::Int(8080));
    assert_eq!(zprops["zWidgetRatio"].default(), &ParamValue::Float(1.0));
    assert_eq!(zprops["zWidgetSecure"].effective_default(), ParamValue::Bool(false));
    assert_eq!(zprops["zWidgetHosts"].category(), Some("Widgets"));

    let widget = &spec.classes()["Widget"];
    assert!((widget.order() - 5.2).abs() < 1e-9);
    assert!(widget.properties()["speed"].api_only());
    assert!(!widget.properties()["serial"].grid_display());
    assert!(spec.is_component("Gadget"));
    assert!(spec.is_device("Rack"));
    assert_eq!(spec.relationship("Gadget", "owner").unwrap().remote_relation_name, "gadgets");

    let dc = &spec.device_classes()["/Server/Widgets"];
    assert!(dc.remove());
    let rack = &dc.templates()["Rack"];
    let temp = &rack.datasources()["temp"];
    assert_eq!(temp.sourcetype(), Some("COMMAND"));
    let points = temp.datapoints();
    assert_eq!(points["temp"].rrdtype(), Some("GAUGE"));
    assert_eq!(points["temp"].rrdmax(), Some("150"));
    assert_eq!(points["fans"].datasource(), "temp");
    let graph = &rack.graphs()["Temperature"];
    assert_eq!(graph.graphpoints()["Temperature"].graph(), "Temperature");
    let extra = &dc.component_templates()["Widget"]["WidgetExtra"];
    assert_eq!(extra.datasources()["status"].severity().map(|s| s.as_int()), Some(4));
}

#[test]
fn written_documents_omit_defaults() {
    let spec = compile_strict(WIDGETS);
    let written = dump(&spec).unwrap();
    for default in [
        "display: true",
        "create: true",
        "label_width: 80",
        "auto_expand_column: name",
        "api_backendtype: property",
        "type: MinMaxThreshold",
        "- zenpacklib.Component",
        "index_scope: device",
    ] {
        assert!(!written.contains(default), "{default} in\n{written}");
    }
    assert!(written.contains("grid_display: false"), "{written}");
    assert!(written.contains("Widget 1:M (owner)Gadget"), "{written}");
    assert!(written.contains("Rack 1:MC Widget"), "{written}");
}

#[test]
fn kept_defaults_round_trip() {
    let mut diags = Diagnostics::new(Mode::Strict);
    let spec = load_params("widgets.yaml", WIDGETS, &mut diags).unwrap();
    assert!(spec.classes().contains_key("DEFAULTS"));

    let written = dump(&spec).unwrap();
    assert!(written.contains("DEFAULTS"), "{written}");
    assert!(written.contains("category: Widgets"), "{written}");
    assert_eq!(written.matches("category: Widgets").count(), 1, "{written}");

    let mut diags = Diagnostics::new(Mode::Strict);
    let again = load_params("widgets.yaml", &written, &mut diags).unwrap();
    assert_eq!(again, spec);
}

#[test]
fn decoding_a_document_without_a_key_gives_its_default() {
    let mut diags = Diagnostics::new(Mode::Strict);
    let mut ctx = BuildContext::new(&mut diags, "p.yaml");
    let params = decode(SpecKind::ClassProperty, &serde_yaml::Value::Null, &mut ctx).unwrap();
    let prop = ClassPropertySpec::from_params(&mut ctx, "Widget", "serial", params).unwrap();
    assert!(prop.display());
    assert_eq!(prop.label_width(), 80);
    assert!(encode(SpecKind::ClassProperty, &prop.to_params(), None)
        .unwrap()
        .is_empty());
}

#[test]
fn notation_keeps_explicit_and_derives_default_names() {
    let explicit = parse_relationship("Pool(default_for_pools) 1:M (default_sr)SR")
        .unwrap()
        .resolve("ZenPacks.test.Storage")
        .unwrap();
    let reparsed = parse_relationship(&explicit.to_notation())
        .unwrap()
        .resolve("ZenPacks.test.Storage")
        .unwrap();
    assert_eq!(reparsed, explicit);

    let derived = parse_relationship("Pool(srs) 1:M (pool)SR")
        .unwrap()
        .resolve("ZenPacks.test.Storage")
        .unwrap();
    assert_eq!(derived.to_notation(), "Pool 1:M SR");
    let reparsed = parse_relationship(&derived.to_notation())
        .unwrap()
        .resolve("ZenPacks.test.Storage")
        .unwrap();
    assert_eq!(reparsed.left().relation_name, "srs");
    assert_eq!(reparsed.right().relation_name, "pool");
}

const TYPED_DEFAULTS: &str = "\
!ZenPackSpec
name: ZenPacks.acme.Probes

zProperties:
  DEFAULTS:
    type: boolean
    category: Probes
  zProbeSecure:
    default: true
  zProbeVerbose:
    default: 'no'
    category: null
  zProbePort:
    type: int
    default: 8080

classes:
  Probe:
    properties:
      DEFAULTS:
        type: int
      retries:
        default: 3
      timeout: {}
";

#[test]
fn types_from_defaults_survive_a_round_trip() {
    let spec = compile_strict(TYPED_DEFAULTS);
    let zprops = spec.z_properties();
    assert_eq!(zprops["zProbeSecure"].default(), &ParamValue::Bool(true));
    assert_eq!(zprops["zProbeVerbose"].default(), &ParamValue::Bool(false));
    assert_eq!(zprops["zProbeVerbose"].category(), None);
    assert_eq!(zprops["zProbePort"].default(), &ParamValue::Int(8080));
    let retries = &spec.classes()["Probe"].properties()["retries"];
    assert_eq!(retries.type_(), "int");
    assert_eq!(retries.default(), Some("3"));

    let written = dump(&spec).unwrap();
    assert_eq!(compile_strict(&written), spec, "{written}");
}

#[test]
fn kept_typed_defaults_round_trip() {
    let mut diags = Diagnostics::new(Mode::Strict);
    let kept = load_params("probes.yaml", TYPED_DEFAULTS, &mut diags).unwrap();
    let written = dump(&kept).unwrap();
    assert_eq!(written.matches("type: boolean").count(), 1, "{written}");
    assert_eq!(written.matches("type: int").count(), 2, "{written}");
    assert!(written.contains("category: null"), "{written}");

    let mut diags = Diagnostics::new(Mode::Strict);
    let again = load_params("probes.yaml", &written, &mut diags).unwrap();
    assert_eq!(again, kept, "{written}");
    assert_eq!(again.z_properties()["zProbeSecure"].default(), &ParamValue::Bool(true));
    assert_eq!(again.z_properties()["zProbeVerbose"].category(), None);
}

mod proptests {
    use super::*;

    fn label() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[A-Za-z][A-Za-z ]{0,12}")
    }

    proptest! {
        #[test]
        fn class_properties_round_trip(
            label in label(),
            display in any::<bool>(),
            grid_display in any::<bool>(),
            label_width in proptest::option::of(1i64..400),
            order in proptest::option::of(0u8..=100),
            enum_values in proptest::collection::vec("[a-z]{1,8}", 0..4),
        ) {
            let mut diags = Diagnostics::new(Mode::Strict);
            let mut ctx = BuildContext::new(&mut diags, "prop.yaml");
            let mut params = zpl_spec::ParamMap::new();
            params.insert("label", label.into());
            params.insert("display", display.into());
            params.insert("grid_display", grid_display.into());
            if let Some(width) = label_width {
                params.insert("label_width", width.into());
            }
            params.insert("order", order.map(f64::from).into());
            params.insert("enum", enum_values.into());
            let prop = ClassPropertySpec::from_params(&mut ctx, "Widget", "p", params).unwrap();

            let doc = serde_yaml::Value::Mapping(
                encode(SpecKind::ClassProperty, &prop.to_params(), None).unwrap(),
            );
            let text = serde_yaml::to_string(&doc).unwrap();
            let reread: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
            let decoded = decode(SpecKind::ClassProperty, &reread, &mut ctx).unwrap();
            let rebuilt = ClassPropertySpec::from_params(&mut ctx, "Widget", "p", decoded).unwrap();
            prop_assert_eq!(rebuilt, prop);
        }
    }
}
