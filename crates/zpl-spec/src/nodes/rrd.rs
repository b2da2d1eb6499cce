//! Monitoring templates and their thresholds, datasources and datapoints.
//!
//! A datapoint may be written as a single scalar instead of a mapping:
//! `GAUGE`, `DERIVE_MIN_0`, `COUNTER_MIN_0_MAX_100`.

use std::sync::OnceLock;

use regex::Regex;
use zpl_core::{Diagnostic, Severity, SpecError};

use crate::kind::SpecKind;
use crate::nodes::graph::GraphDefinitionSpec;
use crate::params::{ParamDef, ParamDefault, ValueKind};
use crate::spec::{
    build_specs, impl_spec_eq, specs_to_param, BuildContext, ParamReader, Spec, SpecMap,
};
use crate::value::{ParamMap, ParamValue};

pub static TEMPLATE_PARAMS: &[ParamDef] = &[
    ParamDef::new("description", ValueKind::Str),
    ParamDef::new("targetPythonClass", ValueKind::Str),
    ParamDef::new("thresholds", ValueKind::Specs(SpecKind::RrdThreshold)),
    ParamDef::new("datasources", ValueKind::Specs(SpecKind::RrdDatasource)),
    ParamDef::new("graphs", ValueKind::Specs(SpecKind::GraphDefinition)),
];

pub static THRESHOLD_PARAMS: &[ParamDef] = &[
    ParamDef::new("type_", ValueKind::Str)
        .renamed("type")
        .with_default(ParamDefault::Str("MinMaxThreshold")),
    ParamDef::new("dsnames", ValueKind::StrList),
    ParamDef::new("minval", ValueKind::Str),
    ParamDef::new("maxval", ValueKind::Str),
    ParamDef::new("eventClass", ValueKind::Str),
    ParamDef::new("severity", ValueKind::Severity),
    ParamDef::new("escalateCount", ValueKind::Int),
    ParamDef::new("enabled", ValueKind::Bool),
];

pub static DATASOURCE_PARAMS: &[ParamDef] = &[
    ParamDef::new("sourcetype", ValueKind::Str).renamed("type"),
    ParamDef::new("enabled", ValueKind::Bool),
    ParamDef::new("component", ValueKind::Str),
    ParamDef::new("eventClass", ValueKind::Str),
    ParamDef::new("eventKey", ValueKind::Str),
    ParamDef::new("severity", ValueKind::Severity),
    ParamDef::new("commandTemplate", ValueKind::Str),
    ParamDef::new("cycletime", ValueKind::Int),
    ParamDef::new("datapoints", ValueKind::Specs(SpecKind::RrdDatapoint)),
];

pub static DATAPOINT_PARAMS: &[ParamDef] = &[
    ParamDef::new("rrdtype", ValueKind::Str),
    ParamDef::new("createCmd", ValueKind::Str),
    ParamDef::new("isrow", ValueKind::Bool),
    ParamDef::new("rrdmin", ValueKind::Str),
    ParamDef::new("rrdmax", ValueKind::Str),
    ParamDef::new("description", ValueKind::Str),
];

fn shorthand_pattern() -> Result<&'static Regex, SpecError> {
    static CELL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    CELL.get_or_init(|| {
        Regex::new(r"^(?P<rrdtype>[A-Z]+)(?:_MIN_(?P<min>-?\d+(?:\.\d+)?|U))?(?:_MAX_(?P<max>-?\d+(?:\.\d+)?|U))?$")
    })
    .as_ref()
    .map_err(|e| SpecError::Configuration {
        spec_type: SpecKind::RrdDatapoint.as_str(),
        reason: e.to_string(),
    })
}

/// Expand datapoint shorthand (`DERIVE_MIN_0_MAX_100`) into parameters.
///
/// # Errors
///
/// [`SpecError::TypeCoercion`] if the text is not valid shorthand.
pub fn datapoint_from_shorthand(text: &str) -> Result<ParamMap, SpecError> {
    let caps = shorthand_pattern()?
        .captures(text.trim())
        .ok_or_else(|| SpecError::TypeCoercion {
            spec_type: SpecKind::RrdDatapoint.as_str(),
            param: "shorthand".to_string(),
            expected: "TYPE, TYPE_MIN_n, TYPE_MAX_n or TYPE_MIN_n_MAX_n".to_string(),
            value: format!("'{text}'"),
        })?;
    let mut params = ParamMap::new();
    for (group, param) in [("rrdtype", "rrdtype"), ("min", "rrdmin"), ("max", "rrdmax")] {
        if let Some(m) = caps.name(group) {
            params.insert(param, ParamValue::from(m.as_str()));
        }
    }
    Ok(params)
}

/// A monitoring template.
#[derive(Debug, Clone)]
pub struct RrdTemplateSpec {
    device_class: String,
    name: String,
    description: Option<String>,
    target_python_class: Option<String>,
    thresholds: SpecMap<RrdThresholdSpec>,
    datasources: SpecMap<RrdDatasourceSpec>,
    graphs: SpecMap<GraphDefinitionSpec>,
}

impl_spec_eq!(RrdTemplateSpec);

impl RrdTemplateSpec {
    /// Name of the device class the template is bound to.
    pub fn device_class(&self) -> &str {
        &self.device_class
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn target_python_class(&self) -> Option<&str> {
        self.target_python_class.as_deref()
    }

    pub fn thresholds(&self) -> &SpecMap<RrdThresholdSpec> {
        &self.thresholds
    }

    pub fn datasources(&self) -> &SpecMap<RrdDatasourceSpec> {
        &self.datasources
    }

    pub fn graphs(&self) -> &SpecMap<GraphDefinitionSpec> {
        &self.graphs
    }
}

impl Spec for RrdTemplateSpec {
    const KIND: SpecKind = SpecKind::RrdTemplate;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("description", self.description.clone().into());
        params.insert("targetPythonClass", self.target_python_class.clone().into());
        params.insert("thresholds", specs_to_param(&self.thresholds));
        params.insert("datasources", specs_to_param(&self.datasources));
        params.insert("graphs", specs_to_param(&self.graphs));
        params
    }

    fn from_params(
        ctx: &mut BuildContext<'_>,
        parent: &str,
        name: &str,
        params: ParamMap,
    ) -> Result<Self, Diagnostic> {
        let mut reader = ParamReader::new(Self::KIND, params).map_err(|e| ctx.error(e))?;
        let read = |r: &mut ParamReader| -> Result<_, SpecError> {
            Ok((
                r.opt_string("description")?,
                r.opt_string("targetPythonClass")?,
                r.specs("thresholds", SpecKind::RrdThreshold)?,
                r.specs("datasources", SpecKind::RrdDatasource)?,
                r.specs("graphs", SpecKind::GraphDefinition)?,
            ))
        };
        let (description, target_python_class, thresholds, datasources, graphs) =
            read(&mut reader).map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;

        Ok(Self {
            device_class: parent.to_string(),
            name: name.to_string(),
            description,
            target_python_class,
            thresholds: build_specs(ctx, name, "thresholds", thresholds)?,
            datasources: build_specs(ctx, name, "datasources", datasources)?,
            graphs: build_specs(ctx, name, "graphs", graphs)?,
        })
    }
}

/// A threshold on one or more datapoints.
#[derive(Debug, Clone)]
pub struct RrdThresholdSpec {
    template: String,
    name: String,
    type_: String,
    dsnames: Vec<String>,
    minval: Option<String>,
    maxval: Option<String>,
    event_class: Option<String>,
    severity: Option<Severity>,
    escalate_count: Option<i64>,
    enabled: Option<bool>,
}

impl_spec_eq!(RrdThresholdSpec);

impl RrdThresholdSpec {
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Threshold class, `MinMaxThreshold` unless given.
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// Datapoints the threshold applies to, as `datasource_datapoint`.
    pub fn dsnames(&self) -> &[String] {
        &self.dsnames
    }

    pub fn minval(&self) -> Option<&str> {
        self.minval.as_deref()
    }

    pub fn maxval(&self) -> Option<&str> {
        self.maxval.as_deref()
    }

    pub fn event_class(&self) -> Option<&str> {
        self.event_class.as_deref()
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    pub fn escalate_count(&self) -> Option<i64> {
        self.escalate_count
    }

    pub fn enabled(&self) -> Option<bool> {
        self.enabled
    }
}

impl Spec for RrdThresholdSpec {
    const KIND: SpecKind = SpecKind::RrdThreshold;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("type_", self.type_.clone().into());
        params.insert("dsnames", self.dsnames.clone().into());
        params.insert("minval", self.minval.clone().into());
        params.insert("maxval", self.maxval.clone().into());
        params.insert("eventClass", self.event_class.clone().into());
        params.insert("severity", self.severity.into());
        params.insert("escalateCount", self.escalate_count.into());
        params.insert("enabled", self.enabled.into());
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
                template: parent.to_string(),
                name: name.to_string(),
                type_: r.string("type_")?,
                dsnames: r.str_list("dsnames")?,
                minval: r.opt_string("minval")?,
                maxval: r.opt_string("maxval")?,
                event_class: r.opt_string("eventClass")?,
                severity: r.opt_severity("severity")?,
                escalate_count: r.opt_int("escalateCount")?,
                enabled: r.opt_bool("enabled")?,
            })
        };
        let spec = read(&mut reader).map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;
        Ok(spec)
    }
}

/// A datasource and its datapoints.
#[derive(Debug, Clone)]
pub struct RrdDatasourceSpec {
    template: String,
    name: String,
    sourcetype: Option<String>,
    enabled: Option<bool>,
    component: Option<String>,
    event_class: Option<String>,
    event_key: Option<String>,
    severity: Option<Severity>,
    command_template: Option<String>,
    cycletime: Option<i64>,
    datapoints: SpecMap<RrdDatapointSpec>,
}

impl_spec_eq!(RrdDatasourceSpec);

impl RrdDatasourceSpec {
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Datasource type (`COMMAND`, `SNMP`, ...), written as `type`.
    pub fn sourcetype(&self) -> Option<&str> {
        self.sourcetype.as_deref()
    }

    pub fn enabled(&self) -> Option<bool> {
        self.enabled
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    pub fn event_class(&self) -> Option<&str> {
        self.event_class.as_deref()
    }

    pub fn event_key(&self) -> Option<&str> {
        self.event_key.as_deref()
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    pub fn command_template(&self) -> Option<&str> {
        self.command_template.as_deref()
    }

    /// Collection interval in seconds.
    pub fn cycletime(&self) -> Option<i64> {
        self.cycletime
    }

    pub fn datapoints(&self) -> &SpecMap<RrdDatapointSpec> {
        &self.datapoints
    }
}

impl Spec for RrdDatasourceSpec {
    const KIND: SpecKind = SpecKind::RrdDatasource;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("sourcetype", self.sourcetype.clone().into());
        params.insert("enabled", self.enabled.into());
        params.insert("component", self.component.clone().into());
        params.insert("eventClass", self.event_class.clone().into());
        params.insert("eventKey", self.event_key.clone().into());
        params.insert("severity", self.severity.into());
        params.insert("commandTemplate", self.command_template.clone().into());
        params.insert("cycletime", self.cycletime.into());
        params.insert("datapoints", specs_to_param(&self.datapoints));
        params
    }

    fn from_params(
        ctx: &mut BuildContext<'_>,
        parent: &str,
        name: &str,
        params: ParamMap,
    ) -> Result<Self, Diagnostic> {
        let mut reader = ParamReader::new(Self::KIND, params).map_err(|e| ctx.error(e))?;
        let read = |r: &mut ParamReader| -> Result<_, SpecError> {
            let spec = Self {
                template: parent.to_string(),
                name: name.to_string(),
                sourcetype: r.opt_string("sourcetype")?,
                enabled: r.opt_bool("enabled")?,
                component: r.opt_string("component")?,
                event_class: r.opt_string("eventClass")?,
                event_key: r.opt_string("eventKey")?,
                severity: r.opt_severity("severity")?,
                command_template: r.opt_string("commandTemplate")?,
                cycletime: r.opt_int("cycletime")?,
                datapoints: SpecMap::new(),
            };
            Ok((spec, r.specs("datapoints", SpecKind::RrdDatapoint)?))
        };
        let (mut spec, datapoints) = read(&mut reader).map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;
        spec.datapoints = build_specs(ctx, name, "datapoints", datapoints)?;
        Ok(spec)
    }
}

/// One datapoint of a datasource.
#[derive(Debug, Clone)]
pub struct RrdDatapointSpec {
    datasource: String,
    name: String,
    rrdtype: Option<String>,
    create_cmd: Option<String>,
    isrow: Option<bool>,
    rrdmin: Option<String>,
    rrdmax: Option<String>,
    description: Option<String>,
}

impl_spec_eq!(RrdDatapointSpec);

impl RrdDatapointSpec {
    pub fn datasource(&self) -> &str {
        &self.datasource
    }

    /// `GAUGE`, `DERIVE`, `COUNTER` or `ABSOLUTE`.
    pub fn rrdtype(&self) -> Option<&str> {
        self.rrdtype.as_deref()
    }

    pub fn create_cmd(&self) -> Option<&str> {
        self.create_cmd.as_deref()
    }

    pub fn isrow(&self) -> Option<bool> {
        self.isrow
    }

    pub fn rrdmin(&self) -> Option<&str> {
        self.rrdmin.as_deref()
    }

    pub fn rrdmax(&self) -> Option<&str> {
        self.rrdmax.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Spec for RrdDatapointSpec {
    const KIND: SpecKind = SpecKind::RrdDatapoint;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("rrdtype", self.rrdtype.clone().into());
        params.insert("createCmd", self.create_cmd.clone().into());
        params.insert("isrow", self.isrow.into());
        params.insert("rrdmin", self.rrdmin.clone().into());
        params.insert("rrdmax", self.rrdmax.clone().into());
        params.insert("description", self.description.clone().into());
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
                datasource: parent.to_string(),
                name: name.to_string(),
                rrdtype: r.opt_string("rrdtype")?,
                create_cmd: r.opt_string("createCmd")?,
                isrow: r.opt_bool("isrow")?,
                rrdmin: r.opt_string("rrdmin")?,
                rrdmax: r.opt_string("rrdmax")?,
                description: r.opt_string("description")?,
            })
        };
        let spec = read(&mut reader).map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SpecParams;
    use zpl_core::{Diagnostics, Mode};

    #[test]
    fn shorthand_forms() {
        let p = datapoint_from_shorthand("GAUGE").unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(p["rrdtype"], ParamValue::from("GAUGE"));

        let p = datapoint_from_shorthand("DERIVE_MIN_0").unwrap();
        assert_eq!(p["rrdmin"], ParamValue::from("0"));
        assert!(!p.contains_key("rrdmax"));

        let p = datapoint_from_shorthand("COUNTER_MIN_0_MAX_100").unwrap();
        assert_eq!(p["rrdmax"], ParamValue::from("100"));

        let err = datapoint_from_shorthand("gauge please").unwrap_err();
        assert_eq!(err.code(), "type-coercion");
    }

    #[test]
    fn template_builds_nested_children_with_parent_names() {
        let mut datapoints = SpecParams::new();
        datapoints.insert(
            "temperature".to_string(),
            datapoint_from_shorthand("GAUGE_MIN_0").unwrap(),
        );
        let mut ds = ParamMap::new();
        ds.insert("sourcetype", "COMMAND".into());
        ds.insert("cycletime", ParamValue::Int(300));
        ds.insert("datapoints", ParamValue::Specs(SpecKind::RrdDatapoint, datapoints));
        let mut datasources = SpecParams::new();
        datasources.insert("fan".to_string(), ds);
        let mut tpl = ParamMap::new();
        tpl.insert("datasources", ParamValue::Specs(SpecKind::RrdDatasource, datasources));

        let mut diags = Diagnostics::new(Mode::Strict);
        let mut ctx = BuildContext::new(&mut diags, "t.yaml");
        let template = RrdTemplateSpec::from_params(&mut ctx, "/Server", "Fan", tpl).unwrap();
        let ds = &template.datasources()["fan"];
        assert_eq!(ds.template(), "Fan");
        assert_eq!(ds.cycletime(), Some(300));
        let dp = &ds.datapoints()["temperature"];
        assert_eq!(dp.datasource(), "fan");
        assert_eq!(dp.rrdtype(), Some("GAUGE"));
        assert_eq!(dp.rrdmin(), Some("0"));
    }

    #[test]
    fn threshold_defaults_and_severity() {
        let mut params = ParamMap::new();
        params.insert("dsnames", vec!["fan_temperature".to_string()].into());
        params.insert("severity", ParamValue::Int(4));
        let mut diags = Diagnostics::new(Mode::Strict);
        let mut ctx = BuildContext::new(&mut diags, "t.yaml");
        let th = RrdThresholdSpec::from_params(&mut ctx, "Fan", "hot", params).unwrap();
        assert_eq!(th.type_(), "MinMaxThreshold");
        assert_eq!(th.severity(), Some(Severity::Error));
        assert_eq!(th.dsnames(), ["fan_temperature"]);
    }
}
