//! Graph definitions of a monitoring template.

use zpl_core::{Diagnostic, SpecError};

use crate::kind::SpecKind;
use crate::params::{ParamDef, ParamDefault, ValueKind};
use crate::spec::{
    build_specs, impl_spec_eq, specs_to_param, BuildContext, ParamReader, Spec, SpecMap,
};
use crate::value::ParamMap;

pub static DEFINITION_PARAMS: &[ParamDef] = &[
    ParamDef::new("height", ValueKind::Int),
    ParamDef::new("width", ValueKind::Int),
    ParamDef::new("units", ValueKind::Str),
    ParamDef::new("log", ValueKind::Bool),
    ParamDef::new("base", ValueKind::Bool),
    ParamDef::new("miny", ValueKind::Int),
    ParamDef::new("maxy", ValueKind::Int),
    ParamDef::new("custom", ValueKind::Str),
    ParamDef::new("hasSummary", ValueKind::Bool),
    ParamDef::new("sequence", ValueKind::Int),
    ParamDef::new("graphpoints", ValueKind::Specs(SpecKind::GraphPoint)),
    ParamDef::new("comments", ValueKind::StrList),
];

pub static POINT_PARAMS: &[ParamDef] = &[
    ParamDef::new("dpName", ValueKind::Str),
    ParamDef::new("lineType", ValueKind::Str),
    ParamDef::new("lineWidth", ValueKind::Int),
    ParamDef::new("stacked", ValueKind::Bool),
    ParamDef::new("format", ValueKind::Str),
    ParamDef::new("legend", ValueKind::Str),
    ParamDef::new("limit", ValueKind::Int),
    ParamDef::new("rpn", ValueKind::Str),
    ParamDef::new("cFunc", ValueKind::Str),
    ParamDef::new("colorindex", ValueKind::Int),
    ParamDef::new("color", ValueKind::Str),
    ParamDef::new("includeThresholds", ValueKind::Bool).with_default(ParamDefault::Bool(false)),
];

#[derive(Debug, Clone)]
pub struct GraphDefinitionSpec {
    template: String,
    name: String,
    height: Option<i64>,
    width: Option<i64>,
    units: Option<String>,
    log: Option<bool>,
    base: Option<bool>,
    miny: Option<i64>,
    maxy: Option<i64>,
    custom: Option<String>,
    has_summary: Option<bool>,
    sequence: Option<i64>,
    graphpoints: SpecMap<GraphPointSpec>,
    comments: Vec<String>,
}

impl_spec_eq!(GraphDefinitionSpec);

impl GraphDefinitionSpec {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn height(&self) -> Option<i64> {
        self.height
    }

    pub fn width(&self) -> Option<i64> {
        self.width
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn log(&self) -> Option<bool> {
        self.log
    }

    /// Use base 1024 for unit prefixes.
    pub fn base(&self) -> Option<bool> {
        self.base
    }

    pub fn miny(&self) -> Option<i64> {
        self.miny
    }

    pub fn maxy(&self) -> Option<i64> {
        self.maxy
    }

    pub fn custom(&self) -> Option<&str> {
        self.custom.as_deref()
    }

    pub fn has_summary(&self) -> Option<bool> {
        self.has_summary
    }

    pub fn sequence(&self) -> Option<i64> {
        self.sequence
    }

    pub fn graphpoints(&self) -> &SpecMap<GraphPointSpec> {
        &self.graphpoints
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }
}

impl Spec for GraphDefinitionSpec {
    const KIND: SpecKind = SpecKind::GraphDefinition;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("height", self.height.into());
        params.insert("width", self.width.into());
        params.insert("units", self.units.clone().into());
        params.insert("log", self.log.into());
        params.insert("base", self.base.into());
        params.insert("miny", self.miny.into());
        params.insert("maxy", self.maxy.into());
        params.insert("custom", self.custom.clone().into());
        params.insert("hasSummary", self.has_summary.into());
        params.insert("sequence", self.sequence.into());
        params.insert("graphpoints", specs_to_param(&self.graphpoints));
        params.insert("comments", self.comments.clone().into());
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
                height: r.opt_int("height")?,
                width: r.opt_int("width")?,
                units: r.opt_string("units")?,
                log: r.opt_bool("log")?,
                base: r.opt_bool("base")?,
                miny: r.opt_int("miny")?,
                maxy: r.opt_int("maxy")?,
                custom: r.opt_string("custom")?,
                has_summary: r.opt_bool("hasSummary")?,
                sequence: r.opt_int("sequence")?,
                graphpoints: SpecMap::new(),
                comments: r.str_list("comments")?,
            };
            Ok((spec, r.specs("graphpoints", SpecKind::GraphPoint)?))
        };
        let (mut spec, graphpoints) = read(&mut reader).map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;
        spec.graphpoints = build_specs(ctx, name, "graphpoints", graphpoints)?;
        Ok(spec)
    }
}

#[derive(Debug, Clone)]
pub struct GraphPointSpec {
    graph: String,
    name: String,
    dp_name: Option<String>,
    line_type: Option<String>,
    line_width: Option<i64>,
    stacked: Option<bool>,
    format: Option<String>,
    legend: Option<String>,
    limit: Option<i64>,
    rpn: Option<String>,
    c_func: Option<String>,
    colorindex: Option<i64>,
    color: Option<String>,
    include_thresholds: bool,
}

impl_spec_eq!(GraphPointSpec);

impl GraphPointSpec {
    pub fn graph(&self) -> &str {
        &self.graph
    }

    /// Datapoint plotted, as `datasource_datapoint`.
    pub fn dp_name(&self) -> Option<&str> {
        self.dp_name.as_deref()
    }

    pub fn line_type(&self) -> Option<&str> {
        self.line_type.as_deref()
    }

    pub fn line_width(&self) -> Option<i64> {
        self.line_width
    }

    pub fn stacked(&self) -> Option<bool> {
        self.stacked
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn legend(&self) -> Option<&str> {
        self.legend.as_deref()
    }

    pub fn limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn rpn(&self) -> Option<&str> {
        self.rpn.as_deref()
    }

    pub fn c_func(&self) -> Option<&str> {
        self.c_func.as_deref()
    }

    pub fn colorindex(&self) -> Option<i64> {
        self.colorindex
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Also plot the thresholds on this datapoint.
    pub fn include_thresholds(&self) -> bool {
        self.include_thresholds
    }
}

impl Spec for GraphPointSpec {
    const KIND: SpecKind = SpecKind::GraphPoint;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("dpName", self.dp_name.clone().into());
        params.insert("lineType", self.line_type.clone().into());
        params.insert("lineWidth", self.line_width.into());
        params.insert("stacked", self.stacked.into());
        params.insert("format", self.format.clone().into());
        params.insert("legend", self.legend.clone().into());
        params.insert("limit", self.limit.into());
        params.insert("rpn", self.rpn.clone().into());
        params.insert("cFunc", self.c_func.clone().into());
        params.insert("colorindex", self.colorindex.into());
        params.insert("color", self.color.clone().into());
        params.insert("includeThresholds", self.include_thresholds.into());
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
                graph: parent.to_string(),
                name: name.to_string(),
                dp_name: r.opt_string("dpName")?,
                line_type: r.opt_string("lineType")?,
                line_width: r.opt_int("lineWidth")?,
                stacked: r.opt_bool("stacked")?,
                format: r.opt_string("format")?,
                legend: r.opt_string("legend")?,
                limit: r.opt_int("limit")?,
                rpn: r.opt_string("rpn")?,
                c_func: r.opt_string("cFunc")?,
                colorindex: r.opt_int("colorindex")?,
                color: r.opt_string("color")?,
                include_thresholds: r.bool("includeThresholds")?,
            })
        };
        let spec = read(&mut reader).map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;
        Ok(spec)
    }
}
