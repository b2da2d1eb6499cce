//! Device classes a specification creates or configures, with the
//! monitoring templates bound to them.

use indexmap::IndexMap;
use serde_yaml::Mapping;
use zpl_core::{Diagnostic, SpecError};

use crate::kind::SpecKind;
use crate::nodes::rrd::RrdTemplateSpec;
use crate::params::{ParamDef, ParamDefault, ValueKind};
use crate::spec::{
    build_specs, build_specs_dict, impl_spec_eq, specs_dict_to_param, specs_to_param,
    BuildContext, ParamReader, Spec, SpecMap,
};
use crate::value::ParamMap;

pub static PARAMS: &[ParamDef] = &[
    ParamDef::new("create", ValueKind::Bool).with_default(ParamDefault::Bool(true)),
    ParamDef::new("remove", ValueKind::Bool).with_default(ParamDefault::Bool(false)),
    ParamDef::new("zProperties", ValueKind::Dict),
    ParamDef::new("templates", ValueKind::Specs(SpecKind::RrdTemplate)),
    ParamDef::new(
        "component_templates",
        ValueKind::DictOfSpecs(SpecKind::RrdTemplate),
    ),
];

/// A device class, keyed by its path (`/Server/Linux`).
#[derive(Debug, Clone)]
pub struct DeviceClassSpec {
    zenpack: String,
    name: String,
    create: bool,
    remove: bool,
    z_properties: Mapping,
    templates: SpecMap<RrdTemplateSpec>,
    component_templates: IndexMap<String, SpecMap<RrdTemplateSpec>>,
}

impl_spec_eq!(DeviceClassSpec);

impl DeviceClassSpec {
    pub fn zenpack(&self) -> &str {
        &self.zenpack
    }

    /// The path without its leading `/`.
    pub fn path(&self) -> &str {
        self.name.trim_start_matches('/')
    }

    /// Create the class on install if it does not exist.
    pub fn create(&self) -> bool {
        self.create
    }

    /// Remove the class on uninstall.
    pub fn remove(&self) -> bool {
        self.remove
    }

    /// Configuration property values set on the class.
    pub fn z_properties(&self) -> &Mapping {
        &self.z_properties
    }

    /// Device templates.
    pub fn templates(&self) -> &SpecMap<RrdTemplateSpec> {
        &self.templates
    }

    /// Component templates, grouped by the component class they bind to.
    pub fn component_templates(&self) -> &IndexMap<String, SpecMap<RrdTemplateSpec>> {
        &self.component_templates
    }
}

impl Spec for DeviceClassSpec {
    const KIND: SpecKind = SpecKind::DeviceClass;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("create", self.create.into());
        params.insert("remove", self.remove.into());
        params.insert("zProperties", self.z_properties.clone().into());
        params.insert("templates", specs_to_param(&self.templates));
        params.insert(
            "component_templates",
            specs_dict_to_param(&self.component_templates),
        );
        params
    }

    fn from_params(
        ctx: &mut BuildContext<'_>,
        parent: &str,
        name: &str,
        params: ParamMap,
    ) -> Result<Self, Diagnostic> {
        let mut reader = ParamReader::new(Self::KIND, params).map_err(|e| ctx.error(e))?;
        let read = |reader: &mut ParamReader| -> Result<_, SpecError> {
            Ok((
                reader.bool("create")?,
                reader.bool("remove")?,
                reader.dict("zProperties")?,
                reader.specs("templates", SpecKind::RrdTemplate)?,
                reader.specs_dict("component_templates", SpecKind::RrdTemplate)?,
            ))
        };
        let (create, remove, z_properties, templates, component_templates) =
            read(&mut reader).map_err(|e| ctx.error(e))?;
        reader.finish(ctx)?;

        Ok(Self {
            zenpack: parent.to_string(),
            name: name.to_string(),
            create,
            remove,
            z_properties,
            templates: build_specs(ctx, name, "templates", templates)?,
            component_templates: build_specs_dict(
                ctx,
                name,
                "component_templates",
                component_templates,
            )?,
        })
    }
}
