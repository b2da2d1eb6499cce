//! Display settings for one relationship of a class.
//!
//! The relationship itself (remote class, kinds, names) comes from the
//! specification's `class_relationships`; a class only lists the ones it
//! wants to present differently.

use zpl_core::{Diagnostic, SpecError};

use crate::kind::SpecKind;
use crate::nodes::class_property::banded_order;
use crate::params::{ParamDef, ParamDefault, ValueKind};
use crate::spec::{impl_spec_eq, BuildContext, ParamReader, Spec};
use crate::value::ParamMap;

pub const LINK_RENDERER: &str = "Zenoss.render.zenpacklib_entityLinkFromGrid";
pub const TYPE_LINK_RENDERER: &str = "Zenoss.render.zenpacklib_entityTypeLinkFromGrid";

pub static PARAMS: &[ParamDef] = &[
    ParamDef::new("label", ValueKind::Str),
    ParamDef::new("short_label", ValueKind::Str),
    ParamDef::new("label_width", ValueKind::Int),
    ParamDef::new("content_width", ValueKind::Int),
    ParamDef::new("display", ValueKind::Bool).with_default(ParamDefault::Bool(true)),
    ParamDef::new("details_display", ValueKind::Bool).with_default(ParamDefault::Bool(true)),
    ParamDef::new("grid_display", ValueKind::Bool).with_default(ParamDefault::Bool(true)),
    ParamDef::new("renderer", ValueKind::Str),
    ParamDef::new("render_with_type", ValueKind::Bool).with_default(ParamDefault::Bool(false)),
    ParamDef::new("order", ValueKind::Float),
];

#[derive(Debug, Clone)]
pub struct ClassRelationshipSpec {
    class_name: String,
    name: String,
    label: Option<String>,
    short_label: Option<String>,
    label_width: Option<i64>,
    content_width: Option<i64>,
    display: bool,
    details_display: bool,
    grid_display: bool,
    renderer: Option<String>,
    render_with_type: bool,
    order: Option<f64>,
}

impl_spec_eq!(ClassRelationshipSpec);

impl ClassRelationshipSpec {
    /// The class holding the relationship.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn short_label(&self) -> Option<&str> {
        self.short_label.as_deref()
    }

    pub fn label_width(&self) -> Option<i64> {
        self.label_width
    }

    pub fn content_width(&self) -> Option<i64> {
        self.content_width
    }

    pub fn display(&self) -> bool {
        self.display
    }

    /// False whenever `display` is false.
    pub fn details_display(&self) -> bool {
        self.display && self.details_display
    }

    /// False whenever `display` is false.
    pub fn grid_display(&self) -> bool {
        self.display && self.grid_display
    }

    pub fn render_with_type(&self) -> bool {
        self.render_with_type
    }

    /// The given renderer, or a link renderer chosen by `render_with_type`.
    pub fn renderer(&self) -> &str {
        match &self.renderer {
            Some(renderer) => renderer,
            None if self.render_with_type => TYPE_LINK_RENDERER,
            None => LINK_RENDERER,
        }
    }

    /// Sort order in the 5.0-6.0 band, as for classes.
    pub fn order(&self) -> f64 {
        banded_order(5.0, self.order)
    }
}

impl Spec for ClassRelationshipSpec {
    const KIND: SpecKind = SpecKind::ClassRelationship;

    fn name(&self) -> &str {
        &self.name
    }

    fn to_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("label", self.label.clone().into());
        params.insert("short_label", self.short_label.clone().into());
        params.insert("label_width", self.label_width.into());
        params.insert("content_width", self.content_width.into());
        params.insert("display", self.display.into());
        params.insert("details_display", self.details_display.into());
        params.insert("grid_display", self.grid_display.into());
        params.insert("renderer", self.renderer.clone().into());
        params.insert("render_with_type", self.render_with_type.into());
        params.insert("order", self.order.into());
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
                class_name: parent.to_string(),
                name: name.to_string(),
                label: r.opt_string("label")?,
                short_label: r.opt_string("short_label")?,
                label_width: r.opt_int("label_width")?,
                content_width: r.opt_int("content_width")?,
                display: r.bool("display")?,
                details_display: r.bool("details_display")?,
                grid_display: r.bool("grid_display")?,
                renderer: r.opt_string("renderer")?,
                render_with_type: r.bool("render_with_type")?,
                order: r.opt_float("order")?,
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
    use crate::value::ParamValue;
    use zpl_core::{Diagnostics, Mode};

    fn build(fields: &[(&'static str, ParamValue)]) -> ClassRelationshipSpec {
        let mut diags = Diagnostics::new(Mode::Strict);
        let mut ctx = BuildContext::new(&mut diags, "r.yaml");
        ClassRelationshipSpec::from_params(&mut ctx, "Pod", "fans", fields.iter().cloned().collect())
            .unwrap()
    }

    #[test]
    fn hidden_relationship_hides_everywhere() {
        let rel = build(&[("display", false.into())]);
        assert!(!rel.details_display());
        assert!(!rel.grid_display());
        assert_eq!(rel.to_params()["grid_display"], ParamValue::Bool(true));
    }

    #[test]
    fn renderer_follows_render_with_type() {
        assert_eq!(build(&[]).renderer(), LINK_RENDERER);
        assert_eq!(
            build(&[("render_with_type", true.into())]).renderer(),
            TYPE_LINK_RENDERER
        );
        assert_eq!(build(&[("renderer", "X.render".into())]).renderer(), "X.render");
    }
}
