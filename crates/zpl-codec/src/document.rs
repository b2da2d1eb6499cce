//! # Specification Documents
//!
//! Entry points over whole YAML documents. A specification document is a
//! mapping tagged `!ZenPackSpec`:
//!
//! ```yaml
//! !ZenPackSpec
//! name: ZenPacks.acme.Widgets
//! classes:
//!   Widget:
//!     base: [zenpacklib.Component]
//! class_relationships:
//!   - Rack 1:MC Widget
//! ```

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::Value;
use zpl_core::{Diagnostic, Diagnostics, Location, SourceIndex, SpecError};
use zpl_spec::{BuildContext, ParamValue, Spec, SpecKind, ZenPackSpec};

use crate::decode::{decode, describe};
use crate::encode::encode;

/// Tag of the top-level node of a specification document.
pub const DOCUMENT_TAG: &str = "ZenPackSpec";

/// How a document is compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Keep `DEFAULTS` entries in the built tree so that it writes back out
    /// with them.
    pub leave_defaults: bool,
    /// Namespace for a document without a `name`.
    pub namespace: Option<String>,
}

/// Parse YAML text and return the body of its `!ZenPackSpec` node.
///
/// An untagged document is a structural error. In lenient mode it is
/// reported and the document is read anyway.
///
/// # Errors
///
/// A [`SpecError::Syntax`] diagnostic for text that is not YAML, or the
/// structural error for an untagged document in strict mode.
pub fn parse_document(
    source: &str,
    text: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Value, Diagnostic> {
    let value: Value = serde_yaml::from_str(text).map_err(|e| {
        let location = match e.location() {
            Some(at) => Location::new(source).at(at.line(), at.column()),
            None => Location::new(source),
        };
        Diagnostic::error(location, SpecError::Syntax(e.to_string()))
    })?;

    match value {
        Value::Tagged(tagged) if tagged.tag == Tag::new(DOCUMENT_TAG) => Ok(tagged.value),
        other => {
            diagnostics.report(
                &Location::new(source),
                SpecError::structural("a !ZenPackSpec document", describe(&other)),
            )?;
            Ok(match other {
                Value::Tagged(tagged) => tagged.value,
                untagged => untagged,
            })
        }
    }
}

/// Compile a specification document.
///
/// # Errors
///
/// The diagnostic that aborted compilation. Everything recoverable is left
/// in `diagnostics`.
pub fn compile(
    source: &str,
    text: &str,
    diagnostics: &mut Diagnostics,
    options: &CompileOptions,
) -> Result<ZenPackSpec, Diagnostic> {
    diagnostics.set_source_index(SourceIndex::scan(text));
    let body = parse_document(source, text, diagnostics)?;

    let mut ctx = BuildContext::new(diagnostics, source).with_leave_defaults(options.leave_defaults);
    let mut params = decode(SpecKind::ZenPack, &body, &mut ctx)?;
    if let Some(namespace) = &options.namespace {
        if matches!(params.get("name"), None | Some(ParamValue::Null)) {
            params.insert("name", namespace.as_str().into());
        }
    }

    let spec = ZenPackSpec::build(&mut ctx, params)?;
    tracing::info!(
        source,
        zenpack = spec.namespace(),
        classes = spec.classes().len(),
        relationships = spec.class_relationships().len(),
        "compiled specification"
    );
    Ok(spec)
}

/// Compile a document keeping its `DEFAULTS` entries, for rewriting it.
///
/// # Errors
///
/// As for [`compile`].
pub fn load_params(
    source: &str,
    text: &str,
    diagnostics: &mut Diagnostics,
) -> Result<ZenPackSpec, Diagnostic> {
    let options = CompileOptions {
        leave_defaults: true,
        ..CompileOptions::default()
    };
    compile(source, text, diagnostics, &options)
}

/// The tagged document for a specification.
///
/// # Errors
///
/// As for [`encode`].
pub fn to_document(spec: &ZenPackSpec) -> Result<Value, SpecError> {
    let body = encode(SpecKind::ZenPack, &spec.to_params(), None)?;
    Ok(Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(DOCUMENT_TAG),
        value: Value::Mapping(body),
    })))
}

/// Write a specification as YAML text.
///
/// # Errors
///
/// As for [`encode`], or [`SpecError::Encode`] if the YAML writer fails.
pub fn dump(spec: &ZenPackSpec) -> Result<String, SpecError> {
    serde_yaml::to_string(&to_document(spec)?).map_err(|e| SpecError::Encode {
        spec_type: SpecKind::ZenPack.as_str(),
        param: "document".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zpl_core::Mode;

    #[test]
    fn untagged_document_is_structural() {
        let text = "name: ZenPacks.test.Plain\n";
        let mut diags = Diagnostics::new(Mode::Strict);
        let err = compile("plain.yaml", text, &mut diags, &CompileOptions::default()).unwrap_err();
        assert_eq!(err.error.code(), "structural");

        let mut diags = Diagnostics::new(Mode::Lenient);
        let spec = compile("plain.yaml", text, &mut diags, &CompileOptions::default()).unwrap();
        assert_eq!(spec.namespace(), "ZenPacks.test.Plain");
        assert_eq!(diags.errors().count(), 1);
    }

    #[test]
    fn syntax_error_carries_its_position() {
        let text = "!ZenPackSpec\nname: [unclosed\n";
        let mut diags = Diagnostics::new(Mode::Lenient);
        let err = compile("broken.yaml", text, &mut diags, &CompileOptions::default()).unwrap_err();
        assert_eq!(err.error.code(), "syntax");
        assert!(err.location.line.is_some());
        assert!(err.to_string().starts_with("broken.yaml:"));
    }

    #[test]
    fn namespace_option_fills_a_missing_name() {
        let text = "!ZenPackSpec\nclasses:\n  Widget: {}\n";
        let mut diags = Diagnostics::new(Mode::Strict);
        let options = CompileOptions {
            namespace: Some("ZenPacks.test.Fallback".to_string()),
            ..CompileOptions::default()
        };
        let spec = compile("w.yaml", text, &mut diags, &options).unwrap();
        assert_eq!(spec.namespace(), "ZenPacks.test.Fallback");

        let err = compile("w.yaml", text, &mut diags, &CompileOptions::default()).unwrap_err();
        assert_eq!(err.error.code(), "construction");
    }

    #[test]
    fn dump_is_tagged() {
        let text = "!ZenPackSpec\nname: ZenPacks.test.Dump\n";
        let mut diags = Diagnostics::new(Mode::Strict);
        let spec = compile("d.yaml", text, &mut diags, &CompileOptions::default()).unwrap();
        let out = dump(&spec).unwrap();
        assert!(out.starts_with("!ZenPackSpec"), "{out}");
        assert!(out.contains("name: ZenPacks.test.Dump"), "{out}");
    }
}
