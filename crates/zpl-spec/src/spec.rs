//! # Specification Nodes
//!
//! Every node kind implements [`Spec`]: it is built from a [`ParamMap`] by
//! `from_params` and gives one back through `to_params`. The codec never
//! sees node structs; it converts between documents and parameter maps
//! using the kind's parameter table, and nodes convert between parameter
//! maps and typed fields.
//!
//! ## Building
//!
//! A [`BuildContext`] carries what node constructors share: the diagnostics
//! sink, the namespace used to qualify class names, the document location
//! of the node being built, and whether `DEFAULTS` entries are kept.
//! [`build_specs`] builds a named collection of children, overlaying the
//! collection's `DEFAULTS` entry before any child is constructed. A child
//! that fails with a recoverable error is reported and left out of the
//! collection in lenient mode.
//!
//! ## Equality
//!
//! Two nodes are equal when they have the same name and the same parameter
//! map. The parent name is context and does not take part.

use indexmap::IndexMap;
use zpl_core::{Diagnostic, Diagnostics, Location, Severity, SpecError};

use crate::defaults::apply_defaults;
use crate::kind::SpecKind;
use crate::params::{param_table, ParamTable};
use crate::relationship::RelationshipDecl;
use crate::value::{ClassRef, ParamMap, ParamValue, SpecParams};

/// An ordered, named collection of child nodes.
pub type SpecMap<T> = IndexMap<String, T>;

/// A node of the specification tree.
pub trait Spec: Sized {
    /// The node kind, selecting the parameter table.
    const KIND: SpecKind;

    /// Name of this node within its parent collection.
    fn name(&self) -> &str;

    /// Every parameter of this node, in table order, including unset ones.
    fn to_params(&self) -> ParamMap;

    /// Build a node from its parameters.
    ///
    /// # Errors
    ///
    /// Returns a located diagnostic when a parameter is missing or has the
    /// wrong kind, or when a derived value is invalid.
    fn from_params(
        ctx: &mut BuildContext<'_>,
        parent: &str,
        name: &str,
        params: ParamMap,
    ) -> Result<Self, Diagnostic>;

    /// The value of one parameter, by internal name.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Encode`] if the kind declares no such parameter.
    fn field(&self, name: &str) -> Result<ParamValue, SpecError> {
        self.to_params()
            .shift_remove(name)
            .ok_or_else(|| SpecError::Encode {
                spec_type: Self::KIND.as_str(),
                param: name.to_string(),
                reason: "is not a field of this object".to_string(),
            })
    }
}

/// Implement `PartialEq` for a [`Spec`] type by name and parameter map.
macro_rules! impl_spec_eq {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    use $crate::spec::Spec;
                    self.name() == other.name() && self.to_params() == other.to_params()
                }
            }
        )+
    };
}
pub(crate) use impl_spec_eq;

/// Shared state for building a specification tree.
pub struct BuildContext<'d> {
    diagnostics: &'d mut Diagnostics,
    namespace: String,
    location: Location,
    leave_defaults: bool,
}

impl<'d> BuildContext<'d> {
    /// A context rooted at the named document.
    pub fn new(diagnostics: &'d mut Diagnostics, source: &str) -> Self {
        Self {
            diagnostics,
            namespace: String::new(),
            location: Location::new(source),
            leave_defaults: false,
        }
    }

    /// Keep `DEFAULTS` entries in built collections.
    pub fn with_leave_defaults(mut self, leave_defaults: bool) -> Self {
        self.leave_defaults = leave_defaults;
        self
    }

    /// Namespace used to qualify local class names.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Set the namespace, normally the specification's `name`.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    /// Whether `DEFAULTS` entries are kept.
    pub fn leave_defaults(&self) -> bool {
        self.leave_defaults
    }

    /// Location of the node being built.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The diagnostics sink.
    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        self.diagnostics
    }

    /// Wrap an error as an error-level diagnostic at the current location.
    pub fn error(&self, error: SpecError) -> Diagnostic {
        Diagnostic::error(self.diagnostics.locate(&self.location), error)
    }

    /// Report a problem at the current location.
    ///
    /// # Errors
    ///
    /// As for [`Diagnostics::report`].
    pub fn report(&mut self, error: SpecError) -> Result<(), Diagnostic> {
        self.diagnostics.report(&self.location, error)
    }

    /// Report a relationship notation problem at the current location.
    ///
    /// # Errors
    ///
    /// As for [`Diagnostics::report_notation`].
    pub fn report_notation(&mut self, error: SpecError) -> Result<(), Diagnostic> {
        self.diagnostics.report_notation(&self.location, error)
    }

    /// Record a warning at the current location.
    pub fn warn(&mut self, error: SpecError) {
        self.diagnostics.warn(&self.location, error);
    }

    /// Run `f` one path segment below the current location.
    pub fn within<R>(&mut self, segment: impl Into<String>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.location.path.push(segment.into());
        let result = f(self);
        self.location.path.pop();
        result
    }
}

/// Typed access to the parameters of one node during construction.
///
/// Every getter removes the parameter from the map. A missing or null
/// parameter takes its static default. [`finish`](Self::finish) reports
/// whatever is left over.
pub struct ParamReader {
    table: &'static ParamTable,
    params: ParamMap,
}

impl ParamReader {
    /// Start reading `params` as a node of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Configuration`] if the kind's table is invalid.
    pub fn new(kind: SpecKind, params: ParamMap) -> Result<Self, SpecError> {
        Ok(Self {
            table: param_table(kind)?,
            params,
        })
    }

    fn spec_type(&self) -> &'static str {
        self.table.kind().as_str()
    }

    fn mismatch(&self, name: &str, expected: &str, found: &ParamValue) -> SpecError {
        SpecError::construction(
            self.spec_type(),
            format!(
                "parameter '{name}' must be {expected}, not {}",
                found.type_name()
            ),
        )
    }

    /// The raw value of a parameter, or its static default.
    ///
    /// # Errors
    ///
    /// [`SpecError::Construction`] if a required parameter is missing;
    /// [`SpecError::Configuration`] if the kind declares no such parameter.
    pub fn value(&mut self, name: &str) -> Result<ParamValue, SpecError> {
        let def = self
            .table
            .get(name)
            .ok_or_else(|| SpecError::Configuration {
                spec_type: self.spec_type(),
                reason: format!("no parameter '{name}' is declared"),
            })?;
        match self.params.shift_remove(name) {
            Some(value) if !value.is_null() => Ok(value),
            _ => def.default_value().ok_or_else(|| {
                SpecError::construction(
                    self.spec_type(),
                    format!("missing required parameter '{}'", def.external_name),
                )
            }),
        }
    }

    /// An optional boolean.
    pub fn opt_bool(&mut self, name: &str) -> Result<Option<bool>, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(None),
            ParamValue::Bool(b) => Ok(Some(b)),
            other => Err(self.mismatch(name, "a boolean", &other)),
        }
    }

    /// A boolean with a static default.
    pub fn bool(&mut self, name: &str) -> Result<bool, SpecError> {
        Ok(self.opt_bool(name)?.unwrap_or_default())
    }

    /// An optional integer.
    pub fn opt_int(&mut self, name: &str) -> Result<Option<i64>, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(None),
            ParamValue::Int(i) => Ok(Some(i)),
            other => Err(self.mismatch(name, "an integer", &other)),
        }
    }

    /// An optional number. Integers are widened.
    pub fn opt_float(&mut self, name: &str) -> Result<Option<f64>, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(None),
            ParamValue::Float(f) => Ok(Some(f)),
            ParamValue::Int(i) => Ok(Some(i as f64)),
            other => Err(self.mismatch(name, "a number", &other)),
        }
    }

    /// An optional string.
    pub fn opt_string(&mut self, name: &str) -> Result<Option<String>, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(None),
            ParamValue::Str(s) => Ok(Some(s)),
            other => Err(self.mismatch(name, "a string", &other)),
        }
    }

    /// A string with a static default.
    pub fn string(&mut self, name: &str) -> Result<String, SpecError> {
        Ok(self.opt_string(name)?.unwrap_or_default())
    }

    /// A list of strings.
    pub fn str_list(&mut self, name: &str) -> Result<Vec<String>, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(Vec::new()),
            ParamValue::StrList(items) => Ok(items),
            ParamValue::Str(s) => Ok(vec![s]),
            other => Err(self.mismatch(name, "a list of strings", &other)),
        }
    }

    /// A list of class references.
    pub fn class_refs(&mut self, name: &str) -> Result<Vec<ClassRef>, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(Vec::new()),
            ParamValue::ClassRefList(items) => Ok(items),
            ParamValue::ClassRef(item) => Ok(vec![item]),
            ParamValue::StrList(items) => Ok(items.iter().map(|s| ClassRef::parse(s)).collect()),
            ParamValue::Str(s) => Ok(vec![ClassRef::parse(&s)]),
            other => Err(self.mismatch(name, "a list of class names", &other)),
        }
    }

    /// A list of relationship declarations.
    pub fn relationships(&mut self, name: &str) -> Result<Vec<RelationshipDecl>, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(Vec::new()),
            ParamValue::RelationshipList(items) => Ok(items),
            ParamValue::Relationship(item) => Ok(vec![item]),
            other => Err(self.mismatch(name, "a list of relationship schemas", &other)),
        }
    }

    /// An optional severity. Integers are range-checked.
    pub fn opt_severity(&mut self, name: &str) -> Result<Option<Severity>, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(None),
            ParamValue::Severity(s) => Ok(Some(s)),
            ParamValue::Int(i) => Severity::from_int(i)
                .map(Some)
                .ok_or_else(|| self.mismatch(name, "a severity", &ParamValue::Int(i))),
            other => Err(self.mismatch(name, "a severity", &other)),
        }
    }

    /// A free-form mapping.
    pub fn dict(&mut self, name: &str) -> Result<serde_yaml::Mapping, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(serde_yaml::Mapping::new()),
            ParamValue::Dict(m) => Ok(m),
            other => Err(self.mismatch(name, "a mapping", &other)),
        }
    }

    /// The parameters of a nested collection of `kind` children.
    pub fn specs(&mut self, name: &str, kind: SpecKind) -> Result<SpecParams, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(SpecParams::new()),
            ParamValue::Specs(k, specs) if k == kind => Ok(specs),
            other => Err(self.mismatch(name, "a collection of specs", &other)),
        }
    }

    /// The parameters of a nested collection of named groups of `kind`
    /// children.
    pub fn specs_dict(
        &mut self,
        name: &str,
        kind: SpecKind,
    ) -> Result<IndexMap<String, SpecParams>, SpecError> {
        match self.value(name)? {
            ParamValue::Null => Ok(IndexMap::new()),
            ParamValue::SpecsDict(k, groups) if k == kind => Ok(groups),
            other => Err(self.mismatch(name, "a dict of spec collections", &other)),
        }
    }

    /// Report every parameter no getter consumed.
    ///
    /// # Errors
    ///
    /// As for [`BuildContext::report`].
    pub fn finish(self, ctx: &mut BuildContext<'_>) -> Result<(), Diagnostic> {
        let spec_type = self.spec_type();
        for (name, _) in self.params {
            let external = self
                .table
                .get(name)
                .map_or(name, |def| def.external_name);
            ctx.within(external, |ctx| {
                ctx.report(SpecError::UnknownParameter {
                    spec_type,
                    param: external.to_string(),
                })
            })?;
        }
        Ok(())
    }
}

/// Build a named collection of `T` children from their parameters.
///
/// The collection's `DEFAULTS` entry is overlaid onto its siblings first,
/// and removed unless the context keeps defaults. `segment` is the document
/// key the collection sits under.
///
/// # Errors
///
/// Returns the first child diagnostic that is fatal in the current mode.
pub fn build_specs<T: Spec>(
    ctx: &mut BuildContext<'_>,
    parent: &str,
    segment: &str,
    mut specs: SpecParams,
) -> Result<SpecMap<T>, Diagnostic> {
    apply_defaults(&mut specs, ctx.leave_defaults());
    ctx.within(segment, |ctx| {
        let mut built = SpecMap::with_capacity(specs.len());
        for (name, params) in specs {
            match ctx.within(name.as_str(), |ctx| T::from_params(ctx, parent, &name, params)) {
                Ok(spec) => {
                    built.insert(name, spec);
                }
                Err(diagnostic) => {
                    tracing::debug!(
                        spec_type = T::KIND.as_str(),
                        name = %name,
                        "dropping entry: {}",
                        diagnostic.error
                    );
                    ctx.diagnostics().handle(diagnostic)?;
                }
            }
        }
        Ok(built)
    })
}

/// Build named groups of `T` children, each group a collection with its own
/// `DEFAULTS`.
///
/// # Errors
///
/// As for [`build_specs`].
pub fn build_specs_dict<T: Spec>(
    ctx: &mut BuildContext<'_>,
    parent: &str,
    segment: &str,
    groups: IndexMap<String, SpecParams>,
) -> Result<IndexMap<String, SpecMap<T>>, Diagnostic> {
    ctx.within(segment, |ctx| {
        let mut built = IndexMap::with_capacity(groups.len());
        for (group, specs) in groups {
            let children = build_specs(ctx, parent, &group, specs)?;
            built.insert(group, children);
        }
        Ok(built)
    })
}

/// The parameter form of a built collection.
pub fn specs_to_param<T: Spec>(specs: &SpecMap<T>) -> ParamValue {
    ParamValue::Specs(T::KIND, specs_to_params(specs))
}

/// The parameter maps of a built collection.
pub fn specs_to_params<T: Spec>(specs: &SpecMap<T>) -> SpecParams {
    specs
        .iter()
        .map(|(name, spec)| (name.clone(), spec.to_params()))
        .collect()
}

/// The parameter form of built groups.
pub fn specs_dict_to_param<T: Spec>(groups: &IndexMap<String, SpecMap<T>>) -> ParamValue {
    ParamValue::SpecsDict(
        T::KIND,
        groups
            .iter()
            .map(|(group, specs)| (group.clone(), specs_to_params(specs)))
            .collect(),
    )
}
