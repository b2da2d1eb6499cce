//! # Relationship Schemas
//!
//! A relationship joins two classes. Each side has a [`RelationKind`] and a
//! relation name (the attribute on that side's class that points across).
//! The two sides are always ordered so that the kind pair is one of four
//! permitted orientations:
//!
//! | left          | right    | cardinality |
//! |---------------|----------|-------------|
//! | `Single`      | `Single` | `1:1`       |
//! | `Multi`       | `Single` | `1:M`       |
//! | `MultiOwning` | `Single` | `1:MC`      |
//! | `Multi`       | `Multi`  | `M:M`       |
//!
//! [`RelationshipSchema::resolve`] validates the pair and never reorders it;
//! reordering free-form input is the job of the notation parser.
//!
//! An omitted relation name is derived from the class on the *other* side
//! (see [`relname_from_classname`]), pluralized unless this side is
//! `Single`.

use std::fmt;

use zpl_core::{qualify, relname_from_classname, RelationKind, SpecError};

/// Returns true if `(left, right)` is one of the four permitted orientations.
pub fn valid_orientation(left: RelationKind, right: RelationKind) -> bool {
    cardinality(left, right).is_some()
}

/// The cardinality string of a permitted orientation.
pub fn cardinality(left: RelationKind, right: RelationKind) -> Option<&'static str> {
    use RelationKind::{Multi, MultiOwning, Single};
    match (left, right) {
        (Single, Single) => Some("1:1"),
        (Multi, Single) => Some("1:M"),
        (MultiOwning, Single) => Some("1:MC"),
        (Multi, Multi) => Some("M:M"),
        _ => None,
    }
}

/// The `(left, right)` kinds for a cardinality string.
pub fn kinds_for_cardinality(cardinality: &str) -> Option<(RelationKind, RelationKind)> {
    use RelationKind::{Multi, MultiOwning, Single};
    match cardinality {
        "1:1" => Some((Single, Single)),
        "1:M" => Some((Multi, Single)),
        "1:MC" => Some((MultiOwning, Single)),
        "M:M" => Some((Multi, Multi)),
        _ => None,
    }
}

/// One side of a relationship as declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipEndpoint {
    /// Class on this side, as written.
    pub class_name: String,
    /// Relation name on this side's class, if given.
    pub relation_name: Option<String>,
    /// Cardinality of this side.
    pub kind: RelationKind,
}

impl RelationshipEndpoint {
    /// An endpoint with an explicit or omitted relation name.
    pub fn new(
        class_name: impl Into<String>,
        relation_name: Option<&str>,
        kind: RelationKind,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            relation_name: relation_name.filter(|r| !r.is_empty()).map(str::to_string),
            kind,
        }
    }
}

/// A relationship as declared, before name derivation and qualification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipDecl {
    /// Left side.
    pub left: RelationshipEndpoint,
    /// Right side.
    pub right: RelationshipEndpoint,
}

impl RelationshipDecl {
    /// A declaration from two endpoints.
    pub fn new(left: RelationshipEndpoint, right: RelationshipEndpoint) -> Self {
        Self { left, right }
    }

    /// Returns true if the kinds form a permitted orientation as written.
    pub fn is_valid_orientation(&self) -> bool {
        valid_orientation(self.left.kind, self.right.kind)
    }

    /// The same relationship with the endpoints exchanged.
    pub fn swapped(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }

    /// Relation name the left side gets when none is given.
    pub fn default_left_relname(&self) -> String {
        relname_from_classname(&self.right.class_name, !self.left.kind.is_single())
    }

    /// Relation name the right side gets when none is given.
    pub fn default_right_relname(&self) -> String {
        relname_from_classname(&self.left.class_name, !self.right.kind.is_single())
    }

    /// The same declaration with both relation names spelled out.
    pub fn with_explicit_names(&self) -> Self {
        let mut decl = self.clone();
        if decl.left.relation_name.is_none() {
            decl.left.relation_name = Some(self.default_left_relname());
        }
        if decl.right.relation_name.is_none() {
            decl.right.relation_name = Some(self.default_right_relname());
        }
        decl
    }

    /// Resolve against `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Orientation`] if the kind pair is not permitted.
    pub fn resolve(&self, namespace: &str) -> Result<RelationshipSchema, SpecError> {
        RelationshipSchema::resolve(
            namespace,
            self.left.kind,
            self.right.kind,
            &self.left.class_name,
            self.left.relation_name.as_deref(),
            &self.right.class_name,
            self.right.relation_name.as_deref(),
        )
    }

    /// Compact notation, omitting relation names equal to their defaults:
    /// `Left(lrel) 1:MC (rrel)Right`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Orientation`] if the kind pair is not permitted.
    pub fn to_notation(&self) -> Result<String, SpecError> {
        let card = cardinality(self.left.kind, self.right.kind)
            .ok_or_else(|| self.orientation_error())?;
        let left_rel = match &self.left.relation_name {
            Some(name) if *name != self.default_left_relname() => format!("({name})"),
            _ => String::new(),
        };
        let right_rel = match &self.right.relation_name {
            Some(name) if *name != self.default_right_relname() => format!("({name})"),
            _ => String::new(),
        };
        Ok(format!(
            "{}{left_rel} {card} {right_rel}{}",
            self.left.class_name, self.right.class_name
        ))
    }

    fn orientation_error(&self) -> SpecError {
        let explicit = self.with_explicit_names();
        orientation_error(
            &explicit.left.class_name,
            explicit.left.relation_name.as_deref().unwrap_or_default(),
            self.left.kind,
            &explicit.right.class_name,
            explicit.right.relation_name.as_deref().unwrap_or_default(),
            self.right.kind,
        )
    }
}

fn orientation_error(
    left_class: &str,
    left_relname: &str,
    left_kind: RelationKind,
    right_class: &str,
    right_relname: &str,
    right_kind: RelationKind,
) -> SpecError {
    SpecError::Orientation {
        left: format!("{left_class}({left_relname}) {left_kind}"),
        right: format!("{right_kind} ({right_relname}){right_class}"),
    }
}

/// One resolved side of a relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedEndpoint {
    /// Class as written in the specification.
    pub class_name: String,
    /// Class qualified against the specification namespace.
    pub qualified_class: String,
    /// Relation name on this class, given or derived.
    pub relation_name: String,
    /// Whether the relation name was given rather than derived.
    pub explicit_name: bool,
    /// Cardinality of this side.
    pub kind: RelationKind,
}

/// A validated two-sided relationship, shared by both participating classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipSchema {
    left: ResolvedEndpoint,
    right: ResolvedEndpoint,
    cardinality: &'static str,
}

impl RelationshipSchema {
    /// Validate an orientation and build the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Orientation`] naming both endpoints if
    /// `(left_kind, right_kind)` is not a permitted orientation.
    pub fn resolve(
        namespace: &str,
        left_kind: RelationKind,
        right_kind: RelationKind,
        left_class: &str,
        left_relname: Option<&str>,
        right_class: &str,
        right_relname: Option<&str>,
    ) -> Result<Self, SpecError> {
        let left_relname = left_relname.filter(|r| !r.is_empty());
        let right_relname = right_relname.filter(|r| !r.is_empty());
        let default_left = relname_from_classname(right_class, !left_kind.is_single());
        let default_right = relname_from_classname(left_class, !right_kind.is_single());

        let Some(card) = cardinality(left_kind, right_kind) else {
            return Err(orientation_error(
                left_class,
                left_relname.unwrap_or(default_left.as_str()),
                left_kind,
                right_class,
                right_relname.unwrap_or(default_right.as_str()),
                right_kind,
            ));
        };

        Ok(Self {
            left: ResolvedEndpoint {
                class_name: left_class.to_string(),
                qualified_class: qualify(namespace, left_class),
                relation_name: left_relname.map_or(default_left, str::to_string),
                explicit_name: left_relname.is_some(),
                kind: left_kind,
            },
            right: ResolvedEndpoint {
                class_name: right_class.to_string(),
                qualified_class: qualify(namespace, right_class),
                relation_name: right_relname.map_or(default_right, str::to_string),
                explicit_name: right_relname.is_some(),
                kind: right_kind,
            },
            cardinality: card,
        })
    }

    /// Left side.
    pub fn left(&self) -> &ResolvedEndpoint {
        &self.left
    }

    /// Right side.
    pub fn right(&self) -> &ResolvedEndpoint {
        &self.right
    }

    /// `1:1`, `1:M`, `1:MC` or `M:M`.
    pub fn cardinality(&self) -> &'static str {
        self.cardinality
    }

    /// Relation name the left side gets when none is given.
    pub fn default_left_relname(&self) -> String {
        relname_from_classname(&self.right.class_name, !self.left.kind.is_single())
    }

    /// Relation name the right side gets when none is given.
    pub fn default_right_relname(&self) -> String {
        relname_from_classname(&self.left.class_name, !self.right.kind.is_single())
    }

    /// The relationship as seen from the left class.
    pub fn left_view(&self) -> RelationshipView {
        RelationshipView::between(&self.left, &self.right, self.cardinality.to_string())
    }

    /// The relationship as seen from the right class.
    pub fn right_view(&self) -> RelationshipView {
        RelationshipView::between(&self.right, &self.left, reverse(self.cardinality))
    }

    /// The declaration this schema was resolved from, with every relation
    /// name spelled out.
    pub fn to_decl(&self) -> RelationshipDecl {
        RelationshipDecl::new(
            RelationshipEndpoint::new(
                self.left.class_name.clone(),
                Some(&self.left.relation_name),
                self.left.kind,
            ),
            RelationshipEndpoint::new(
                self.right.class_name.clone(),
                Some(&self.right.relation_name),
                self.right.kind,
            ),
        )
    }

    /// Compact notation, omitting relation names equal to their defaults.
    pub fn to_notation(&self) -> String {
        let left_rel = if self.left.relation_name == self.default_left_relname() {
            String::new()
        } else {
            format!("({})", self.left.relation_name)
        };
        let right_rel = if self.right.relation_name == self.default_right_relname() {
            String::new()
        } else {
            format!("({})", self.right.relation_name)
        };
        format!(
            "{}{left_rel} {} {right_rel}{}",
            self.left.class_name, self.cardinality, self.right.class_name
        )
    }

    /// yUML notation (`[Pod]++-[Fan]`), omitting default relation names.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Encode`] if a relation name contains characters
    /// the yUML grammar cannot carry.
    pub fn to_yuml(&self) -> Result<String, SpecError> {
        let (lcard, rcard, sep) = match self.cardinality {
            "1:1" => ("1", "1", "-.-"),
            "1:M" => ("1", "*", "-.-"),
            "1:MC" => ("++", "", "-"),
            _ => ("*", "*", "-.-"),
        };
        let left_rel = self.yuml_relname(&self.left, &self.default_left_relname())?;
        let right_rel = self.yuml_relname(&self.right, &self.default_right_relname())?;
        let right_tail = if right_rel.is_empty() && rcard.is_empty() {
            String::new()
        } else {
            format!("{right_rel} {rcard}")
        };
        Ok(format!(
            "[{}]{lcard}{left_rel} {sep}{right_tail}[{}]",
            self.left.class_name, self.right.class_name
        ))
    }

    fn yuml_relname(&self, side: &ResolvedEndpoint, default: &str) -> Result<String, SpecError> {
        if side.relation_name == default {
            return Ok(String::new());
        }
        if side
            .relation_name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == '_')
        {
            Ok(side.relation_name.clone())
        } else {
            Err(SpecError::Encode {
                spec_type: "RelationshipSchemaSpec",
                param: side.relation_name.clone(),
                reason: "cannot be written in yUML notation".to_string(),
            })
        }
    }

    /// Returns true if either side is `class_name` (as written).
    pub fn involves(&self, class_name: &str) -> bool {
        self.left.class_name == class_name || self.right.class_name == class_name
    }
}

impl fmt::Display for RelationshipSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_notation())
    }
}

fn reverse(cardinality: &str) -> String {
    match cardinality.split_once(':') {
        Some((a, b)) => format!("{b}:{a}"),
        None => cardinality.to_string(),
    }
}

/// A relationship as seen from one of its classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipView {
    /// The class holding this relation, as written.
    pub class_name: String,
    /// The class holding this relation, qualified.
    pub qualified_class: String,
    /// Attribute name on this class.
    pub relation_name: String,
    /// Cardinality on this side.
    pub kind: RelationKind,
    /// The class on the other side, as written.
    pub remote_class: String,
    /// The class on the other side, qualified.
    pub remote_qualified_class: String,
    /// Attribute name on the remote class.
    pub remote_relation_name: String,
    /// Cardinality on the other side.
    pub remote_kind: RelationKind,
    /// Cardinality string read from this side (`MC:1` for the contained
    /// side of a `1:MC` relationship).
    pub cardinality: String,
}

impl RelationshipView {
    fn between(local: &ResolvedEndpoint, remote: &ResolvedEndpoint, cardinality: String) -> Self {
        Self {
            class_name: local.class_name.clone(),
            qualified_class: local.qualified_class.clone(),
            relation_name: local.relation_name.clone(),
            kind: local.kind,
            remote_class: remote.class_name.clone(),
            remote_qualified_class: remote.qualified_class.clone(),
            remote_relation_name: remote.relation_name.clone(),
            remote_kind: remote.kind,
            cardinality,
        }
    }

    /// The same relationship seen from the other class.
    pub fn mirror(&self) -> Self {
        Self {
            class_name: self.remote_class.clone(),
            qualified_class: self.remote_qualified_class.clone(),
            relation_name: self.remote_relation_name.clone(),
            kind: self.remote_kind,
            remote_class: self.class_name.clone(),
            remote_qualified_class: self.qualified_class.clone(),
            remote_relation_name: self.relation_name.clone(),
            remote_kind: self.kind,
            cardinality: reverse(&self.cardinality),
        }
    }

    /// Returns true if this side contains the remote objects.
    pub fn is_containing(&self) -> bool {
        self.kind == RelationKind::MultiOwning
    }

    /// Returns true if this side is contained by the remote object.
    pub fn is_contained(&self) -> bool {
        self.remote_kind == RelationKind::MultiOwning
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn kind() -> impl Strategy<Value = RelationKind> {
        prop_oneof![
            Just(RelationKind::Single),
            Just(RelationKind::Multi),
            Just(RelationKind::MultiOwning),
        ]
    }

    fn class_name() -> impl Strategy<Value = String> {
        "[A-Z][A-Za-z]{0,8}"
    }

    fn relname() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-z][a-z_]{0,8}")
    }

    proptest! {
        /// Each side's view is the mirror of the other, for every permitted
        /// orientation; every other pair is rejected.
        #[test]
        fn orientation_symmetry(
            lk in kind(), rk in kind(),
            lc in class_name(), rc in class_name(),
            lr in relname(), rr in relname(),
        ) {
            let result = RelationshipSchema::resolve(
                "ZenPacks.test.Prop", lk, rk, &lc, lr.as_deref(), &rc, rr.as_deref());
            match result {
                Ok(schema) => {
                    prop_assert!(valid_orientation(lk, rk));
                    prop_assert_eq!(schema.left_view().mirror(), schema.right_view());
                    prop_assert_eq!(schema.right_view().mirror(), schema.left_view());
                    let card = schema.cardinality();
                    prop_assert_eq!(reverse(&reverse(card)), card.to_string());
                    if lk == rk {
                        let swapped = RelationshipSchema::resolve(
                            "ZenPacks.test.Prop", rk, lk, &rc, rr.as_deref(), &lc, lr.as_deref())
                            .unwrap();
                        prop_assert_eq!(swapped.left_view(), schema.right_view());
                    }
                }
                Err(err) => {
                    prop_assert!(!valid_orientation(lk, rk));
                    prop_assert_eq!(err.code(), "orientation");
                }
            }
        }
    }
}
