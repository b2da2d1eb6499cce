//! # Relationship Side Table
//!
//! Second build pass. Every resolved relationship schema contributes one
//! [`RelationshipView`] per side, keyed by `(class, relation name)`. Class
//! nodes are never modified; all cross-links live here.
//!
//! ## Resolution rules
//!
//! - A side naming a class defined in the specification is linked to it.
//!   A qualified name inside the specification's own namespace
//!   (`ZenPacks.test.Pods.Pod`) counts as the local class `Pod`.
//! - A side naming any other qualified class is external: its view is kept
//!   in [`RelationshipTable::external`], grouped by class, for the host to
//!   attach to the platform class.
//! - A side naming an unqualified class that is not defined is a warning
//!   and is left out.
//! - The same relation name twice on one class is a construction error.
//!
//! After linking, relationship display settings declared on a class that
//! match no relationship of the class (or of its local bases) and local base
//! classes that are not defined are reported as warnings.

use std::collections::HashSet;

use indexmap::IndexMap;
use zpl_core::{Diagnostic, SpecError};

use crate::defaults::DEFAULTS_KEY;
use crate::nodes::ClassSpec;
use crate::relationship::{RelationshipSchema, RelationshipView};
use crate::spec::{BuildContext, SpecMap};
use crate::value::ClassRef;

/// Cross-links between classes, built once after all classes exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipTable {
    links: IndexMap<(String, String), RelationshipView>,
    external: IndexMap<String, Vec<RelationshipView>>,
}

impl RelationshipTable {
    /// Link every schema side to its class.
    ///
    /// # Errors
    ///
    /// A construction error if one class gets the same relation name twice.
    pub fn build(
        ctx: &mut BuildContext<'_>,
        classes: &SpecMap<ClassSpec>,
        schemas: &[RelationshipSchema],
    ) -> Result<Self, Diagnostic> {
        let mut table = Self::default();
        let namespace = ctx.namespace().to_string();

        ctx.within("class_relationships", |ctx| {
            for (i, schema) in schemas.iter().enumerate() {
                ctx.within(i.to_string(), |ctx| {
                    for view in [schema.left_view(), schema.right_view()] {
                        table.link(ctx, &namespace, classes, view)?;
                    }
                    Ok::<_, Diagnostic>(())
                })?;
            }
            Ok::<_, Diagnostic>(())
        })?;

        table.check_classes(ctx, classes);
        tracing::debug!(
            links = table.links.len(),
            external_classes = table.external.len(),
            "linked relationships"
        );
        Ok(table)
    }

    fn link(
        &mut self,
        ctx: &mut BuildContext<'_>,
        namespace: &str,
        classes: &SpecMap<ClassSpec>,
        view: RelationshipView,
    ) -> Result<(), Diagnostic> {
        let local = local_class(namespace, classes, &view.class_name);
        match local {
            Some(class) => {
                let key = (class.to_string(), view.relation_name.clone());
                if self.links.contains_key(&key) {
                    return Err(ctx.error(SpecError::construction(
                        "ZenPackSpec",
                        format!(
                            "relationship '{}' is defined more than once on class '{}'",
                            key.1, key.0
                        ),
                    )));
                }
                self.links.insert(key, view);
            }
            None if ClassRef::parse(&view.class_name).is_local() => {
                tracing::warn!(
                    class = %view.class_name,
                    relationship = %view.relation_name,
                    "relationship refers to an undefined class"
                );
                ctx.warn(SpecError::Unresolved {
                    spec_type: "RelationshipSchemaSpec",
                    name: view.relation_name.clone(),
                    reason: format!("class '{}' is not defined", view.class_name),
                });
            }
            None => {
                self.external
                    .entry(view.class_name.clone())
                    .or_default()
                    .push(view);
            }
        }
        Ok(())
    }

    fn check_classes(&self, ctx: &mut BuildContext<'_>, classes: &SpecMap<ClassSpec>) {
        ctx.within("classes", |ctx| {
            for (name, class) in classes {
                if name == DEFAULTS_KEY {
                    continue;
                }
                ctx.within(name.as_str(), |ctx| {
                    for base in class.bases() {
                        if let ClassRef::Local(base) = base {
                            if !classes.contains_key(base) {
                                tracing::warn!(class = %name, base = %base, "unknown base class");
                                ctx.warn(SpecError::Unresolved {
                                    spec_type: "ClassSpec",
                                    name: name.clone(),
                                    reason: format!("base class '{base}' is not defined"),
                                });
                            }
                        }
                    }

                    let lineage = lineage(classes, name);
                    for relname in class.relationships().keys() {
                        if relname == DEFAULTS_KEY {
                            continue;
                        }
                        let linked = lineage.iter().any(|c| {
                            self.links.contains_key(&(c.to_string(), relname.clone()))
                        });
                        if !linked {
                            tracing::warn!(class = %name, relationship = %relname, "no schema for relationship");
                            ctx.within("relationships", |ctx| {
                                ctx.within(relname.as_str(), |ctx| {
                                    ctx.warn(SpecError::Unresolved {
                                        spec_type: "ClassRelationshipSpec",
                                        name: relname.clone(),
                                        reason: format!(
                                            "no relationship schema defines '{relname}' on class '{name}'"
                                        ),
                                    })
                                })
                            });
                        }
                    }
                });
            }
        });
    }

    /// The view of relationship `relation_name` from `class`.
    pub fn get(&self, class: &str, relation_name: &str) -> Option<&RelationshipView> {
        self.links
            .get(&(class.to_string(), relation_name.to_string()))
    }

    /// Relationships held by `class` itself, in declaration order.
    pub fn of_class(&self, class: &str) -> impl Iterator<Item = &RelationshipView> + '_ {
        let class = class.to_string();
        self.links
            .iter()
            .filter(move |((c, _), _)| *c == class)
            .map(|(_, view)| view)
    }

    /// Views held by classes outside the specification, by qualified class.
    pub fn external(&self) -> &IndexMap<String, Vec<RelationshipView>> {
        &self.external
    }

    /// Number of linked local views.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Resolve a class token to a local class name, if it names one.
fn local_class<'c>(
    namespace: &str,
    classes: &'c SpecMap<ClassSpec>,
    token: &str,
) -> Option<&'c str> {
    let name = match token.rsplit_once('.') {
        None => token,
        Some((prefix, last)) if !namespace.is_empty() && prefix == namespace => last,
        Some(_) => return None,
    };
    classes
        .get_key_value(name)
        .filter(|(key, _)| key.as_str() != DEFAULTS_KEY)
        .map(|(key, _)| key.as_str())
}

/// `class` followed by all of its local ancestors, each once.
pub(crate) fn lineage<'c>(classes: &'c SpecMap<ClassSpec>, class: &'c str) -> Vec<&'c str> {
    let mut order = vec![class];
    let mut seen: HashSet<&str> = HashSet::from([class]);
    let mut stack: Vec<&str> = vec![class];
    while let Some(current) = stack.pop() {
        let Some(spec) = classes.get(current) else {
            continue;
        };
        for base in spec.bases().iter().rev() {
            if let ClassRef::Local(base) = base {
                if let Some((key, _)) = classes.get_key_value(base.as_str()) {
                    if seen.insert(key.as_str()) {
                        order.push(key.as_str());
                        stack.push(key.as_str());
                    }
                }
            }
        }
    }
    order
}
