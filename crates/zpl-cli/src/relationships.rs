//! # Relationships Subcommand
//!
//! Lists the resolved relationship table: one row per relation name on each
//! class, including relations the specification attaches to classes it does
//! not define.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use zpl_core::{Mode, RelationKind};
use zpl_spec::{RelationshipView, ZenPackSpec};

use crate::config::{CliConfig, CompileFlags};
use crate::Compilation;

/// Output format.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Arguments for the relationships subcommand.
#[derive(Args, Debug)]
pub struct RelationshipsArgs {
    /// Specification document.
    pub path: PathBuf,

    #[command(flatten)]
    pub flags: CompileFlags,

    /// Only this class.
    #[arg(long)]
    pub class: Option<String>,

    /// Include relationships inherited from local base classes.
    #[arg(long, requires = "class")]
    pub inherited: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

/// One relation as seen from the class that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipRow {
    pub class: String,
    pub relation: String,
    pub kind: RelationKind,
    pub cardinality: String,
    pub remote_class: String,
    pub remote_relation: String,
    pub external: bool,
}

impl RelationshipRow {
    fn from_view(view: &RelationshipView, external: bool) -> Self {
        Self {
            class: if external {
                view.qualified_class.clone()
            } else {
                view.class_name.clone()
            },
            relation: view.relation_name.clone(),
            kind: view.kind,
            cardinality: view.cardinality.clone(),
            remote_class: view.remote_class.clone(),
            remote_relation: view.remote_relation_name.clone(),
            external,
        }
    }
}

impl std::fmt::Display for RelationshipRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} {} {}.{} ({})",
            self.class,
            self.relation,
            self.cardinality,
            self.remote_class,
            self.remote_relation,
            self.kind.host_type()
        )?;
        if self.external {
            write!(f, " [external]")?;
        }
        Ok(())
    }
}

/// Rows for every class, or for one class.
pub fn relationship_rows(
    spec: &ZenPackSpec,
    class: Option<&str>,
    inherited: bool,
) -> Vec<RelationshipRow> {
    let table = spec.relationship_table();
    match class {
        Some(class) if inherited => spec
            .inherited_relationship_views(class)
            .into_iter()
            .map(|view| RelationshipRow::from_view(view, false))
            .collect(),
        Some(class) => table
            .of_class(class)
            .map(|view| RelationshipRow::from_view(view, false))
            .collect(),
        None => {
            let local = spec
                .classes()
                .keys()
                .flat_map(|class| table.of_class(class))
                .map(|view| RelationshipRow::from_view(view, false));
            let external = spec
                .external_relations()
                .values()
                .flatten()
                .map(|view| RelationshipRow::from_view(view, true));
            local.chain(external).collect()
        }
    }
}

/// Execute the relationships subcommand.
pub fn run_relationships(args: &RelationshipsArgs, config: &CliConfig) -> Result<u8> {
    let (mode, options) = args.flags.resolve(config, Mode::Strict);
    let spec = Compilation::run(&args.path, mode, &options)?.into_spec()?;
    if let Some(class) = &args.class {
        if !spec.classes().contains_key(class) {
            anyhow::bail!("class '{class}' is not defined in {}", spec.namespace());
        }
    }

    let rows = relationship_rows(&spec, args.class.as_deref(), args.inherited);
    match args.format {
        Format::Text => {
            for row in &rows {
                println!("{row}");
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(0)
}
