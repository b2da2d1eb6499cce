//! # Relationship Notation
//!
//! Two line-oriented notations describe relationships between classes.
//!
//! ## yUML
//!
//! A subset of the yUML class diagram syntax:
//!
//! ```text
//! // Containing relationships.
//! [APIC]++-[FabricPod]
//! // Non-containing relationships.
//! [FvBD]1 -.- *[FvAEPg]
//! // Explicitly named relationships.
//! [Pool]*default_sr -.-default_for_pools 0..1[SR]
//! ```
//!
//! `++` next to a class makes that class the owning side; `*` next to a
//! class makes the *other* side a multi relation; anything else (including a
//! bare multiplicity such as `1` or `0..1`) is single. A relation name
//! written next to a class belongs to that class. When the kinds as written
//! are not a permitted orientation the endpoints are swapped; if the swapped
//! pair is still not permitted the line is an orientation error.
//!
//! ## Compact
//!
//! The form written into documents, one relationship per string:
//!
//! ```text
//! APIC 1:MC FabricPod
//! SR(default_for_pools) 1:M (default_sr)Pool
//! ```
//!
//! A relation name may sit on either side of its class name.

use std::sync::OnceLock;

use regex::Regex;
use zpl_core::{Diagnostic, Diagnostics, Location, RelationKind, SpecError};

use crate::relationship::{kinds_for_cardinality, RelationshipDecl, RelationshipEndpoint};

const YUML_LINE: &str = concat!(
    r"\[(?P<lclass>[^\]]+)\]",
    r"(?P<lcard>[\.\*\+\d]*)",
    r"(?P<lrel>[a-zA-Z_]*)",
    r"\s*?",
    r"(?P<sep>[\-\.]+)",
    r"(?P<rrel>[a-zA-Z_]*)",
    r"\s*?",
    r"(?P<rcard>[\.\*\+\d]*)",
    r"\[(?P<rclass>[^\]]+)\]",
);

const COMPACT_LINE: &str =
    r"^\s*(?P<left>\S+)\s+(?P<card>1:1|1:M|1:MC|M:M)\s+(?P<right>\S+)\s*$";

const COMPACT_SIDE: &str =
    r"^(?:\((?P<pre>[^)\s]+)\))?(?P<class>[^(\s]+)(?:\((?P<post>[^)\s]+)\))?$";

const COMMENT_LINE: &str = r"^\s*//";

fn pattern(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    source: &'static str,
) -> Result<&'static Regex, SpecError> {
    cell.get_or_init(|| Regex::new(source))
        .as_ref()
        .map_err(|e| SpecError::Configuration {
            spec_type: "RelationshipSchemaSpec",
            reason: e.to_string(),
        })
}

fn yuml_line() -> Result<&'static Regex, SpecError> {
    static CELL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    pattern(&CELL, YUML_LINE)
}

fn compact_line() -> Result<&'static Regex, SpecError> {
    static CELL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    pattern(&CELL, COMPACT_LINE)
}

fn compact_side() -> Result<&'static Regex, SpecError> {
    static CELL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    pattern(&CELL, COMPACT_SIDE)
}

fn comment_line() -> Result<&'static Regex, SpecError> {
    static CELL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    pattern(&CELL, COMMENT_LINE)
}

fn ambiguous(text: &str, reason: &str) -> SpecError {
    SpecError::AmbiguousNotation {
        text: text.trim().to_string(),
        reason: reason.to_string(),
    }
}

/// Returns true for blank lines and `//` comments.
pub fn is_skippable(line: &str) -> Result<bool, SpecError> {
    Ok(line.trim().is_empty() || comment_line()?.is_match(line))
}

/// Parse one yUML line. Returns `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// [`SpecError::AmbiguousNotation`] if the line does not match the grammar,
/// [`SpecError::Orientation`] if neither ordering of the endpoints is a
/// permitted orientation.
pub fn parse_yuml_line(line: &str) -> Result<Option<RelationshipDecl>, SpecError> {
    if is_skippable(line)? {
        return Ok(None);
    }
    let caps = yuml_line()?.captures(line).ok_or_else(|| {
        ambiguous(
            line,
            "expected [Left]<marker><relname> <separator> <relname><marker>[Right]",
        )
    })?;
    let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());

    let lcard = group("lcard");
    let rcard = group("rcard");

    let left_kind = if lcard.contains("++") {
        RelationKind::MultiOwning
    } else if rcard.contains('*') {
        RelationKind::Multi
    } else {
        RelationKind::Single
    };
    let right_kind = if rcard.contains("++") {
        RelationKind::MultiOwning
    } else if lcard.contains('*') {
        RelationKind::Multi
    } else {
        RelationKind::Single
    };

    let decl = RelationshipDecl::new(
        RelationshipEndpoint::new(group("lclass"), Some(group("lrel")), left_kind),
        RelationshipEndpoint::new(group("rclass"), Some(group("rrel")), right_kind),
    );
    if decl.is_valid_orientation() {
        return Ok(Some(decl));
    }

    let swapped = decl.swapped();
    if swapped.is_valid_orientation() {
        return Ok(Some(swapped));
    }
    // Report with the endpoints as written.
    Err(swapped.swapped().resolve("").err().unwrap_or_else(|| {
        ambiguous(line, "relationship kinds do not form a permitted orientation")
    }))
}

/// Parse a block of yUML text read from `source`, one relationship per
/// line, in input order.
///
/// A line that cannot be parsed is reported through `diagnostics` at
/// `source:line:1` and skipped; in strict mode the first such line aborts.
///
/// # Errors
///
/// Returns the diagnostic that aborted parsing.
pub fn parse_yuml(
    source: &str,
    text: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<RelationshipDecl>, Diagnostic> {
    let mut decls = Vec::new();
    for (i, line) in text.lines().enumerate() {
        match parse_yuml_line(line) {
            Ok(Some(decl)) => decls.push(decl),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(line = i + 1, "skipping relationship line: {e}");
                diagnostics.report_notation(&Location::new(source).at(i + 1, 1), e)?;
            }
        }
    }
    Ok(decls)
}

/// Parse one compact relationship string (`Pod(fans) 1:MC (pod)Fan`).
///
/// # Errors
///
/// [`SpecError::AmbiguousNotation`] if the string does not match.
pub fn parse_schema_notation(text: &str) -> Result<RelationshipDecl, SpecError> {
    let caps = compact_line()?
        .captures(text)
        .ok_or_else(|| ambiguous(text, "expected Left 1:1|1:M|1:MC|M:M Right"))?;
    let card = caps.name("card").map_or("", |m| m.as_str());
    let (left_kind, right_kind) = kinds_for_cardinality(card)
        .ok_or_else(|| ambiguous(text, "unknown cardinality"))?;

    let side = |name: &str, kind: RelationKind| -> Result<RelationshipEndpoint, SpecError> {
        let raw = caps.name(name).map_or("", |m| m.as_str());
        let parts = compact_side()?
            .captures(raw)
            .ok_or_else(|| ambiguous(text, &format!("{name} side '{raw}' is not valid")))?;
        let relname = parts.name("pre").or_else(|| parts.name("post")).map(|m| m.as_str());
        let class = parts.name("class").map_or("", |m| m.as_str());
        Ok(RelationshipEndpoint::new(class, relname, kind))
    };

    Ok(RelationshipDecl::new(
        side("left", left_kind)?,
        side("right", right_kind)?,
    ))
}

/// Parse one relationship string in either notation. A string starting with
/// `[` is read as yUML, anything else as compact notation.
///
/// # Errors
///
/// As for [`parse_yuml_line`] and [`parse_schema_notation`]; a yUML comment
/// or blank string is [`SpecError::AmbiguousNotation`] here.
pub fn parse_relationship(text: &str) -> Result<RelationshipDecl, SpecError> {
    if text.trim_start().starts_with('[') {
        parse_yuml_line(text)?.ok_or_else(|| ambiguous(text, "no relationship on this line"))
    } else {
        parse_schema_notation(text)
    }
}
