//! # Event Severity
//!
//! Severity levels used by thresholds and datasources. Documents may give a
//! severity either as an integer (0–5) or by name; the model always stores
//! the integer level, and serializes the canonical short name.
//!
//! | level | canonical | accepted aliases |
//! |-------|-----------|------------------|
//! | 5 | `crit`  | `critical` |
//! | 4 | `err`   | `error` |
//! | 3 | `warn`  | `warning` |
//! | 2 | `info`  | `information`, `informational` |
//! | 1 | `debug` | `debugging` |
//! | 0 | `clear` | |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value that names no severity level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid value for severity")]
pub struct InvalidSeverity(pub String);

/// Event severity, ordered from `Clear` (0) to `Critical` (5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Severity {
    /// 0
    Clear,
    /// 1
    Debug,
    /// 2
    Info,
    /// 3
    Warning,
    /// 4
    Error,
    /// 5
    Critical,
}

impl Severity {
    /// Returns all severities in ascending order.
    pub fn all() -> &'static [Severity] {
        &[
            Self::Clear,
            Self::Debug,
            Self::Info,
            Self::Warning,
            Self::Error,
            Self::Critical,
        ]
    }

    /// Returns the integer level.
    pub fn as_int(&self) -> i64 {
        match self {
            Self::Clear => 0,
            Self::Debug => 1,
            Self::Info => 2,
            Self::Warning => 3,
            Self::Error => 4,
            Self::Critical => 5,
        }
    }

    /// Returns the severity for an integer level.
    pub fn from_int(level: i64) -> Option<Self> {
        Self::all().get(usize::try_from(level).ok()?).copied()
    }

    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "err",
            Self::Critical => "crit",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = InvalidSeverity;

    /// Parses an integer level or a name (case-insensitive, aliases allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(level) = trimmed.parse::<i64>() {
            return Self::from_int(level).ok_or_else(|| InvalidSeverity(s.to_string()));
        }
        match trimmed.to_lowercase().as_str() {
            "crit" | "critical" => Ok(Self::Critical),
            "err" | "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warning),
            "info" | "information" | "informational" => Ok(Self::Info),
            "debug" | "debugging" => Ok(Self::Debug),
            "clear" => Ok(Self::Clear),
            _ => Err(InvalidSeverity(s.to_string())),
        }
    }
}

impl TryFrom<i64> for Severity {
    type Error = InvalidSeverity;

    fn try_from(level: i64) -> Result<Self, InvalidSeverity> {
        Self::from_int(level).ok_or_else(|| InvalidSeverity(level.to_string()))
    }
}

impl From<Severity> for i64 {
    fn from(severity: Severity) -> Self {
        severity.as_int()
    }
}
