//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! mode: lenient
//! leave_defaults: false
//! namespace: ZenPacks.acme.Widgets
//! ```
//!
//! Every field is optional. Command-line flags override the file, and each
//! subcommand supplies its own mode when neither sets one.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use zpl_codec::CompileOptions;
use zpl_core::Mode;

/// Settings read from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// `strict` or `lenient`.
    pub mode: Option<Mode>,
    /// Keep `DEFAULTS` entries in compiled trees.
    pub leave_defaults: Option<bool>,
    /// Namespace for documents without a `name`.
    pub namespace: Option<String>,
}

impl CliConfig {
    /// Load the configuration file, or the empty configuration when no path
    /// is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config: {}", path.display()))
    }

    /// Parse configuration text. An empty document is the empty
    /// configuration.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Compilation flags shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct CompileFlags {
    /// Abort on the first error.
    #[arg(long, conflicts_with = "lenient")]
    pub strict: bool,

    /// Report recoverable errors, skip the offending entries and continue.
    #[arg(long)]
    pub lenient: bool,

    /// Namespace for a document without a `name`.
    #[arg(long)]
    pub namespace: Option<String>,
}

impl CompileFlags {
    /// Mode and options after layering flags over the configuration file
    /// over the subcommand's own mode.
    pub fn resolve(&self, config: &CliConfig, fallback: Mode) -> (Mode, CompileOptions) {
        let mode = if self.strict {
            Mode::Strict
        } else if self.lenient {
            Mode::Lenient
        } else {
            config.mode.unwrap_or(fallback)
        };
        let options = CompileOptions {
            leave_defaults: config.leave_defaults.unwrap_or(false),
            namespace: self.namespace.clone().or_else(|| config.namespace.clone()),
        };
        (mode, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_has_no_settings() {
        assert_eq!(CliConfig::from_yaml("").unwrap(), CliConfig::default());
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn config_fields_parse() {
        let config =
            CliConfig::from_yaml("mode: lenient\nleave_defaults: true\nnamespace: ZenPacks.a.B\n")
                .unwrap();
        assert_eq!(config.mode, Some(Mode::Lenient));
        assert_eq!(config.leave_defaults, Some(true));
        assert_eq!(config.namespace.as_deref(), Some("ZenPacks.a.B"));
    }

    #[test]
    fn unknown_config_field_is_rejected() {
        assert!(CliConfig::from_yaml("verbosity: 3\n").is_err());
        assert!(CliConfig::from_yaml("mode: sloppy\n").is_err());
    }

    #[test]
    fn config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zpl.yaml");
        std::fs::write(&path, "mode: strict\n").unwrap();
        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.mode, Some(Mode::Strict));

        let missing = dir.path().join("missing.yaml");
        let err = CliConfig::load(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
    }

    #[test]
    fn flags_override_config() {
        let config = CliConfig {
            mode: Some(Mode::Lenient),
            leave_defaults: Some(true),
            namespace: Some("ZenPacks.config.Name".into()),
        };

        let (mode, options) = CompileFlags::default().resolve(&config, Mode::Strict);
        assert_eq!(mode, Mode::Lenient);
        assert!(options.leave_defaults);
        assert_eq!(options.namespace.as_deref(), Some("ZenPacks.config.Name"));

        let flags = CompileFlags {
            strict: true,
            namespace: Some("ZenPacks.flag.Name".into()),
            ..CompileFlags::default()
        };
        let (mode, options) = flags.resolve(&config, Mode::Lenient);
        assert_eq!(mode, Mode::Strict);
        assert_eq!(options.namespace.as_deref(), Some("ZenPacks.flag.Name"));
    }

    #[test]
    fn subcommand_mode_applies_last() {
        let (mode, options) = CompileFlags::default().resolve(&CliConfig::default(), Mode::Lenient);
        assert_eq!(mode, Mode::Lenient);
        assert_eq!(options, CompileOptions::default());
    }
}
