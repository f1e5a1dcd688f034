// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Plugin manifest layout.
//!
//! Specify the layout of the manifest that declares what promptstow deploys:
//! the plugin's name, the configuration root it installs under, and the
//! roster of command documents it ships. File I/O is left to the caller to
//! figure out; the binary parses `manifest.toml` from the source tree when
//! present and falls back to the compiled-in default otherwise.
//!
//! # General Layout
//!
//! A manifest is composed of two basic parts: settings and the command
//! roster. The settings section defines how deployment paths are derived.
//! Each `[[command]]` entry declares one command document by name along with
//! a one-line description shown in install summaries and help output.
//!
//! Knowledge documents are deliberately absent from the manifest: they are
//! discovered from the source tree at validation time, so there is nothing
//! to declare for them besides the index file to leave behind.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Plugin manifest.
///
/// Immutable description of the artifact set this tool deploys. Declared
/// once, then threaded through target resolution, validation, and the
/// deployment strategies; tests inject smaller fake manifests the same way.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct PluginManifest {
    /// Settings controlling deployment path derivation.
    pub settings: ManifestSettings,

    /// Declared roster of command documents.
    #[serde(rename = "command")]
    pub commands: Vec<CommandSpec>,
}

impl Default for PluginManifest {
    /// Compiled-in manifest describing the shipped artifact set.
    fn default() -> Self {
        Self {
            settings: ManifestSettings::default(),
            commands: vec![
                CommandSpec::new("plan", "Draft an implementation plan for the described change"),
                CommandSpec::new("implement", "Carry out the current plan one step at a time"),
                CommandSpec::new("review", "Review working tree changes against the style notes"),
                CommandSpec::new("ship", "Prepare a changelog entry and release checklist"),
            ],
        }
    }
}

impl FromStr for PluginManifest {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut manifest: PluginManifest =
            toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on configuration root field.
        manifest.settings.config_root =
            shellexpand::full(manifest.settings.config_root.as_str())
                .map_err(ConfigError::ShellExpansion)?
                .into_owned();

        Ok(manifest)
    }
}

impl Display for PluginManifest {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Manifest settings.
///
/// Standard settings used to derive deployment paths for any target.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ManifestSettings {
    /// Plugin name used as the leaf directory under the configuration root.
    #[serde(default = "default_name")]
    pub name: String,

    /// Version string written to the ledger after a successful install.
    #[serde(default = "default_version")]
    pub version: String,

    /// Configuration root component, relative to home or working directory.
    #[serde(default = "default_config_root")]
    pub config_root: String,

    /// Knowledge directory index file excluded from discovery.
    #[serde(default = "default_knowledge_index")]
    pub knowledge_index: String,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            config_root: default_config_root(),
            knowledge_index: default_knowledge_index(),
        }
    }
}

fn default_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_config_root() -> String {
    ".agent".to_string()
}

fn default_knowledge_index() -> String {
    "README.md".to_string()
}

/// One declared command document.
#[derive(Debug, Default, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct CommandSpec {
    /// Stable name of the command; source file is `commands/<name>.md`.
    pub name: String,

    /// One-line human description shown in summaries and help output.
    pub description: String,
}

impl CommandSpec {
    /// Construct new command declaration.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Manifest error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize manifest.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize manifest.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on manifest.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}
