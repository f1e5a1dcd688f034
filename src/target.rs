// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Deployment target resolution.
//!
//! A __target__ is one of the two destination trees a deployment can land in:
//! the global tree rooted at the user's home directory, or the local tree
//! rooted at the working directory of the current process. Resolving a target
//! derives every path the deployment strategies need up front, so the rest of
//! the engine never has to reason about global versus local again.
//!
//! # Addressing Prefix
//!
//! Command documents reference knowledge documents through a bare
//! `@knowledge/` marker. At install time that marker is rewritten to an
//! __addressing prefix__ that resolves from wherever the document ends up:
//! the home-relative symbolic form (`~/...`) for the global target, and a
//! working-directory-relative form for the local target. The prefix is
//! computed here because it is a property of the target, not of the
//! documents.

use crate::config::PluginManifest;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Selector for one of the two deployment roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// User-wide tree rooted at the home directory.
    Global,

    /// Project tree rooted at the working directory.
    Local,
}

impl TargetKind {
    /// Both selectors, in display order.
    pub const ALL: [TargetKind; 2] = [TargetKind::Global, TargetKind::Local];
}

impl Display for TargetKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Global => fmt.write_str("global"),
            Self::Local => fmt.write_str("local"),
        }
    }
}

impl FromStr for TargetKind {
    type Err = TargetError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "global" => Ok(Self::Global),
            "local" => Ok(Self::Local),
            other => Err(TargetError::InvalidMode(other.to_string())),
        }
    }
}

/// A fully resolved deployment target.
///
/// Resolution is pure and total over the two kinds; no filesystem access
/// happens here, and none of the returned paths are checked for existence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Which of the two roots this target resolves.
    pub kind: TargetKind,

    /// Directory that receives transformed command documents.
    pub command_root: PathBuf,

    /// Directory that receives byte-copied knowledge documents.
    pub knowledge_root: PathBuf,

    /// Version marker file, colocated with the knowledge root's parent.
    pub ledger_path: PathBuf,

    /// Prefix substituted for the knowledge marker in command documents.
    pub addressing_prefix: String,
}

impl Target {
    /// Resolve a target from its kind and the two path anchors.
    pub fn resolve(
        kind: TargetKind,
        home: impl AsRef<Path>,
        work_dir: impl AsRef<Path>,
        manifest: &PluginManifest,
    ) -> Self {
        let config_root = manifest.settings.config_root.as_str();
        let name = manifest.settings.name.as_str();
        let (root, addressing_prefix) = match kind {
            TargetKind::Global => (
                home.as_ref(),
                format!("~/{config_root}/{name}/knowledge"),
            ),
            TargetKind::Local => (
                work_dir.as_ref(),
                format!("{config_root}/{name}/knowledge"),
            ),
        };

        let plugin_root = root.join(config_root).join(name);

        Self {
            kind,
            command_root: root.join(config_root).join("commands").join(name),
            knowledge_root: plugin_root.join("knowledge"),
            ledger_path: plugin_root.join(".version"),
            addressing_prefix,
        }
    }

    /// Human-readable description used in summaries and logs.
    pub fn label(&self) -> String {
        format!("{} target ({})", self.kind, self.command_root.display())
    }
}

/// Target resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// Caller handed a mode selector outside the two known roots.
    #[error("invalid deployment mode {0:?}, expected \"global\" or \"local\"")]
    InvalidMode(String),
}
