// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Deployment strategies.
//!
//! Promptstow deploys the same artifact set in one of two ways: the __copy__
//! strategy writes transformed command documents and byte-copies knowledge
//! documents into the target, tracking the deployed version through a ledger
//! file; the __symlink__ strategy links the pristine sources into place
//! instead, trading the reference rewrite for in-place editing of the
//! checkout. Both strategies share target resolution and source validation
//! through the [`Deployment`] trait, so neither can disagree about where
//! things live.
//!
//! # Ownership
//!
//! A strategy exclusively owns the target's command root and knowledge root
//! trees, plus the ledger file. It never deletes a file outside those roots,
//! and a parent directory is pruned only once it holds nothing at all, so it
//! may contain artifacts this tool did not create.

pub mod copy;
pub mod ledger;
pub mod symlink;
pub mod transform;

use crate::{artifact::ValidateError, target::Target};

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Strategy seam shared by copy and symlink deployment.
pub trait Deployment {
    /// Deploy the whole artifact set into the resolved target.
    ///
    /// Validation is all-or-nothing: if any declared source is missing, the
    /// run aborts before a single destination write.
    fn deploy(&self, target: &Target) -> Result<DeploySummary>;

    /// Remove a previous deployment from the resolved target.
    ///
    /// Returns the number of files removed; zero means nothing was installed
    /// there, which is not an error.
    fn undeploy(&self, target: &Target) -> Result<usize>;
}

/// Outcome of one deployment run, for user display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploySummary {
    /// Command documents written or linked.
    pub commands: usize,

    /// Knowledge documents written or linked.
    pub knowledge: usize,

    /// Artifacts left untouched, with the reason each one was skipped.
    pub skipped: Vec<Skip>,

    /// Command roster (name, description) for the post-install cheat sheet.
    pub roster: Vec<(String, String)>,

    /// Human-readable description of the resolved target.
    pub target_label: String,
}

impl DeploySummary {
    /// Check whether any artifact was skipped because of drift.
    pub fn drifted(&self) -> bool {
        self.skipped.iter().any(|skip| skip.drifted)
    }
}

/// One artifact a run deliberately left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    /// Destination file name of the skipped artifact.
    pub name: String,

    /// Why it was skipped.
    pub reason: String,

    /// Whether the skip hides drift the user should resolve.
    pub drifted: bool,
}

/// Remove every regular file and symlink directly inside `dir`, then the
/// directory itself if that left it empty. Missing directory counts as zero.
///
/// Subdirectories are never descended into or removed: anything nested was
/// not deployed by this tool.
pub(crate) fn sweep_owned_dir(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in read_dir(dir)? {
        let entry = entry.map_err(|err| DeployError::Scan {
            source: err,
            path: dir.to_path_buf(),
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|err| DeployError::Scan {
            source: err,
            path: path.clone(),
        })?;
        if file_type.is_dir() {
            continue;
        }

        fs::remove_file(&path).map_err(|err| DeployError::Remove { source: err, path })?;
        removed += 1;
    }

    prune_if_empty(dir)?;

    Ok(removed)
}

/// Remove `dir` only when it holds no entries at all.
pub(crate) fn prune_if_empty(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }

    let mut entries = read_dir(dir)?;
    if entries.next().is_some() {
        debug!("leaving non-empty directory {:?} in place", dir.display());
        return Ok(false);
    }

    fs::remove_dir(dir).map_err(|err| DeployError::Remove {
        source: err,
        path: dir.to_path_buf(),
    })?;

    Ok(true)
}

/// Create `dir` and any missing parents.
pub(crate) fn make_dir_tree(dir: &Path) -> Result<()> {
    mkdirp::mkdirp(dir).map_err(|err| DeployError::CreateDir {
        source: err,
        path: dir.to_path_buf(),
    })?;

    Ok(())
}

fn read_dir(dir: &Path) -> Result<fs::ReadDir> {
    fs::read_dir(dir).map_err(|err| DeployError::Scan {
        source: err,
        path: dir.to_path_buf(),
    })
}

/// Deployment error types.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Pre-flight validation of the artifact set failed; nothing was written.
    #[error(transparent)]
    Validate(#[from] ValidateError),

    /// Ledger file manipulation failed.
    #[error(transparent)]
    Ledger(#[from] ledger::LedgerError),

    /// Destination directory cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Command document source cannot be read for transformation.
    #[error("failed to read source artifact {:?}", path.display())]
    ReadSource {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Transformed or copied artifact cannot be written to its destination.
    #[error("failed to write artifact {:?}", path.display())]
    WriteArtifact {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Symlink cannot be created or inspected at its destination.
    #[error("failed to manage symlink at {:?}", path.display())]
    ManageLink {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Previously deployed file or directory cannot be removed.
    #[error("failed to remove {:?}", path.display())]
    Remove {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Owned directory cannot be enumerated.
    #[error("failed to scan directory {:?}", path.display())]
    Scan {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = DeployError> = std::result::Result<T, E>;
