// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Symlink deployment strategy.
//!
//! Alternate strategy that links pristine source documents into the target
//! roots instead of copying them, so edits to the checkout show up at the
//! destination immediately. No reference rewrite happens (links point at the
//! pristine sources) and no ledger is kept; the links themselves are the
//! deployment record.
//!
//! Every destination is classified before anything happens: absent, already
//! correct, drifted (a symlink pointing somewhere else), or occupied by a
//! regular file. Drift and occupation are never resolved silently. Without
//! the force flag the artifact is skipped with a warning and the run reports
//! partial completion; with it, the offending destination is replaced.

use crate::{
    artifact::{Artifact, ArtifactSet},
    config::PluginManifest,
    deploy::{self, copy, DeployError, DeploySummary, Deployment, Result, Skip},
    target::Target,
};

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

/// What happened to one artifact during a symlink run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Fresh symlink created at the destination.
    Installed,

    /// Destination left untouched, with the reason and whether it hides
    /// drift the user should resolve.
    Skipped { reason: String, drifted: bool },

    /// Drifted or occupied destination replaced under force.
    Overwritten,
}

/// How a destination currently relates to the link we would create there.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LinkState {
    /// Nothing at the destination.
    Absent,

    /// Symlink already pointing at the expected source.
    Correct,

    /// Symlink pointing somewhere else.
    Drifted(PathBuf),

    /// Regular file sitting where the link should go.
    Occupied,
}

/// Deploys the artifact set as per-artifact symlinks to pristine sources.
#[derive(Debug)]
pub struct SymlinkDeployer<'a> {
    manifest: &'a PluginManifest,
    source_root: PathBuf,
    force: bool,
    dry_run: bool,
}

impl<'a> SymlinkDeployer<'a> {
    /// Construct new symlink deployer over a plugin source tree.
    pub fn new(manifest: &'a PluginManifest, source_root: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            source_root: source_root.into(),
            force: false,
            dry_run: false,
        }
    }

    /// Replace drifted or occupied destinations instead of skipping them.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Report every action without mutating the filesystem.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn link_artifact(&self, artifact: &Artifact, dest_dir: &Path) -> Result<LinkOutcome> {
        // Absolute source so the link resolves from anywhere.
        let source = fs::canonicalize(&artifact.source).map_err(|err| {
            DeployError::ReadSource {
                source: err,
                path: artifact.source.clone(),
            }
        })?;
        let destination = dest_dir.join(&artifact.file_name);

        match classify_destination(&destination, &source)? {
            LinkState::Correct => Ok(LinkOutcome::Skipped {
                reason: "already linked".to_string(),
                drifted: false,
            }),
            LinkState::Absent => {
                if self.dry_run {
                    info!("would link {:?} -> {:?}", destination.display(), source.display());
                    return Ok(LinkOutcome::Installed);
                }
                make_symlink(&source, &destination).map_err(|err| DeployError::ManageLink {
                    source: err,
                    path: destination.clone(),
                })?;
                Ok(LinkOutcome::Installed)
            }
            LinkState::Drifted(actual) => self.replace_or_skip(
                &source,
                &destination,
                format!("points at {:?} instead of the source", actual.display()),
            ),
            LinkState::Occupied => self.replace_or_skip(
                &source,
                &destination,
                "occupied by a regular file".to_string(),
            ),
        }
    }

    fn replace_or_skip(
        &self,
        source: &Path,
        destination: &Path,
        reason: String,
    ) -> Result<LinkOutcome> {
        if !self.force {
            warn!(
                "skipping {:?}: {reason} (re-run with --force to replace)",
                destination.display()
            );
            return Ok(LinkOutcome::Skipped {
                reason,
                drifted: true,
            });
        }

        if self.dry_run {
            info!("would replace {:?} ({reason})", destination.display());
            return Ok(LinkOutcome::Overwritten);
        }

        fs::remove_file(destination).map_err(|err| DeployError::Remove {
            source: err,
            path: destination.to_path_buf(),
        })?;
        make_symlink(source, destination).map_err(|err| DeployError::ManageLink {
            source: err,
            path: destination.to_path_buf(),
        })?;

        Ok(LinkOutcome::Overwritten)
    }

    fn link_batch(
        &self,
        artifacts: &[Artifact],
        dest_dir: &Path,
        skipped: &mut Vec<Skip>,
    ) -> Result<usize> {
        let mut linked = 0;
        for artifact in artifacts {
            match self.link_artifact(artifact, dest_dir)? {
                LinkOutcome::Installed | LinkOutcome::Overwritten => linked += 1,
                LinkOutcome::Skipped { reason, drifted } => {
                    skipped.push(Skip {
                        name: artifact.file_name.clone(),
                        reason,
                        drifted,
                    });
                }
            }
        }

        Ok(linked)
    }

    /// Remove every symlink directly inside `dir`, leaving regular files
    /// alone, then prune the directory if that emptied it.
    fn sweep_links(&self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Ok(0);
        }

        let entries = fs::read_dir(dir).map_err(|err| DeployError::Scan {
            source: err,
            path: dir.to_path_buf(),
        })?;

        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|err| DeployError::Scan {
                source: err,
                path: dir.to_path_buf(),
            })?;
            let path = entry.path();
            if !path.is_symlink() {
                // Never destroy user content found inside an owned root.
                warn!("leaving non-symlink {:?} in place", path.display());
                continue;
            }

            if self.dry_run {
                info!("would remove link {:?}", path.display());
            } else {
                fs::remove_file(&path).map_err(|err| DeployError::Remove {
                    source: err,
                    path: path.clone(),
                })?;
            }
            removed += 1;
        }

        if !self.dry_run {
            deploy::prune_if_empty(dir)?;
        }

        Ok(removed)
    }
}

impl Deployment for SymlinkDeployer<'_> {
    /// Deploy by linking every artifact into the target roots.
    ///
    /// # Errors
    ///
    /// - Return [`DeployError::Validate`] if any declared source is missing;
    ///   nothing has been linked at that point.
    /// - Return a path-tagged I/O variant if link inspection or creation
    ///   fails. Drift is not an error: the artifact is skipped and recorded
    ///   in the summary instead.
    #[instrument(skip(self, target), level = "debug")]
    fn deploy(&self, target: &Target) -> Result<DeploySummary> {
        // INVARIANT: No destination write until the whole set validates.
        let set = ArtifactSet::validate(self.manifest, &self.source_root)?;

        if !self.dry_run {
            deploy::make_dir_tree(&target.command_root)?;
            deploy::make_dir_tree(&target.knowledge_root)?;
        }

        let mut skipped = Vec::new();
        let commands = self.link_batch(&set.commands, &target.command_root, &mut skipped)?;
        let knowledge = self.link_batch(&set.knowledge, &target.knowledge_root, &mut skipped)?;

        info!(
            "linked {commands} command and {knowledge} knowledge document(s) to {} ({} skipped)",
            target.label(),
            skipped.len()
        );

        Ok(DeploySummary {
            commands,
            knowledge,
            skipped,
            roster: copy::roster(self.manifest),
            target_label: target.label(),
        })
    }

    /// Remove a previous symlink deployment.
    ///
    /// Only symlink destinations are removed; a regular file found inside an
    /// owned root is reported and left alone. Empty directories are pruned
    /// the same way the copy strategy prunes them.
    #[instrument(skip(self, target), level = "debug")]
    fn undeploy(&self, target: &Target) -> Result<usize> {
        let mut removed = self.sweep_links(&target.command_root)?;
        removed += self.sweep_links(&target.knowledge_root)?;

        if !self.dry_run {
            if let Some(parent) = copy::parent_dir(&target.knowledge_root) {
                deploy::prune_if_empty(&parent)?;
            }
        }

        info!("removed {removed} link(s) from {}", target.label());

        Ok(removed)
    }
}

fn classify_destination(destination: &Path, expected_source: &Path) -> Result<LinkState> {
    let metadata = match fs::symlink_metadata(destination) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(LinkState::Absent),
        Err(err) => {
            return Err(DeployError::ManageLink {
                source: err,
                path: destination.to_path_buf(),
            })
        }
    };

    if !metadata.file_type().is_symlink() {
        return Ok(LinkState::Occupied);
    }

    let actual = fs::read_link(destination).map_err(|err| DeployError::ManageLink {
        source: err,
        path: destination.to_path_buf(),
    })?;
    if actual == expected_source {
        Ok(LinkState::Correct)
    } else {
        Ok(LinkState::Drifted(actual))
    }
}

#[cfg(unix)]
fn make_symlink(source: &Path, destination: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, destination)
}

#[cfg(windows)]
fn make_symlink(source: &Path, destination: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(source, destination)
}
