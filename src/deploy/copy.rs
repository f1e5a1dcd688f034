// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Copy deployment strategy.
//!
//! The default strategy: command documents are read from the source tree,
//! their knowledge references rewritten for the resolved target, and the
//! result written into the command root; knowledge documents are copied
//! byte-for-byte into the knowledge root; finally the ledger records the
//! deployed version. Re-running against an unchanged source tree rewrites
//! the same bytes, so installs are idempotent.
//!
//! There is no rollback: pre-flight validation is the only transactional
//! guarantee, and an I/O failure mid-write leaves already-written files in
//! place. The ledger write coming last keeps a half-finished run from ever
//! claiming a version it did not fully deploy.

use crate::{
    artifact::ArtifactSet,
    config::PluginManifest,
    deploy::{
        self, ledger,
        ledger::InstallState,
        transform, DeployError, DeploySummary, Deployment, Result,
    },
    target::Target,
};

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Deploys the artifact set by transform-and-copy into the target roots.
#[derive(Debug)]
pub struct CopyDeployer<'a> {
    manifest: &'a PluginManifest,
    source_root: PathBuf,
}

impl<'a> CopyDeployer<'a> {
    /// Construct new copy deployer over a plugin source tree.
    pub fn new(manifest: &'a PluginManifest, source_root: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            source_root: source_root.into(),
        }
    }
}

impl Deployment for CopyDeployer<'_> {
    /// Deploy by transforming command documents and copying knowledge ones.
    ///
    /// Strict order: classify the run from the ledger, validate every source,
    /// write command documents, copy knowledge documents, write the ledger.
    /// No step begins until the previous one fully succeeded, and a matching
    /// ledger version still re-deploys every file to guarantee consistency.
    ///
    /// # Errors
    ///
    /// - Return [`DeployError::Validate`] if any declared source is missing;
    ///   nothing has been written at that point.
    /// - Return a path-tagged I/O variant if a write fails; already-written
    ///   files from this run stay in place.
    #[instrument(skip(self, target), level = "debug")]
    fn deploy(&self, target: &Target) -> Result<DeploySummary> {
        let version = self.manifest.settings.version.as_str();
        match ledger::classify(&target.ledger_path, version) {
            InstallState::Fresh => info!("fresh install at {}", target.label()),
            InstallState::UpToDate(current) => {
                info!("version {current} already deployed, re-deploying for consistency");
            }
            InstallState::Upgrade { from } => info!("upgrading {from} -> {version}"),
        }

        // INVARIANT: No destination write until the whole set validates.
        let set = ArtifactSet::validate(self.manifest, &self.source_root)?;

        deploy::make_dir_tree(&target.command_root)?;
        deploy::make_dir_tree(&target.knowledge_root)?;

        for artifact in &set.commands {
            let text = fs::read_to_string(&artifact.source).map_err(|err| {
                DeployError::ReadSource {
                    source: err,
                    path: artifact.source.clone(),
                }
            })?;
            let rewritten = transform::rewrite_references(&text, &target.addressing_prefix);
            let destination = target.command_root.join(&artifact.file_name);
            fs::write(&destination, rewritten).map_err(|err| DeployError::WriteArtifact {
                source: err,
                path: destination.clone(),
            })?;
        }

        for artifact in &set.knowledge {
            let destination = target.knowledge_root.join(&artifact.file_name);
            fs::copy(&artifact.source, &destination).map_err(|err| {
                DeployError::WriteArtifact {
                    source: err,
                    path: destination.clone(),
                }
            })?;
        }

        // Ledger last: it must never claim a version that was not fully
        // written out.
        ledger::write(&target.ledger_path, version)?;

        info!(
            "deployed {} command and {} knowledge document(s) to {}",
            set.commands.len(),
            set.knowledge.len(),
            target.label()
        );

        Ok(DeploySummary {
            commands: set.commands.len(),
            knowledge: set.knowledge.len(),
            skipped: Vec::new(),
            roster: roster(self.manifest),
            target_label: target.label(),
        })
    }

    /// Remove a previous copy deployment.
    ///
    /// Sweeps the two owned roots, deletes the ledger, then prunes the
    /// knowledge root's parent only if nothing else lives there.
    #[instrument(skip(self, target), level = "debug")]
    fn undeploy(&self, target: &Target) -> Result<usize> {
        let mut removed = deploy::sweep_owned_dir(&target.command_root)?;
        ledger::delete(&target.ledger_path)?;
        removed += deploy::sweep_owned_dir(&target.knowledge_root)?;

        // Never force-remove: the parent may hold files this tool did not
        // create.
        if let Some(parent) = parent_dir(&target.knowledge_root) {
            deploy::prune_if_empty(&parent)?;
        }

        info!("removed {removed} file(s) from {}", target.label());

        Ok(removed)
    }
}

pub(crate) fn roster(manifest: &PluginManifest) -> Vec<(String, String)> {
    manifest
        .commands
        .iter()
        .map(|spec| (spec.name.clone(), spec.description.clone()))
        .collect()
}

pub(crate) fn parent_dir(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
