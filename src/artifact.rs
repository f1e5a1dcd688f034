// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Artifact set declaration, discovery, and validation.
//!
//! The artifact set is the complete list of documents a deployment run
//! writes: the command documents declared by the manifest roster, and the
//! knowledge documents discovered from the source tree. Validation is the
//! transactional precondition of every install; no strategy touches the
//! filesystem until the whole set has been checked, and every missing
//! declared source is collected so the user sees the complete picture in one
//! run instead of playing whack-a-mole.

use crate::config::PluginManifest;

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Category of a deployable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Declared document whose content gets its references rewritten.
    Command,

    /// Discovered document copied byte-for-byte.
    Knowledge,
}

/// One deployable document, tied to its source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Stable name, without extension.
    pub name: String,

    /// Category deciding which destination root receives it.
    pub kind: ArtifactKind,

    /// Source file inside the plugin source tree.
    pub source: PathBuf,

    /// File name used at the destination.
    pub file_name: String,
}

/// The validated set of documents one run deploys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    /// Declared command documents, in roster order.
    pub commands: Vec<Artifact>,

    /// Discovered knowledge documents, in file name order.
    pub knowledge: Vec<Artifact>,
}

impl ArtifactSet {
    /// Validate declared commands and discover knowledge documents.
    ///
    /// Every declared command must have a source file at
    /// `<source_root>/commands/<name>.md`. Knowledge documents are whatever
    /// regular files sit in `<source_root>/knowledge/`, minus the index file
    /// named by the manifest; the set is discovered rather than declared, so
    /// only each discovered file's readability is checked. Performs no
    /// filesystem mutation of any kind.
    ///
    /// # Errors
    ///
    /// - Return [`ValidateError::MissingSources`] listing every declared
    ///   command whose source file is absent, never just the first.
    /// - Return [`ValidateError::ScanKnowledgeDir`] if the knowledge
    ///   directory exists but cannot be enumerated.
    /// - Return [`ValidateError::UnreadableSource`] if a discovered knowledge
    ///   file cannot be inspected.
    pub fn validate(manifest: &PluginManifest, source_root: impl AsRef<Path>) -> Result<Self> {
        let source_root = source_root.as_ref();
        let mut missing = Vec::new();
        let mut commands = Vec::new();

        for spec in &manifest.commands {
            let file_name = format!("{}.md", spec.name);
            let source = source_root.join("commands").join(&file_name);
            if source.is_file() {
                commands.push(Artifact {
                    name: spec.name.clone(),
                    kind: ArtifactKind::Command,
                    source,
                    file_name,
                });
            } else {
                // Keep collecting so the whole batch gets reported at once.
                missing.push(source);
            }
        }

        let knowledge = discover_knowledge(manifest, source_root)?;

        if !missing.is_empty() {
            return Err(ValidateError::MissingSources(missing));
        }

        debug!(
            "validated {} command and {} knowledge artifact(s)",
            commands.len(),
            knowledge.len()
        );

        Ok(Self {
            commands,
            knowledge,
        })
    }

    /// Total number of documents in the set.
    pub fn len(&self) -> usize {
        self.commands.len() + self.knowledge.len()
    }

    /// Check whether the set holds no documents at all.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.knowledge.is_empty()
    }
}

fn discover_knowledge(manifest: &PluginManifest, source_root: &Path) -> Result<Vec<Artifact>> {
    let knowledge_dir = source_root.join("knowledge");
    if !knowledge_dir.is_dir() {
        // A plugin without knowledge documents is odd but deployable.
        debug!("no knowledge directory at {:?}", knowledge_dir.display());
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(&knowledge_dir).map_err(|err| ValidateError::ScanKnowledgeDir {
        source: err,
        path: knowledge_dir.clone(),
    })?;

    let mut knowledge = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| ValidateError::ScanKnowledgeDir {
            source: err,
            path: knowledge_dir.clone(),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name == manifest.settings.knowledge_index {
            continue;
        }

        // Readability check only; the copy itself happens later.
        fs::metadata(&path).map_err(|err| ValidateError::UnreadableSource {
            source: err,
            path: path.clone(),
        })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        knowledge.push(Artifact {
            name,
            kind: ArtifactKind::Knowledge,
            source: path,
            file_name,
        });
    }

    knowledge.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(knowledge)
}

/// Artifact validation error types.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// One or more declared command sources are absent from the source tree.
    #[error("missing {} declared source artifact(s): {}", .0.len(), join_paths(.0))]
    MissingSources(Vec<PathBuf>),

    /// Knowledge directory exists but cannot be enumerated.
    #[error("failed to scan knowledge directory {:?}", path.display())]
    ScanKnowledgeDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Discovered knowledge file cannot be inspected.
    #[error("failed to read source artifact {:?}", path.display())]
    UnreadableSource {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Friendly result alias :3
type Result<T, E = ValidateError> = std::result::Result<T, E>;
