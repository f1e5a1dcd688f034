// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Deployment engine for agent command and knowledge documents.
//!
//! Promptstow ships a set of __command documents__ (reusable prompt
//! workflows) and __knowledge documents__ (the reference material those
//! workflows cite), and deploys them from a source checkout into one of two
//! well-known destination trees: a global tree under the user's home
//! directory, or a local tree under the current project.
//!
//! The engine is what lives here: target resolution, pre-flight source
//! validation, the content-transforming copy strategy, the version ledger,
//! and the alternate symlink strategy with drift detection. The CLI binary
//! in `src/bin` is a thin front-end that resolves a target (prompting if no
//! flag selected one) and hands it to a [`Deployment`] strategy.

pub mod artifact;
pub mod config;
pub mod deploy;
pub mod path;
pub mod target;

pub use artifact::{Artifact, ArtifactKind, ArtifactSet, ValidateError};
pub use config::{CommandSpec, ManifestSettings, PluginManifest};
pub use deploy::{
    copy::CopyDeployer,
    ledger::InstallState,
    symlink::{LinkOutcome, SymlinkDeployer},
    DeployError, DeploySummary, Deployment, Skip,
};
pub use target::{Target, TargetKind};
