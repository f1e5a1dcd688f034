// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Version ledger management.
//!
//! The ledger is a single marker file colocated with the deployed knowledge
//! root's parent, containing exactly the deployed version string. It is the
//! only persisted state distinguishing "not installed" from "installed at
//! version V": absent before the first install, overwritten at the end of
//! every successful install, deleted on uninstall.
//!
//! Reads are deliberately soft: an absent and an unreadable ledger are
//! indistinguishable, both meaning "nothing trustworthy deployed here".
//! Writes happen only as the final step of a fully successful install, so a
//! run that dies halfway never leaves a ledger claiming a version that was
//! not completely written out.

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Read the deployed version at `path`, if any.
///
/// Soft read: any I/O failure, including plain absence, yields [`None`].
pub fn read(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|version| !version.is_empty())
}

/// Write `version` verbatim to the ledger at `path`.
///
/// Creates parent directories as needed.
///
/// # Errors
///
/// - Return [`LedgerError::CreateParent`] if the parent tree cannot be made.
/// - Return [`LedgerError::Write`] if the marker file cannot be written.
pub fn write(path: &Path, version: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        mkdirp::mkdirp(parent).map_err(|err| LedgerError::CreateParent {
            source: err,
            path: parent.to_path_buf(),
        })?;
    }

    fs::write(path, version).map_err(|err| LedgerError::Write {
        source: err,
        path: path.to_path_buf(),
    })
}

/// Delete the ledger at `path`. Absence is not an error.
///
/// # Errors
///
/// - Return [`LedgerError::Delete`] on any failure other than the file not
///   existing.
pub fn delete(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(LedgerError::Delete {
            source: err,
            path: path.to_path_buf(),
        }),
    }
}

/// How a pending install relates to whatever the ledger already records.
///
/// Informational only: classification never changes what gets written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallState {
    /// No prior version recorded at this target.
    Fresh,

    /// Recorded version equals the package version.
    UpToDate(String),

    /// Recorded version differs from the package version.
    Upgrade {
        /// Version currently recorded in the ledger.
        from: String,
    },
}

/// Classify a pending install against the ledger at `path`.
pub fn classify(path: &Path, package_version: &str) -> InstallState {
    let state = match read(path) {
        None => InstallState::Fresh,
        Some(version) if version == package_version => InstallState::UpToDate(version),
        Some(version) => InstallState::Upgrade { from: version },
    };
    debug!("ledger at {:?} classifies as {state:?}", path.display());

    state
}

/// Ledger error types.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Parent directory tree of the ledger cannot be created.
    #[error("failed to create ledger parent directory {:?}", path.display())]
    CreateParent {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Ledger marker file cannot be written.
    #[error("failed to write ledger {:?}", path.display())]
    Write {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Ledger marker file cannot be removed.
    #[error("failed to delete ledger {:?}", path.display())]
    Delete {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
type Result<T, E = LedgerError> = std::result::Result<T, E>;
