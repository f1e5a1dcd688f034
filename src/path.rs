// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for the two anchors promptstow cares
//! about: the user's home directory, and the working directory of the current
//! process. Target resolution itself lives in [`crate::target`]; this module
//! only answers where those anchors are.

use std::path::PathBuf;

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(PathError::NoWayHome)
}

/// Determine absolute path to current working directory.
///
/// # Errors
///
/// - Return [`PathError::NoWorkDir`] if the working directory cannot be
///   determined, e.g., it was deleted out from under the process.
pub fn work_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(PathError::NoWorkDir)
}

/// Path anchor error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's home directory.
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// No way to determine current working directory.
    #[error("cannot determine current working directory")]
    NoWorkDir(#[source] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
