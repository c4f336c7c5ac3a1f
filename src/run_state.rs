//! Persistence of the most recent mutating run, and its reversal.
//!
//! Exactly one run state document exists per home directory, at a fixed
//! well-known path. Each install/link run overwrites it; `rollback`
//! consumes and deletes it, so a second rollback correctly reports that
//! there is nothing to roll back.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::backup::{self, BackupEntry};
use crate::error::StateError;
use crate::fsutil;
use crate::logging::Logger;

/// One created symlink recorded for rollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPair {
    /// Absolute source the link points at.
    pub source: PathBuf,
    /// Absolute target path of the link.
    pub target: PathBuf,
}

/// Record of the most recent mutating run: which command ran, every backup
/// written, and every link whose resulting status was linked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// When the run happened (RFC 3339).
    pub timestamp: String,
    /// Which operation produced this state (e.g. `"link"`).
    pub command: String,
    /// Backups written during the run, in order.
    pub backups: Vec<BackupEntry>,
    /// Links created during the run, in order.
    pub symlinks: Vec<LinkPair>,
}

impl RunState {
    /// Start an empty record for `command`, stamped now.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: command.to_string(),
            backups: Vec::new(),
            symlinks: Vec::new(),
        }
    }
}

/// Well-known location of the run state document for a home directory.
#[must_use]
pub fn state_file(home: &Path) -> PathBuf {
    home.join(".local/state/dotlink/last-run.json")
}

/// Persist `state`, overwriting any previous document.
///
/// # Errors
///
/// Returns an error if the document cannot be written.
pub fn record(home: &Path, state: &RunState) -> Result<(), StateError> {
    let path = state_file(home);
    let io_err = |source| StateError::Io {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(state).map_err(|e| StateError::Corrupt {
        path: path.clone(),
        message: e.to_string(),
    })?;
    std::fs::write(&path, json).map_err(io_err)
}

/// Load the persisted run state, if any.
///
/// # Errors
///
/// Returns an error if the document exists but cannot be read or parsed.
pub fn load(home: &Path) -> Result<Option<RunState>, StateError> {
    let path = state_file(home);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(StateError::Io { path, source }),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| StateError::Corrupt {
            path,
            message: e.to_string(),
        })
}

/// Counts from a completed rollback.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RollbackReport {
    /// Recorded links removed (or previewed for removal in dry-run mode).
    pub links_removed: u32,
    /// Recorded links already gone.
    pub links_absent: u32,
    /// Backups moved back into place.
    pub restored: u32,
    /// Entries that could not be reverted.
    pub failures: u32,
}

/// Invert the recorded run: remove every recorded link (tolerating
/// absence), move every backup back over its original path, then delete
/// the state document. Restoration is best-effort — a failure on one entry
/// is reported and the rest still proceed.
///
/// # Errors
///
/// Fails with [`StateError::NoPreviousRun`] when no state exists, or on an
/// I/O error touching the state document itself.
pub fn rollback(home: &Path, log: &Logger, dry_run: bool) -> Result<RollbackReport> {
    let state = load(home)?.ok_or(StateError::NoPreviousRun)?;
    log.info(&format!(
        "rolling back '{}' run from {}",
        state.command, state.timestamp
    ));

    let mut report = RollbackReport::default();

    for link in &state.symlinks {
        if std::fs::symlink_metadata(&link.target).is_err() {
            log.debug(&format!("already absent: {}", link.target.display()));
            report.links_absent += 1;
            continue;
        }
        if dry_run {
            log.dry_run(&format!("would remove {}", link.target.display()));
            report.links_removed += 1;
            continue;
        }
        match fsutil::remove_occupant(&link.target) {
            Ok(()) => {
                log.debug(&format!("removed {}", link.target.display()));
                report.links_removed += 1;
            }
            Err(e) => {
                log.error(&format!("remove {}: {e}", link.target.display()));
                report.failures += 1;
            }
        }
    }

    for entry in &state.backups {
        if dry_run {
            log.dry_run(&format!(
                "would restore {} from {}",
                entry.original.display(),
                entry.backup.display()
            ));
            report.restored += 1;
            continue;
        }
        match backup::restore(&entry.backup) {
            Ok(original) => {
                log.info(&format!("restored {}", original.display()));
                report.restored += 1;
            }
            Err(e) => {
                log.error(&format!("restore {}: {e}", entry.backup.display()));
                report.failures += 1;
            }
        }
    }

    if !dry_run {
        let path = state_file(home);
        std::fs::remove_file(&path).map_err(|source| StateError::Io { path, source })?;
    }

    Ok(report)
}
