//! Per-entry outcome model for the symlink engine.

use std::fmt;
use std::path::PathBuf;

/// Classification of a target path relative to its desired link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Target is a symlink pointing at the source.
    Linked,
    /// Target path is absent (or the entry does not apply on this machine;
    /// see [`LinkState::note`]).
    Missing,
    /// Target is occupied by something other than the desired link.
    Conflict,
    /// The original occupant was moved aside and the link created.
    Backup,
    /// The source file does not exist in the repository.
    SourceMissing,
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkStatus::Linked => "linked",
            LinkStatus::Missing => "missing",
            LinkStatus::Conflict => "conflict",
            LinkStatus::Backup => "backup",
            LinkStatus::SourceMissing => "source-missing",
        };
        write!(f, "{s}")
    }
}

/// Result of evaluating one configured link.
///
/// Produced fresh each invocation; aggregated into run state or printed,
/// never persisted standalone.
#[derive(Debug, Clone)]
pub struct LinkState {
    /// Absolute source path in the repository.
    pub source: PathBuf,
    /// Absolute, resolved target path in the home directory.
    pub target: PathBuf,
    /// Outcome for this entry.
    pub status: LinkStatus,
    /// Where the displaced file went, when `status` is [`LinkStatus::Backup`].
    pub backup_path: Option<PathBuf>,
    /// Annotation such as a condition skip reason.
    pub note: Option<String>,
}

impl LinkState {
    /// Build a state with no backup path or note.
    #[must_use]
    pub fn new(source: PathBuf, target: PathBuf, status: LinkStatus) -> Self {
        Self {
            source,
            target,
            status,
            backup_path: None,
            note: None,
        }
    }

    /// Attach a backup path.
    #[must_use]
    pub fn with_backup(mut self, backup_path: PathBuf) -> Self {
        self.backup_path = Some(backup_path);
        self
    }

    /// Attach an annotation.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Outcome of one `unlink` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The symlink was removed (or would be, in dry-run mode).
    Removed,
    /// Nothing occupied the target path.
    Absent,
    /// The target exists but is not a symlink; left in place.
    NotASymlink,
}

/// Per-entry report for `unlink`.
#[derive(Debug, Clone)]
pub struct RemoveState {
    /// Absolute target path that was considered.
    pub target: PathBuf,
    /// What happened to it.
    pub outcome: RemoveOutcome,
}
