//! Timestamped backups of displaced files.
//!
//! A backup is the original file moved (not copied) to a sibling path named
//! `<original>.backup.<epoch-millis>`. The name alone is enough to
//! reconstruct the `(original, backup)` pair and its creation instant, so
//! listing and pruning work by directory scan, independent of run state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BackupError;
use crate::fsutil;

const SUFFIX: &str = ".backup.";

/// One displaced file and where its saved copy lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Absolute path that was displaced.
    pub original: PathBuf,
    /// Absolute path of the saved copy.
    pub backup: PathBuf,
    /// Creation instant, milliseconds since the Unix epoch. Also embedded
    /// in the backup file name.
    pub timestamp: i64,
}

/// Retention thresholds for [`prune`]. An entry is removed when *either*
/// threshold applies.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    /// Backups older than this many days are removed.
    pub max_age_days: u64,
    /// At most this many backups are kept per original path (newest first).
    pub keep_per_file: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age_days: 30,
            keep_per_file: 3,
        }
    }
}

/// Compute the backup path for `path` at the given instant.
#[must_use]
pub fn backup_name(path: &Path, millis: i64) -> PathBuf {
    PathBuf::from(format!("{}{SUFFIX}{millis}", path.display()))
}

/// Move `path` aside to a sibling backup path.
///
/// The rename stays within the parent directory, so it never crosses a
/// filesystem boundary.
///
/// # Errors
///
/// Returns an error if the rename fails.
pub fn backup(path: &Path) -> Result<BackupEntry, BackupError> {
    let mut millis = chrono::Utc::now().timestamp_millis();
    let mut dest = backup_name(path, millis);
    // Same path displaced twice within one millisecond: bump until free.
    while std::fs::symlink_metadata(&dest).is_ok() {
        millis += 1;
        dest = backup_name(path, millis);
    }
    std::fs::rename(path, &dest).map_err(|source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BackupEntry {
        original: path.to_path_buf(),
        backup: dest,
        timestamp: millis,
    })
}

/// Parse a backup path back into its entry.
///
/// # Errors
///
/// Returns [`BackupError::BadName`] when the path does not follow the
/// `<name>.backup.<epoch-millis>` grammar.
pub fn parse(backup_path: &Path) -> Result<BackupEntry, BackupError> {
    let bad = || BackupError::BadName(backup_path.to_path_buf());
    let s = backup_path.to_string_lossy();
    let idx = s.rfind(SUFFIX).ok_or_else(bad)?;
    let tail = &s[idx + SUFFIX.len()..];
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let timestamp: i64 = tail.parse().map_err(|_| bad())?;
    let original = PathBuf::from(&s[..idx]);
    if original.file_name().is_none() {
        return Err(bad());
    }
    Ok(BackupEntry {
        original,
        backup: backup_path.to_path_buf(),
        timestamp,
    })
}

/// Move a backup back over its original path, deleting any current
/// occupant (absence of an occupant is fine).
///
/// # Errors
///
/// Returns an error if the name cannot be parsed or a rename/removal fails.
pub fn restore(backup_path: &Path) -> Result<PathBuf, BackupError> {
    let entry = parse(backup_path)?;
    fsutil::remove_occupant(&entry.original).map_err(|source| BackupError::Io {
        path: entry.original.clone(),
        source,
    })?;
    std::fs::rename(&entry.backup, &entry.original).map_err(|source| BackupError::Io {
        path: entry.backup.clone(),
        source,
    })?;
    Ok(entry.original)
}

/// Scan the well-known directories for backups: the home directory itself,
/// plus `~/.config` recursively. Independent of run state, so backups
/// survive even when that is lost.
///
/// Results are ordered by original path, newest first within each path.
#[must_use]
pub fn list_all(home: &Path) -> Vec<BackupEntry> {
    let mut found = Vec::new();
    scan_dir(home, false, &mut found);
    scan_dir(&home.join(".config"), true, &mut found);
    found.sort_by(|a, b| {
        a.original
            .cmp(&b.original)
            .then(b.timestamp.cmp(&a.timestamp))
    });
    found
}

fn scan_dir(dir: &Path, recursive: bool, out: &mut Vec<BackupEntry>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if let Ok(parsed) = parse(&path) {
            // A backed-up directory is itself a backup; don't descend.
            out.push(parsed);
        } else if recursive {
            let is_real_dir = std::fs::symlink_metadata(&path)
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if is_real_dir {
                scan_dir(&path, true, out);
            }
        }
    }
}

/// Select the entries [`prune`] would remove, judged at `now_millis`:
/// beyond the per-file count (newest kept first) or older than the age
/// threshold — either condition alone is enough.
#[must_use]
pub fn retention_victims(
    policy: RetentionPolicy,
    entries: &[BackupEntry],
    now_millis: i64,
) -> Vec<BackupEntry> {
    let max_age_millis = i64::try_from(policy.max_age_days)
        .unwrap_or(i64::MAX)
        .saturating_mul(86_400_000);
    let cutoff = now_millis.saturating_sub(max_age_millis);

    let mut groups: BTreeMap<&Path, Vec<&BackupEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.original.as_path()).or_default().push(entry);
    }

    let mut victims = Vec::new();
    for (_, mut group) in groups {
        group.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        for (i, entry) in group.into_iter().enumerate() {
            if i >= policy.keep_per_file || entry.timestamp < cutoff {
                victims.push(entry.clone());
            }
        }
    }
    victims
}

/// Remove every entry [`retention_victims`] selects. Removal failures are
/// skipped (the entry stays on disk and is not reported as removed).
/// Returns the entries actually removed.
#[must_use]
pub fn prune(policy: RetentionPolicy, entries: &[BackupEntry]) -> Vec<BackupEntry> {
    let now = chrono::Utc::now().timestamp_millis();
    retention_victims(policy, entries, now)
        .into_iter()
        .filter(|entry| fsutil::remove_occupant(&entry.backup).is_ok())
        .collect()
}
