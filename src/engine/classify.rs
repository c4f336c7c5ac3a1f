//! Filesystem classification of a target path relative to its desired link.

use std::path::{Component, Path, PathBuf};

use super::state::LinkStatus;

/// Classify the state at `target` relative to the desired link to `source`.
///
/// Read-only and idempotent: classifying an already-linked target always
/// returns [`LinkStatus::Linked`] without mutation.
pub fn classify(source: &Path, target: &Path) -> LinkStatus {
    if std::fs::symlink_metadata(source).is_err() {
        return LinkStatus::SourceMissing;
    }
    match std::fs::symlink_metadata(target) {
        Err(_) => LinkStatus::Missing,
        Ok(meta) if meta.is_symlink() && points_at(target, source) => LinkStatus::Linked,
        Ok(_) => LinkStatus::Conflict,
    }
}

/// True when the link value stored at `link` resolves to `source`: either
/// the stored value equals `source` literally, or it resolves to `source`
/// after joining a relative value with the link's own parent directory.
fn points_at(link: &Path, source: &Path) -> bool {
    let Ok(value) = std::fs::read_link(link) else {
        return false;
    };
    if value == source {
        return true;
    }
    let resolved = if value.is_absolute() {
        value
    } else {
        link.parent().map_or(value.clone(), |p| p.join(&value))
    };
    normalize(&resolved) == normalize(source)
}

/// Lexically normalize a path: drop `.` components and resolve `..` against
/// the preceding component, without touching the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, so "/.." stays "/".
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
