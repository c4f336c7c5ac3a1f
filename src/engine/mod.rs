//! Symlink lifecycle engine.
//!
//! Iterates the ordered list of configured links once per invocation:
//! evaluate condition → classify → resolve conflict if any → materialize or
//! skip → report state. Mutation is strictly sequential and entry-order
//! dependent; later entries observe earlier entries' effects, which is what
//! makes re-linking idempotent.

pub mod classify;
pub mod condition;
pub mod conflict;
pub mod state;

pub use state::{LinkState, LinkStatus, RemoveOutcome, RemoveState};

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::backup::{self, BackupEntry};
use crate::config::LinkSpec;
use crate::environment::Environment;
use crate::error::LinkError;
use crate::fsutil;
use crate::logging::Logger;
use conflict::{ConflictAction, ConflictResolver, ConflictResponder};

/// Behaviour flags for an engine pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Report every mutation instead of performing it.
    pub dry_run: bool,
    /// Resolve conflicts by backing up and replacing, without prompting.
    pub force: bool,
    /// Never prompt; conflicting entries are skipped with a warning.
    /// Callers fold the terminal's interactivity into this flag.
    pub no_interactive: bool,
}

/// Everything a mutating pass produced: per-entry states plus the backups
/// actually written (empty in dry-run mode).
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Per-entry outcomes, in configured order.
    pub states: Vec<LinkState>,
    /// Backups written during this pass.
    pub backups: Vec<BackupEntry>,
}

/// Orchestrates condition evaluation, classification, conflict resolution,
/// and link materialization for a run.
#[derive(Debug)]
pub struct SymlinkEngine<'a> {
    root: &'a Path,
    env: &'a Environment,
    log: &'a Logger,
    opts: EngineOptions,
    resolver: ConflictResolver<'a>,
}

impl<'a> SymlinkEngine<'a> {
    /// Create an engine for one run.
    pub fn new(
        root: &'a Path,
        env: &'a Environment,
        log: &'a Logger,
        opts: EngineOptions,
        responder: Box<dyn ConflictResponder + 'a>,
    ) -> Self {
        let resolver = ConflictResolver::new(opts.force, opts.no_interactive, responder, log);
        Self {
            root,
            env,
            log,
            opts,
            resolver,
        }
    }

    /// Resolve a spec's target to an absolute path and verify it stays
    /// inside the home directory. Runs before any mutation.
    fn checked_target(&self, spec: &LinkSpec) -> Result<PathBuf, LinkError> {
        let target = classify::normalize(&self.env.home.join(&spec.target));
        if !target.starts_with(&self.env.home) {
            return Err(LinkError::TargetOutsideHome {
                target,
                home: self.env.home.clone(),
            });
        }
        Ok(target)
    }

    /// Apply every spec in configured order.
    ///
    /// Per-entry problems (missing source, unresolved conflict) are
    /// reported in the returned states and never abort the run. Integrity
    /// violations and operator abort fail the whole run; entries already
    /// applied remain applied.
    ///
    /// # Errors
    ///
    /// Returns an error on a path-escape integrity violation, operator
    /// abort, or an I/O failure while mutating.
    pub fn apply(&mut self, specs: &[LinkSpec]) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();
        for spec in specs {
            let source = self.root.join(&spec.source);

            if let Some(reason) = condition::skip_reason(spec.condition.as_ref(), self.env) {
                self.log.debug(&format!("skipping {}: {reason}", spec.source));
                let target = self.env.home.join(&spec.target);
                report
                    .states
                    .push(LinkState::new(source, target, LinkStatus::Missing).with_note(reason));
                continue;
            }

            let target = self.checked_target(spec)?;

            let state = match classify::classify(&source, &target) {
                LinkStatus::SourceMissing => {
                    self.log
                        .warn(&format!("source missing: {}", source.display()));
                    LinkState::new(source, target, LinkStatus::SourceMissing)
                }
                LinkStatus::Linked => {
                    self.log
                        .debug(&format!("already linked: {}", target.display()));
                    LinkState::new(source, target, LinkStatus::Linked)
                }
                LinkStatus::Missing => {
                    self.create_link(&source, &target)?;
                    LinkState::new(source, target, LinkStatus::Linked)
                }
                LinkStatus::Conflict | LinkStatus::Backup => {
                    self.handle_conflict(source, target, &mut report.backups)?
                }
            };
            report.states.push(state);
        }
        Ok(report)
    }

    /// Resolve and apply a conflict decision for one entry.
    fn handle_conflict(
        &mut self,
        source: PathBuf,
        target: PathBuf,
        backups: &mut Vec<BackupEntry>,
    ) -> Result<LinkState> {
        match self.resolver.resolve(&source, &target)? {
            ConflictAction::Abort => Err(LinkError::Aborted.into()),
            ConflictAction::Skip => {
                self.log
                    .debug(&format!("left in conflict: {}", target.display()));
                Ok(LinkState::new(source, target, LinkStatus::Conflict))
            }
            ConflictAction::Overwrite => {
                if self.opts.dry_run {
                    self.log
                        .dry_run(&format!("would overwrite {}", target.display()));
                } else {
                    fsutil::remove_occupant(&target)
                        .with_context(|| format!("remove existing: {}", target.display()))?;
                }
                self.create_link(&source, &target)?;
                Ok(LinkState::new(source, target, LinkStatus::Linked))
            }
            ConflictAction::Backup => {
                let backup_path = if self.opts.dry_run {
                    let name =
                        backup::backup_name(&target, chrono::Utc::now().timestamp_millis());
                    self.log.dry_run(&format!(
                        "would back up {} to {}",
                        target.display(),
                        name.display()
                    ));
                    name
                } else {
                    let entry = backup::backup(&target)?;
                    self.log.info(&format!(
                        "backed up {} to {}",
                        target.display(),
                        entry.backup.display()
                    ));
                    let path = entry.backup.clone();
                    backups.push(entry);
                    path
                };
                self.create_link(&source, &target)?;
                // Status stays `backup` (not bare `linked`) so callers can
                // see a displacement happened.
                Ok(LinkState::new(source, target, LinkStatus::Backup).with_backup(backup_path))
            }
        }
    }

    /// Create the symlink at `target` pointing to `source`, making the
    /// parent directory first. In dry-run mode this only reports.
    fn create_link(&self, source: &Path, target: &Path) -> Result<()> {
        if self.opts.dry_run {
            self.log.dry_run(&format!(
                "would link {} -> {}",
                target.display(),
                source.display()
            ));
            return Ok(());
        }
        fsutil::ensure_parent_dir(target)?;
        std::os::unix::fs::symlink(source, target)
            .with_context(|| format!("create link: {}", target.display()))?;
        self.log.debug(&format!(
            "linked {} -> {}",
            target.display(),
            source.display()
        ));
        Ok(())
    }

    /// Remove every applicable entry's target, but only when it currently
    /// is a symbolic link; anything else is left in place and reported.
    ///
    /// # Errors
    ///
    /// Returns an error on a path-escape integrity violation or an I/O
    /// failure while removing.
    pub fn remove(&mut self, specs: &[LinkSpec]) -> Result<Vec<RemoveState>> {
        let mut states = Vec::new();
        for spec in specs {
            if let Some(reason) = condition::skip_reason(spec.condition.as_ref(), self.env) {
                self.log.debug(&format!("skipping {}: {reason}", spec.source));
                continue;
            }
            let target = self.checked_target(spec)?;

            let outcome = match std::fs::symlink_metadata(&target) {
                Err(_) => RemoveOutcome::Absent,
                Ok(meta) if meta.is_symlink() => {
                    if self.opts.dry_run {
                        self.log
                            .dry_run(&format!("would remove {}", target.display()));
                    } else {
                        std::fs::remove_file(&target)
                            .with_context(|| format!("remove link: {}", target.display()))?;
                        self.log.debug(&format!("removed {}", target.display()));
                    }
                    RemoveOutcome::Removed
                }
                Ok(_) => {
                    self.log.info(&format!(
                        "not a symlink, leaving in place: {}",
                        target.display()
                    ));
                    RemoveOutcome::NotASymlink
                }
            };
            states.push(RemoveState { target, outcome });
        }
        Ok(states)
    }

    /// Read-only classification of every entry for reporting. Entries that
    /// do not apply on this machine are marked distinctly (missing status
    /// with the skip reason as note) from genuinely absent ones.
    ///
    /// # Errors
    ///
    /// Returns an error on a path-escape integrity violation.
    pub fn status(&self, specs: &[LinkSpec]) -> Result<Vec<LinkState>> {
        let mut states = Vec::new();
        for spec in specs {
            let source = self.root.join(&spec.source);

            if let Some(reason) = condition::skip_reason(spec.condition.as_ref(), self.env) {
                let target = self.env.home.join(&spec.target);
                states.push(
                    LinkState::new(source, target, LinkStatus::Missing)
                        .with_note(format!("skipped: {reason}")),
                );
                continue;
            }

            let target = self.checked_target(spec)?;
            let status = classify::classify(&source, &target);
            let mut state = LinkState::new(source, target, status);
            if status == LinkStatus::Conflict {
                if let Some(note) = occupant_note(&state.target) {
                    state = state.with_note(note);
                }
            }
            states.push(state);
        }
        Ok(states)
    }
}

/// Describe what occupies a conflicting target path.
fn occupant_note(target: &Path) -> Option<String> {
    let meta = std::fs::symlink_metadata(target).ok()?;
    if meta.is_symlink() {
        let dest = std::fs::read_link(target).ok()?;
        Some(format!("points to {}", dest.display()))
    } else if meta.is_dir() {
        Some("directory in the way".to_string())
    } else {
        Some("regular file in the way".to_string())
    }
}
