//! The `unlink` command: remove configured symlinks.

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::engine::conflict::StdinResponder;
use crate::engine::{EngineOptions, RemoveOutcome, SymlinkEngine};
use crate::logging::Logger;

/// Run the unlink command.
///
/// Removes a target only when it currently is a symbolic link; regular
/// files and directories are never deleted.
///
/// # Errors
///
/// Returns an error on configuration problems, a path-escape integrity
/// violation, or an I/O failure while removing.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let session = super::session(global)?;

    log.stage("Removing links");
    let engine_opts = EngineOptions {
        dry_run: global.dry_run,
        ..EngineOptions::default()
    };
    let mut engine = SymlinkEngine::new(
        &session.config.root,
        &session.env,
        log,
        engine_opts,
        Box::new(StdinResponder),
    );

    let states = engine.remove(&session.config.links)?;

    let removed = states
        .iter()
        .filter(|s| s.outcome == RemoveOutcome::Removed)
        .count();
    let absent = states
        .iter()
        .filter(|s| s.outcome == RemoveOutcome::Absent)
        .count();
    let kept = states
        .iter()
        .filter(|s| s.outcome == RemoveOutcome::NotASymlink)
        .count();
    log.info(&format!(
        "{removed} removed, {absent} already absent, {kept} not symlinks (kept)"
    ));

    Ok(())
}
