//! The `link` command: materialize configured symlinks.

use std::io::IsTerminal as _;

use anyhow::Result;

use crate::cli::{GlobalOpts, LinkOpts};
use crate::engine::conflict::StdinResponder;
use crate::engine::{EngineOptions, LinkStatus, SymlinkEngine};
use crate::logging::Logger;
use crate::run_state::{self, LinkPair, RunState};

/// Run the link command.
///
/// # Errors
///
/// Returns an error on configuration problems, a path-escape integrity
/// violation, operator abort, or an I/O failure while mutating.
pub fn run(global: &GlobalOpts, opts: &LinkOpts, log: &Logger) -> Result<()> {
    let session = super::session(global)?;

    log.stage("Linking");
    log.info(&format!(
        "{} configured links, repository {}",
        session.config.links.len(),
        session.config.root.display()
    ));

    let engine_opts = EngineOptions {
        dry_run: global.dry_run,
        force: opts.force,
        no_interactive: opts.no_interactive || !std::io::stdin().is_terminal(),
    };
    let mut engine = SymlinkEngine::new(
        &session.config.root,
        &session.env,
        log,
        engine_opts,
        Box::new(StdinResponder),
    );

    let report = engine.apply(&session.config.links)?;

    let mut linked = 0u32;
    let mut backed_up = 0u32;
    let mut conflicts = 0u32;
    let mut skipped = 0u32;
    let mut missing_sources = 0u32;
    for state in &report.states {
        match state.status {
            LinkStatus::Linked => linked += 1,
            LinkStatus::Backup => backed_up += 1,
            LinkStatus::Conflict => conflicts += 1,
            LinkStatus::Missing => skipped += 1,
            LinkStatus::SourceMissing => missing_sources += 1,
        }
    }
    log.info(&format!(
        "{linked} linked, {backed_up} backed up, {conflicts} conflicts, \
         {skipped} skipped, {missing_sources} missing sources"
    ));

    if global.dry_run {
        return Ok(());
    }

    // Persist the run for rollback: every link that now exists because of
    // this command (freshly linked or linked over a backed-up original),
    // plus the backups written.
    let mut state = RunState::new("link");
    state.backups = report.backups;
    state.symlinks = report
        .states
        .iter()
        .filter(|s| matches!(s.status, LinkStatus::Linked | LinkStatus::Backup))
        .map(|s| LinkPair {
            source: s.source.clone(),
            target: s.target.clone(),
        })
        .collect();
    run_state::record(&session.env.home, &state)?;

    Ok(())
}
