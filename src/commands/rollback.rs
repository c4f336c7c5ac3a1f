//! The `rollback` command: revert the most recent link run.

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::environment::Environment;
use crate::logging::Logger;
use crate::run_state;

/// Run the rollback command.
///
/// # Errors
///
/// Fails when no previous run state exists, or on an I/O error touching
/// the state document. Failures reverting individual entries are reported
/// and do not abort the rest.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let env = Environment::detect()?;

    log.stage("Rolling back");
    let report = run_state::rollback(&env.home, log, global.dry_run)?;

    log.info(&format!(
        "{} links removed, {} already absent, {} backups restored, {} failures",
        report.links_removed, report.links_absent, report.restored, report.failures
    ));

    if report.failures > 0 {
        anyhow::bail!("{} entries could not be reverted", report.failures);
    }
    Ok(())
}
