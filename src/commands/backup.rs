//! The `backup` command group: list, restore, and clean backups.
//!
//! These operate by directory scan of the backup naming pattern, so they
//! work even when run state has been lost or consumed.

use anyhow::Result;
use chrono::TimeZone as _;

use crate::backup::{self, RetentionPolicy};
use crate::cli::{BackupAction, GlobalOpts};
use crate::environment::Environment;
use crate::logging::Logger;

/// Run a backup subcommand.
///
/// # Errors
///
/// Returns an error if a restore fails or the environment cannot be
/// detected.
pub fn run(global: &GlobalOpts, action: &BackupAction, log: &Logger) -> Result<()> {
    let env = Environment::detect()?;

    match action {
        BackupAction::List => {
            log.stage("Backups");
            let entries = backup::list_all(&env.home);
            if entries.is_empty() {
                log.info("no backups found");
                return Ok(());
            }
            for entry in &entries {
                log.info(&format!(
                    "{}  {}  ({})",
                    format_instant(entry.timestamp),
                    entry.original.display(),
                    entry.backup.display()
                ));
            }
        }
        BackupAction::Restore { path } => {
            log.stage("Restoring backup");
            if global.dry_run {
                let entry = backup::parse(path)?;
                log.dry_run(&format!(
                    "would restore {} from {}",
                    entry.original.display(),
                    entry.backup.display()
                ));
                return Ok(());
            }
            let original = backup::restore(path)?;
            log.info(&format!("restored {}", original.display()));
        }
        BackupAction::Clean { keep, max_age_days } => {
            log.stage("Cleaning backups");
            let policy = RetentionPolicy {
                max_age_days: *max_age_days,
                keep_per_file: *keep,
            };
            let entries = backup::list_all(&env.home);
            if global.dry_run {
                let victims = backup::retention_victims(
                    policy,
                    &entries,
                    chrono::Utc::now().timestamp_millis(),
                );
                for victim in &victims {
                    log.dry_run(&format!("would remove {}", victim.backup.display()));
                }
                log.info(&format!("{} of {} backups would be removed", victims.len(), entries.len()));
                return Ok(());
            }
            let removed = backup::prune(policy, &entries);
            for entry in &removed {
                log.debug(&format!("removed {}", entry.backup.display()));
            }
            log.info(&format!(
                "{} of {} backups removed",
                removed.len(),
                entries.len()
            ));
        }
    }
    Ok(())
}

/// Render an epoch-millis instant for display.
fn format_instant(millis: i64) -> String {
    chrono::Utc
        .timestamp_millis_opt(millis)
        .single()
        .map_or_else(|| millis.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}
