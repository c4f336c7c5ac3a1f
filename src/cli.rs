//! Command-line interface definition.

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the dotlink engine.
#[derive(Parser, Debug)]
#[command(
    name = "dotlink",
    about = "Symlink-based dotfiles manager with backups and rollback",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the repository root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Materialize configured symlinks into the home directory
    Link(LinkOpts),
    /// Remove configured symlinks (never touches non-symlinks)
    Unlink,
    /// Report the state of every configured link
    Status,
    /// Revert the most recent link run
    Rollback,
    /// Manage backups of displaced files
    Backup {
        /// Backup operation to run.
        #[command(subcommand)]
        action: BackupAction,
    },
    /// Print version information
    Version,
}

/// Options for the `link` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct LinkOpts {
    /// Resolve conflicts by backing up and replacing, without prompting
    #[arg(short, long)]
    pub force: bool,

    /// Never prompt; conflicting entries are skipped
    #[arg(long)]
    pub no_interactive: bool,
}

/// Operations on the backup store.
#[derive(Subcommand, Debug, Clone)]
pub enum BackupAction {
    /// List backups found in the well-known directories
    List,
    /// Move a backup back over its original path
    Restore {
        /// Path of the backup file (`<original>.backup.<epoch-millis>`)
        path: std::path::PathBuf,
    },
    /// Remove backups beyond the retention thresholds
    Clean {
        /// Newest backups to keep per original file
        #[arg(long, default_value_t = 3)]
        keep: usize,

        /// Remove backups older than this many days
        #[arg(long = "max-age-days", default_value_t = 30)]
        max_age_days: u64,
    },
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_link() {
        let cli = Cli::parse_from(["dotlink", "link"]);
        assert!(matches!(cli.command, Command::Link(_)));
        assert!(!cli.global.dry_run);
    }

    #[test]
    fn parse_link_force() {
        let cli = Cli::parse_from(["dotlink", "link", "--force"]);
        if let Command::Link(opts) = cli.command {
            assert!(opts.force);
            assert!(!opts.no_interactive);
        } else {
            panic!("expected link command");
        }
    }

    #[test]
    fn parse_link_no_interactive() {
        let cli = Cli::parse_from(["dotlink", "link", "--no-interactive"]);
        if let Command::Link(opts) = cli.command {
            assert!(opts.no_interactive);
        } else {
            panic!("expected link command");
        }
    }

    #[test]
    fn parse_dry_run_short_and_long() {
        let cli = Cli::parse_from(["dotlink", "-d", "link"]);
        assert!(cli.global.dry_run);
        let cli = Cli::parse_from(["dotlink", "--dry-run", "status"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["dotlink", "--root", "/tmp/dots", "link"]);
        assert_eq!(
            cli.global.root,
            Some(std::path::PathBuf::from("/tmp/dots"))
        );
    }

    #[test]
    fn parse_unlink_status_rollback_version() {
        assert!(matches!(
            Cli::parse_from(["dotlink", "unlink"]).command,
            Command::Unlink
        ));
        assert!(matches!(
            Cli::parse_from(["dotlink", "status"]).command,
            Command::Status
        ));
        assert!(matches!(
            Cli::parse_from(["dotlink", "rollback"]).command,
            Command::Rollback
        ));
        assert!(matches!(
            Cli::parse_from(["dotlink", "version"]).command,
            Command::Version
        ));
    }

    #[test]
    fn parse_backup_list() {
        let cli = Cli::parse_from(["dotlink", "backup", "list"]);
        assert!(matches!(
            cli.command,
            Command::Backup {
                action: BackupAction::List
            }
        ));
    }

    #[test]
    fn parse_backup_restore_path() {
        let cli = Cli::parse_from(["dotlink", "backup", "restore", "/h/.zshrc.backup.100"]);
        if let Command::Backup {
            action: BackupAction::Restore { path },
        } = cli.command
        {
            assert_eq!(path, std::path::PathBuf::from("/h/.zshrc.backup.100"));
        } else {
            panic!("expected backup restore");
        }
    }

    #[test]
    fn parse_backup_clean_defaults() {
        let cli = Cli::parse_from(["dotlink", "backup", "clean"]);
        if let Command::Backup {
            action: BackupAction::Clean { keep, max_age_days },
        } = cli.command
        {
            assert_eq!(keep, 3);
            assert_eq!(max_age_days, 30);
        } else {
            panic!("expected backup clean");
        }
    }

    #[test]
    fn parse_backup_clean_overrides() {
        let cli = Cli::parse_from([
            "dotlink",
            "backup",
            "clean",
            "--keep",
            "5",
            "--max-age-days",
            "7",
        ]);
        if let Command::Backup {
            action: BackupAction::Clean { keep, max_age_days },
        } = cli.command
        {
            assert_eq!(keep, 5);
            assert_eq!(max_age_days, 7);
        } else {
            panic!("expected backup clean");
        }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["dotlink", "-v", "status"]);
        assert!(cli.verbose);
    }
}
