//! Domain-specific error types for the dotlink engine.
//!
//! Structured error hierarchy using [`thiserror`]. Internal modules return
//! typed errors (e.g. [`LinkError`], [`StateError`]) while command handlers
//! at the CLI boundary convert them to [`anyhow::Error`] via `?`.
//!
//! Fatal conditions (integrity violation, operator abort, missing rollback
//! state) are dedicated variants so callers can distinguish them from
//! per-entry failures, which are never raised as errors at all — they are
//! accumulated into the returned state list.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the dotlink engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum DotlinkError {
    /// Configuration-related error (TOML parsing, pattern validation, I/O).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Link materialization error (path escape, operator abort).
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// Backup creation, parsing, or restoration error.
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    /// Run-state persistence or rollback error.
    #[error("Run state error: {0}")]
    State(#[from] StateError),
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file contains a syntax or shape error.
    #[error("Invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A hostname condition carries an unparseable glob pattern.
    #[error("Invalid hostname pattern '{pattern}': {message}")]
    InvalidHostPattern {
        /// The offending pattern as written in the config.
        pattern: String,
        /// Diagnostic from the pattern compiler.
        message: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that abort a link run.
#[derive(Error, Debug)]
pub enum LinkError {
    /// A configured target resolves outside the home directory.
    ///
    /// This is a fatal integrity violation; it is raised before any
    /// filesystem mutation and never retried.
    #[error("target '{target}' resolves outside the home directory '{home}'")]
    TargetOutsideHome {
        /// The resolved (normalized) target path.
        target: PathBuf,
        /// The home directory it escaped.
        home: PathBuf,
    },

    /// The operator chose to abort at a conflict prompt.
    ///
    /// Entries applied earlier in the run remain applied; use `rollback`
    /// to revert them.
    #[error("aborted by user")]
    Aborted,
}

/// Errors from backup creation, name parsing, and restoration.
#[derive(Error, Debug)]
pub enum BackupError {
    /// The path does not follow the `<name>.backup.<millis>` grammar.
    #[error("'{0}' is not a backup file (expected <name>.backup.<epoch-millis>)")]
    BadName(PathBuf),

    /// An I/O error while moving a file to or from its backup location.
    #[error("IO error for backup of {path}: {source}")]
    Io {
        /// The path being backed up or restored.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors from run-state persistence and rollback.
#[derive(Error, Debug)]
pub enum StateError {
    /// `rollback` was invoked but no run state exists.
    ///
    /// Distinct from a rollback that succeeds with zero entries: this means
    /// there is nothing recorded to roll back at all.
    #[error("no previous run state to roll back")]
    NoPreviousRun,

    /// The persisted run state could not be deserialized.
    #[error("run state file {path} is corrupt: {message}")]
    Corrupt {
        /// Path of the state document.
        path: PathBuf,
        /// Deserializer diagnostic.
        message: String,
    },

    /// An I/O error reading or writing the state document.
    #[error("IO error for run state {path}: {source}")]
    Io {
        /// Path of the state document.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn config_error_invalid_syntax_display() {
        let e = ConfigError::InvalidSyntax {
            file: "links.toml".to_string(),
            message: "unexpected token".to_string(),
        };
        assert_eq!(e.to_string(), "Invalid TOML in links.toml: unexpected token");
    }

    #[test]
    fn config_error_invalid_host_pattern_display() {
        let e = ConfigError::InvalidHostPattern {
            pattern: "work-[".to_string(),
            message: "invalid range pattern".to_string(),
        };
        assert!(e.to_string().contains("work-["));
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: "/repo/links.toml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/repo/links.toml"));
    }

    #[test]
    fn link_error_target_outside_home_display() {
        let e = LinkError::TargetOutsideHome {
            target: PathBuf::from("/etc/passwd"),
            home: PathBuf::from("/home/user"),
        };
        assert_eq!(
            e.to_string(),
            "target '/etc/passwd' resolves outside the home directory '/home/user'"
        );
    }

    #[test]
    fn link_error_aborted_display() {
        assert_eq!(LinkError::Aborted.to_string(), "aborted by user");
    }

    #[test]
    fn backup_error_bad_name_display() {
        let e = BackupError::BadName(PathBuf::from("/home/user/.zshrc"));
        assert!(e.to_string().contains(".zshrc"));
        assert!(e.to_string().contains("backup"));
    }

    #[test]
    fn state_error_no_previous_run_display() {
        assert_eq!(
            StateError::NoPreviousRun.to_string(),
            "no previous run state to roll back"
        );
    }

    #[test]
    fn state_error_corrupt_display() {
        let e = StateError::Corrupt {
            path: PathBuf::from("/home/user/.local/state/dotlink/last-run.json"),
            message: "expected value at line 1".to_string(),
        };
        assert!(e.to_string().contains("last-run.json"));
        assert!(e.to_string().contains("corrupt"));
    }

    #[test]
    fn dotlink_error_from_sub_errors() {
        let e: DotlinkError = LinkError::Aborted.into();
        assert!(e.to_string().contains("Link error"));

        let e: DotlinkError = StateError::NoPreviousRun.into();
        assert!(e.to_string().contains("Run state error"));

        let e: DotlinkError = BackupError::BadName(PathBuf::from("x")).into();
        assert!(e.to_string().contains("Backup error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<DotlinkError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<LinkError>();
        assert_send_sync::<BackupError>();
        assert_send_sync::<StateError>();
    }

    #[test]
    fn link_error_converts_to_anyhow() {
        let e = LinkError::Aborted;
        let _anyhow_err: anyhow::Error = e.into();
    }
}
