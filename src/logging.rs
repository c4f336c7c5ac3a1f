//! Console and file logging.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

/// Structured logger with dry-run awareness.
///
/// All messages are always written to a persistent log file at
/// `$XDG_CACHE_HOME/dotlink/dotlink.log` (default `~/.cache/dotlink/dotlink.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    verbose: bool,
    log_file: Option<PathBuf>,
}

/// Return the log file path under `$XDG_CACHE_HOME/dotlink/` (or `~/.cache/dotlink/`).
fn log_file_path() -> Option<PathBuf> {
    let cache_dir = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cache")
        });
    let dir = cache_dir.join("dotlink");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("dotlink.log"))
}

/// Strip ANSI escape sequences from a string.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm' (end of SGR sequence)
            for inner in chars.by_ref() {
                if inner == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl Logger {
    /// Create a logger, truncating the log file and writing a run header.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self::with_log_file(verbose, log_file_path())
    }

    /// Create a logger writing to an explicit file (tests use a temp path
    /// so parallel runs do not truncate each other's log).
    #[must_use]
    fn with_log_file(verbose: bool, log_file: Option<PathBuf>) -> Self {
        if let Some(ref path) = log_file {
            let version = option_env!("DOTLINK_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            let header = format!(
                "==========================================\n\
                 dotlink {version} {}\n\
                 ==========================================\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            );
            let _ = fs::write(path, header);
        }

        Self { verbose, log_file }
    }

    /// Append a line to the persistent log file.
    fn write_to_file(&self, level: &str, msg: &str) {
        if let Some(ref path) = self.log_file {
            if let Ok(mut f) = fs::OpenOptions::new().append(true).open(path) {
                let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let clean = strip_ansi(msg);
                let _ = writeln!(f, "{ts} {level} {clean}");
            }
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Log an error to stderr.
    pub fn error(&self, msg: &str) {
        eprintln!("\x1b[31mERROR\x1b[0m {msg}");
        self.write_to_file("ERR", msg);
    }

    /// Log a warning to stderr.
    pub fn warn(&self, msg: &str) {
        eprintln!("\x1b[33mWARN\x1b[0m  {msg}");
        self.write_to_file("WRN", msg);
    }

    /// Log a stage heading.
    pub fn stage(&self, msg: &str) {
        println!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m");
        self.write_to_file("STG", msg);
    }

    /// Log an informational line.
    pub fn info(&self, msg: &str) {
        println!("  {msg}");
        self.write_to_file("INF", msg);
    }

    /// Log a debug line; shown on the terminal only in verbose mode but
    /// always written to the log file.
    pub fn debug(&self, msg: &str) {
        if self.verbose {
            println!("  \x1b[2m{msg}\x1b[0m");
        }
        self.write_to_file("DBG", msg);
    }

    /// Log a dry-run preview line.
    pub fn dry_run(&self, msg: &str) {
        println!("  \x1b[33m[DRY RUN]\x1b[0m {msg}");
        self.write_to_file("DRY", msg);
    }
}
