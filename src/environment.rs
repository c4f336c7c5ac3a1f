//! Machine facts the engine depends on: platform, hostname, home directory.
//!
//! Detected once per invocation and passed explicitly into condition
//! evaluation and path resolution, so tests can simulate arbitrary machines
//! without touching the real OS.

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS.
    Darwin,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Linux => write!(f, "linux"),
            Os::Darwin => write!(f, "darwin"),
        }
    }
}

/// Ambient values for the current machine.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The user's home directory (absolute).
    pub home: PathBuf,
    /// The machine's reported hostname.
    pub hostname: String,
    /// The running platform identifier.
    pub os: Os,
}

impl Environment {
    /// Create an environment with explicit values (used by tests to
    /// simulate other machines).
    #[must_use]
    pub fn new(home: PathBuf, hostname: impl Into<String>, os: Os) -> Self {
        Self {
            home,
            hostname: hostname.into(),
            os,
        }
    }

    /// Detect the current machine's environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn detect() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self {
            home,
            hostname: detect_hostname(),
            os: detect_os(),
        })
    }
}

fn detect_os() -> Os {
    if cfg!(target_os = "macos") {
        Os::Darwin
    } else {
        // Default to Linux for other Unix-like systems
        Os::Linux
    }
}

/// Read the machine hostname: `$HOSTNAME` if set, else `/etc/hostname`.
fn detect_hostname() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        let name = name.trim().to_string();
        if !name.is_empty() {
            return name;
        }
    }
    if let Ok(contents) = std::fs::read_to_string("/etc/hostname") {
        let name = contents.trim().to_string();
        if !name.is_empty() {
            return name;
        }
    }
    "localhost".to_string()
}
