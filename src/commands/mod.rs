//! Top-level subcommand orchestration.

pub mod backup;
pub mod link;
pub mod rollback;
pub mod status;
pub mod unlink;

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::environment::Environment;

/// Everything a subcommand needs to run: loaded config plus machine facts.
#[derive(Debug)]
pub struct Session {
    /// Loaded configuration.
    pub config: Config,
    /// Detected machine environment.
    pub env: Environment,
}

/// Detect the environment and load configuration for a subcommand.
pub(crate) fn session(global: &GlobalOpts) -> Result<Session> {
    let env = Environment::detect()?;
    let root = resolve_root(global)?;
    let config = Config::load(&root)?;
    Ok(Session { config, env })
}

/// Resolve the repository root directory from CLI arguments or auto-detection.
///
/// # Errors
///
/// Returns an error if the root directory cannot be determined or doesn't exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return Ok(std::fs::canonicalize(root)?);
    }

    if let Ok(root) = std::env::var("DOTLINK_ROOT") {
        return Ok(std::fs::canonicalize(root)?);
    }

    // Last resort: current directory, if it looks like a dotlink repository.
    let cwd = std::env::current_dir()?;
    if cwd.join("links.toml").exists() {
        return Ok(std::fs::canonicalize(cwd)?);
    }

    anyhow::bail!("cannot determine repository root. Use --root or set DOTLINK_ROOT")
}
