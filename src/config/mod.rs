//! Configuration loading.

pub mod links;

pub use links::LinkSpec;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

/// All loaded configuration for one invocation.
#[derive(Debug)]
pub struct Config {
    /// Absolute root of the managed repository.
    pub root: PathBuf,
    /// Configured links, in file order.
    pub links: Vec<LinkSpec>,
}

impl Config {
    /// Load configuration from `links.toml` under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let links = links::load(&root.join("links.toml")).context("loading links.toml")?;
        Ok(Self {
            root: root.to_path_buf(),
            links,
        })
    }
}
