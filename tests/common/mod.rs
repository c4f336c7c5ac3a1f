// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed repository and home directory so
// each integration test runs against an isolated filesystem without
// repeating setup boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use dotlink_cli::config::Config;
use dotlink_cli::environment::{Environment, Os};

/// An isolated repository + home pair backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct TestBed {
    dir: tempfile::TempDir,
    /// Canonicalized repository root.
    pub root: PathBuf,
    /// Canonicalized fake home directory.
    pub home: PathBuf,
}

impl TestBed {
    /// Create a bed with empty `repo/` and `home/` directories.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("repo")).expect("create repo dir");
        std::fs::create_dir_all(dir.path().join("home")).expect("create home dir");
        // Canonicalize so path comparisons survive symlinked temp roots.
        let root = std::fs::canonicalize(dir.path().join("repo")).expect("canonicalize repo");
        let home = std::fs::canonicalize(dir.path().join("home")).expect("canonicalize home");
        Self { dir, root, home }
    }

    /// Environment for a plain Linux machine called `testhost`.
    pub fn env(&self) -> Environment {
        self.env_for("testhost", Os::Linux)
    }

    /// Environment simulating an arbitrary machine.
    pub fn env_for(&self, hostname: &str, os: Os) -> Environment {
        Environment::new(self.home.clone(), hostname, os)
    }

    /// Write `links.toml` at the repository root.
    pub fn write_links_toml(&self, contents: &str) {
        std::fs::write(self.root.join("links.toml"), contents).expect("write links.toml");
    }

    /// Create a payload file inside the repository.
    pub fn add_source(&self, rel: &str, contents: &str) {
        write_with_parents(&self.root.join(rel), contents);
    }

    /// Create a pre-existing file inside the home directory.
    pub fn add_home_file(&self, rel: &str, contents: &str) {
        write_with_parents(&self.home.join(rel), contents);
    }

    /// Load the repository configuration.
    pub fn config(&self) -> Config {
        Config::load(&self.root).expect("load config")
    }

    /// Recursive snapshot of everything under home: relative path plus
    /// content, link value, or directory marker. Used to verify dry-run
    /// purity byte-for-byte.
    pub fn home_snapshot(&self) -> Vec<String> {
        let mut out = Vec::new();
        walk(&self.home, &self.home, &mut out);
        out
    }
}

fn write_with_parents(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, contents).expect("write file");
}

fn walk(dir: &Path, base: &Path, out: &mut Vec<String>) {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    entries.sort();
    for path in entries {
        let rel = path
            .strip_prefix(base)
            .expect("path under base")
            .display()
            .to_string();
        let meta = std::fs::symlink_metadata(&path).expect("symlink metadata");
        if meta.is_symlink() {
            let dest = std::fs::read_link(&path).expect("read link");
            out.push(format!("{rel} -> {}", dest.display()));
        } else if meta.is_dir() {
            out.push(format!("{rel}/"));
            walk(&path, base, out);
        } else {
            let bytes = std::fs::read(&path).expect("read file");
            out.push(format!("{rel} [{}]", String::from_utf8_lossy(&bytes)));
        }
    }
}
