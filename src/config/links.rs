//! Link configuration loading.

use std::path::Path;

use glob::Pattern;
use serde::Deserialize;

use crate::engine::condition::Condition;
use crate::error::ConfigError;

/// A symlink to materialize: `source` (relative to the repository root) →
/// `target` (relative to `$HOME`), optionally gated by a condition.
///
/// Immutable; loaded once per invocation.
#[derive(Debug, Clone)]
pub struct LinkSpec {
    /// Relative path of the payload inside the repository.
    pub source: String,
    /// Target path relative to `$HOME`.
    pub target: String,
    /// Predicate gating whether this entry applies on this machine.
    pub condition: Option<Condition>,
}

/// A single entry in the `links` array — either a plain source path (target
/// derived by the dot-prefix convention) or a structured table with an
/// explicit target and optional condition.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkEntry {
    /// Plain string: `"zshrc"` — target is derived as `.zshrc`.
    Simple(String),
    /// Structured: `{ source = "shell/zshrc", target = ".zshrc", condition = {...} }`.
    Full {
        source: String,
        target: Option<String>,
        condition: Option<Condition>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct LinkFile {
    #[serde(default)]
    links: Vec<LinkEntry>,
}

/// Derive the home-relative target for a bare source path: `"zshrc"` →
/// `".zshrc"`, `"config/git/config"` → `".config/git/config"`.
fn derive_target(source: &str) -> String {
    format!(".{source}")
}

/// Load link specs from `links.toml`.
///
/// A missing file yields an empty list. Every hostname pattern is compiled
/// once here so condition evaluation is infallible later.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed, or if
/// a hostname pattern is invalid.
pub fn load(path: &Path) -> Result<Vec<LinkSpec>, ConfigError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let file: LinkFile = toml::from_str(&contents).map_err(|e| ConfigError::InvalidSyntax {
        file: path.display().to_string(),
        message: e.to_string(),
    })?;

    let specs: Vec<LinkSpec> = file
        .links
        .into_iter()
        .map(|entry| match entry {
            LinkEntry::Simple(source) => {
                let target = derive_target(&source);
                LinkSpec {
                    source,
                    target,
                    condition: None,
                }
            }
            LinkEntry::Full {
                source,
                target,
                condition,
            } => {
                let target = target.unwrap_or_else(|| derive_target(&source));
                LinkSpec {
                    source,
                    target,
                    condition,
                }
            }
        })
        .collect();

    for spec in &specs {
        if let Some(pattern) = spec.condition.as_ref().and_then(|c| c.hostname.as_ref()) {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidHostPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }
    }

    Ok(specs)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::environment::Os;
    use std::path::PathBuf;

    fn write_temp_toml(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn load_simple_entries_derive_targets() {
        let (_dir, path) = write_temp_toml(r#"links = ["zshrc", "config/git/config"]"#);
        let specs = load(&path).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].source, "zshrc");
        assert_eq!(specs[0].target, ".zshrc");
        assert!(specs[0].condition.is_none());
        assert_eq!(specs[1].target, ".config/git/config");
    }

    #[test]
    fn load_explicit_target_override() {
        let (_dir, path) = write_temp_toml(
            r#"links = [
  "zshrc",
  { source = "shell/profile", target = ".profile" },
]"#,
        );
        let specs = load(&path).unwrap();
        assert_eq!(specs[1].source, "shell/profile");
        assert_eq!(specs[1].target, ".profile");
    }

    #[test]
    fn load_structured_entry_without_target_derives_it() {
        let (_dir, path) = write_temp_toml(r#"links = [{ source = "vimrc" }]"#);
        let specs = load(&path).unwrap();
        assert_eq!(specs[0].target, ".vimrc");
    }

    #[test]
    fn load_condition() {
        let (_dir, path) = write_temp_toml(
            r#"links = [
  { source = "mac/profile", target = ".profile", condition = { platform = "darwin", hostname = "work-*" } },
]"#,
        );
        let specs = load(&path).unwrap();
        let cond = specs[0].condition.as_ref().unwrap();
        assert_eq!(cond.platform, Some(Os::Darwin));
        assert_eq!(cond.hostname.as_deref(), Some("work-*"));
    }

    #[test]
    fn load_preserves_configured_order() {
        let (_dir, path) = write_temp_toml(r#"links = ["c", "a", "b"]"#);
        let specs = load(&path).unwrap();
        let sources: Vec<&str> = specs.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(sources, vec!["c", "a", "b"]);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let specs = load(&dir.path().join("absent.toml")).unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn load_empty_file_returns_empty() {
        let (_dir, path) = write_temp_toml("");
        let specs = load(&path).unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn load_rejects_bad_toml() {
        let (_dir, path) = write_temp_toml("links = [");
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }));
    }

    #[test]
    fn load_rejects_unknown_platform() {
        let (_dir, path) = write_temp_toml(
            r#"links = [{ source = "x", condition = { platform = "windows" } }]"#,
        );
        assert!(load(&path).is_err());
    }

    #[test]
    fn load_rejects_invalid_hostname_pattern() {
        let (_dir, path) = write_temp_toml(
            r#"links = [{ source = "x", condition = { hostname = "work-[" } }]"#,
        );
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHostPattern { .. }));
    }
}
