//! The `status` command: read-only report of every configured link.

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::engine::conflict::StdinResponder;
use crate::engine::{EngineOptions, LinkState, LinkStatus, SymlinkEngine};
use crate::logging::Logger;

/// Run the status command.
///
/// # Errors
///
/// Returns an error on configuration problems or a path-escape integrity
/// violation.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let session = super::session(global)?;

    log.stage("Status");
    let engine = SymlinkEngine::new(
        &session.config.root,
        &session.env,
        log,
        EngineOptions::default(),
        Box::new(StdinResponder),
    );
    let states = engine.status(&session.config.links)?;

    for line in render(&states).lines() {
        log.info(line);
    }

    let linked = states
        .iter()
        .filter(|s| s.status == LinkStatus::Linked)
        .count();
    let conflicts = states
        .iter()
        .filter(|s| s.status == LinkStatus::Conflict)
        .count();
    let missing = states
        .iter()
        .filter(|s| s.status == LinkStatus::Missing)
        .count();
    log.info(&format!(
        "{} links: {linked} linked, {conflicts} conflicts, {missing} missing",
        states.len()
    ));

    Ok(())
}

/// Render per-entry status lines: one symbol, the target, and an optional
/// annotation.
fn render(states: &[LinkState]) -> String {
    let mut out = String::new();
    for state in states {
        let symbol = match state.status {
            LinkStatus::Linked => "✓",
            LinkStatus::Backup => "✓",
            LinkStatus::Conflict => "✗",
            LinkStatus::Missing if state.note.is_some() => "·",
            LinkStatus::Missing => "○",
            LinkStatus::SourceMissing => "!",
        };
        out.push_str(&format!("{symbol} {}", state.target.display()));
        match (&state.note, state.status) {
            (Some(note), _) => out.push_str(&format!(" ({note})")),
            (None, LinkStatus::Linked) => {
                out.push_str(&format!(" -> {}", state.source.display()));
            }
            (None, LinkStatus::Missing) => out.push_str(" (missing)"),
            (None, LinkStatus::SourceMissing) => out.push_str(" (source missing)"),
            (None, _) => {}
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn state(target: &str, status: LinkStatus) -> LinkState {
        LinkState::new(
            PathBuf::from("/repo/shell/zshrc"),
            PathBuf::from(target),
            status,
        )
    }

    #[test]
    fn render_shows_symbols_and_annotations() {
        let states = vec![
            state("/home/u/.zshrc", LinkStatus::Linked),
            state("/home/u/.gitconfig", LinkStatus::Conflict)
                .with_note("regular file in the way"),
            state("/home/u/.profile", LinkStatus::Missing)
                .with_note("skipped: platform darwin ≠ linux"),
            state("/home/u/.vimrc", LinkStatus::Missing),
            state("/home/u/.bashrc", LinkStatus::SourceMissing),
        ];

        insta::assert_snapshot!(render(&states), @r"
        ✓ /home/u/.zshrc -> /repo/shell/zshrc
        ✗ /home/u/.gitconfig (regular file in the way)
        · /home/u/.profile (skipped: platform darwin ≠ linux)
        ○ /home/u/.vimrc (missing)
        ! /home/u/.bashrc (source missing)
        ");
    }

    #[test]
    fn render_empty_states_is_empty() {
        assert_eq!(render(&[]), "");
    }
}
