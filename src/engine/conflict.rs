//! Conflict resolution: policy-driven or interactive.
//!
//! A conflict (target occupied by something other than the desired link)
//! is turned into a [`ConflictAction`] by the per-run [`ConflictResolver`]
//! state machine. Decisions come, in priority order, from a sticky earlier
//! choice, forced mode, non-interactive mode, or the operator via a
//! [`ConflictResponder`] — a request/response boundary that keeps the state
//! machine independent of any particular line-reading mechanism.

use std::collections::VecDeque;
use std::io::{BufRead as _, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::logging::Logger;

/// What to do with a conflicting target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// Leave the occupant in place; the entry stays in conflict.
    Skip,
    /// Move the occupant aside to a backup, then link.
    Backup,
    /// Delete the occupant outright (no backup), then link.
    Overwrite,
    /// Fail the entire operation. Entries already applied remain applied.
    Abort,
}

/// A resolution for one conflict. When `apply_to_all` is set it becomes the
/// sticky decision for every later conflict in the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictChoice {
    /// The chosen action.
    pub action: ConflictAction,
    /// Latch this action for the remainder of the run.
    pub apply_to_all: bool,
}

/// Description of a conflict put to the operator.
#[derive(Debug, Clone)]
pub struct ConflictPrompt {
    /// The occupied target path.
    pub target: PathBuf,
    /// The source the link should point at.
    pub source: PathBuf,
}

/// One reply to a conflict prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptReply {
    /// A resolving choice.
    Choice(ConflictChoice),
    /// Display the difference between occupant and source, then re-prompt.
    ShowDiff,
    /// Unrecognized input; re-prompt with an error line.
    Unknown(String),
}

/// Parse one line of operator input into a reply.
#[must_use]
pub fn parse_reply(input: &str) -> PromptReply {
    let choice = |action, apply_to_all| PromptReply::Choice(ConflictChoice { action, apply_to_all });
    match input.trim() {
        "s" => choice(ConflictAction::Skip, false),
        "S" => choice(ConflictAction::Skip, true),
        "b" => choice(ConflictAction::Backup, false),
        "B" => choice(ConflictAction::Backup, true),
        "o" => choice(ConflictAction::Overwrite, false),
        "a" => choice(ConflictAction::Abort, false),
        "d" => PromptReply::ShowDiff,
        other => PromptReply::Unknown(other.to_string()),
    }
}

/// Supplies operator responses to conflict prompts.
///
/// The production implementation is [`StdinResponder`]; tests use
/// [`ScriptedResponder`] so the resolver runs without a terminal.
pub trait ConflictResponder {
    /// Produce one reply for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error when no reply can be produced (e.g. stdin closed).
    fn respond(&mut self, prompt: &ConflictPrompt) -> Result<PromptReply>;
}

/// Reads replies from standard input, one line per prompt.
#[derive(Debug, Default)]
pub struct StdinResponder;

impl ConflictResponder for StdinResponder {
    fn respond(&mut self, prompt: &ConflictPrompt) -> Result<PromptReply> {
        print!(
            "{} already exists — [s]kip [b]ackup [o]verwrite [d]iff [a]bort [S]kip-all [B]ackup-all: ",
            prompt.target.display()
        );
        std::io::stdout().flush()?;
        let mut line = String::new();
        let n = std::io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            anyhow::bail!("stdin closed while resolving conflict");
        }
        Ok(parse_reply(&line))
    }
}

/// Replays a fixed sequence of replies. Test double for the interactive
/// prompt; fails when asked for more replies than it was given.
#[derive(Debug, Default)]
pub struct ScriptedResponder {
    replies: VecDeque<PromptReply>,
}

impl ScriptedResponder {
    /// Build a responder that yields `replies` in order.
    #[must_use]
    pub fn new(replies: impl IntoIterator<Item = PromptReply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
        }
    }
}

impl ConflictResponder for ScriptedResponder {
    fn respond(&mut self, prompt: &ConflictPrompt) -> Result<PromptReply> {
        self.replies.pop_front().ok_or_else(|| {
            anyhow::anyhow!(
                "no scripted reply left for conflict at {}",
                prompt.target.display()
            )
        })
    }
}

/// Per-run conflict resolution state machine.
pub struct ConflictResolver<'a> {
    force: bool,
    non_interactive: bool,
    pending: Option<ConflictAction>,
    responder: Box<dyn ConflictResponder + 'a>,
    log: &'a Logger,
}

impl std::fmt::Debug for ConflictResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictResolver")
            .field("force", &self.force)
            .field("non_interactive", &self.non_interactive)
            .field("pending", &self.pending)
            .field("responder", &"<dyn ConflictResponder>")
            .finish()
    }
}

impl<'a> ConflictResolver<'a> {
    /// Create a resolver with no sticky decision.
    ///
    /// `non_interactive` should already fold in whether the controlling
    /// terminal is interactive; the resolver does not probe the tty itself.
    pub fn new(
        force: bool,
        non_interactive: bool,
        responder: Box<dyn ConflictResponder + 'a>,
        log: &'a Logger,
    ) -> Self {
        Self {
            force,
            non_interactive,
            pending: None,
            responder,
            log,
        }
    }

    /// The sticky action latched earlier in this run, if any.
    #[must_use]
    pub fn pending(&self) -> Option<ConflictAction> {
        self.pending
    }

    /// Decide what to do about a conflict at `target`.
    ///
    /// Priority: sticky choice from an earlier conflict, forced mode
    /// (backup), non-interactive mode (skip, with a remediation warning),
    /// else prompt the operator until a resolving reply arrives.
    ///
    /// # Errors
    ///
    /// Returns an error when the responder cannot produce a reply.
    pub fn resolve(&mut self, source: &Path, target: &Path) -> Result<ConflictAction> {
        if let Some(action) = self.pending {
            return Ok(action);
        }
        if self.force {
            return Ok(ConflictAction::Backup);
        }
        if self.non_interactive {
            self.log.warn(&format!(
                "conflict: {} already exists; skipping (re-run with --force to back up and replace)",
                target.display()
            ));
            return Ok(ConflictAction::Skip);
        }

        let prompt = ConflictPrompt {
            target: target.to_path_buf(),
            source: source.to_path_buf(),
        };
        loop {
            match self.responder.respond(&prompt)? {
                PromptReply::Choice(choice) => {
                    if choice.apply_to_all {
                        self.pending = Some(choice.action);
                    }
                    return Ok(choice.action);
                }
                PromptReply::ShowDiff => show_diff(&prompt.target, &prompt.source, self.log),
                PromptReply::Unknown(key) => {
                    self.log.error(&format!("unrecognized choice '{key}'"));
                }
            }
        }
    }
}

/// Print a line-by-line comparison of the occupant and the source.
/// Display only; never resolves the conflict.
fn show_diff(target: &Path, source: &Path, log: &Logger) {
    let read = |p: &Path| std::fs::read_to_string(p).ok();
    match (read(target), read(source)) {
        (Some(current), Some(wanted)) => {
            if current == wanted {
                log.info("files are identical");
                return;
            }
            let mut current_lines = current.lines();
            let mut wanted_lines = wanted.lines();
            loop {
                match (current_lines.next(), wanted_lines.next()) {
                    (None, None) => break,
                    (old, new) if old == new => {}
                    (old, new) => {
                        if let Some(old) = old {
                            log.info(&format!("- {old}"));
                        }
                        if let Some(new) = new {
                            log.info(&format!("+ {new}"));
                        }
                    }
                }
            }
        }
        _ => log.info("no diff available (directory, binary, or unreadable file)"),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn choice(action: ConflictAction, apply_to_all: bool) -> PromptReply {
        PromptReply::Choice(ConflictChoice {
            action,
            apply_to_all,
        })
    }

    #[test]
    fn parse_reply_recognizes_all_keys() {
        assert_eq!(parse_reply("s"), choice(ConflictAction::Skip, false));
        assert_eq!(parse_reply("S"), choice(ConflictAction::Skip, true));
        assert_eq!(parse_reply("b"), choice(ConflictAction::Backup, false));
        assert_eq!(parse_reply("B"), choice(ConflictAction::Backup, true));
        assert_eq!(parse_reply("o"), choice(ConflictAction::Overwrite, false));
        assert_eq!(parse_reply("a"), choice(ConflictAction::Abort, false));
        assert_eq!(parse_reply("d"), PromptReply::ShowDiff);
    }

    #[test]
    fn parse_reply_trims_whitespace() {
        assert_eq!(parse_reply(" b\n"), choice(ConflictAction::Backup, false));
    }

    #[test]
    fn parse_reply_rejects_unknown_input() {
        assert_eq!(parse_reply("x"), PromptReply::Unknown("x".to_string()));
        assert_eq!(parse_reply(""), PromptReply::Unknown(String::new()));
    }

    fn resolver<'a>(
        force: bool,
        non_interactive: bool,
        replies: Vec<PromptReply>,
        log: &'a Logger,
    ) -> ConflictResolver<'a> {
        ConflictResolver::new(
            force,
            non_interactive,
            Box::new(ScriptedResponder::new(replies)),
            log,
        )
    }

    #[test]
    fn forced_mode_synthesizes_backup() {
        let log = Logger::new(false);
        let mut r = resolver(true, false, vec![], &log);
        let action = r.resolve(Path::new("/s"), Path::new("/t")).unwrap();
        assert_eq!(action, ConflictAction::Backup);
        // Forced decisions are not sticky; they apply every time anyway.
        assert_eq!(r.pending(), None);
    }

    #[test]
    fn non_interactive_synthesizes_skip() {
        let log = Logger::new(false);
        let mut r = resolver(false, true, vec![], &log);
        let action = r.resolve(Path::new("/s"), Path::new("/t")).unwrap();
        assert_eq!(action, ConflictAction::Skip);
    }

    #[test]
    fn prompt_reply_resolves() {
        let log = Logger::new(false);
        let mut r = resolver(
            false,
            false,
            vec![choice(ConflictAction::Overwrite, false)],
            &log,
        );
        let action = r.resolve(Path::new("/s"), Path::new("/t")).unwrap();
        assert_eq!(action, ConflictAction::Overwrite);
        assert_eq!(r.pending(), None);
    }

    #[test]
    fn unknown_and_diff_replies_reprompt() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let target = dir.path().join("target");
        std::fs::write(&source, "new\n").unwrap();
        std::fs::write(&target, "old\n").unwrap();

        let log = Logger::new(false);
        let mut r = resolver(
            false,
            false,
            vec![
                PromptReply::Unknown("z".to_string()),
                PromptReply::ShowDiff,
                choice(ConflictAction::Skip, false),
            ],
            &log,
        );
        let action = r.resolve(&source, &target).unwrap();
        assert_eq!(action, ConflictAction::Skip);
    }

    #[test]
    fn apply_to_all_latches_sticky_choice() {
        let log = Logger::new(false);
        let mut r = resolver(false, false, vec![choice(ConflictAction::Backup, true)], &log);

        let first = r.resolve(Path::new("/s1"), Path::new("/t1")).unwrap();
        assert_eq!(first, ConflictAction::Backup);
        assert_eq!(r.pending(), Some(ConflictAction::Backup));

        // Second conflict resolves without consulting the responder — the
        // scripted responder has no replies left and would error.
        let second = r.resolve(Path::new("/s2"), Path::new("/t2")).unwrap();
        assert_eq!(second, ConflictAction::Backup);
    }

    #[test]
    fn sticky_choice_beats_forced_mode() {
        let log = Logger::new(false);
        let mut r = resolver(true, false, vec![], &log);
        // Simulate a latched decision from earlier in the run.
        r.pending = Some(ConflictAction::Skip);
        let action = r.resolve(Path::new("/s"), Path::new("/t")).unwrap();
        assert_eq!(action, ConflictAction::Skip);
    }

    #[test]
    fn exhausted_script_is_an_error() {
        let log = Logger::new(false);
        let mut r = resolver(false, false, vec![], &log);
        assert!(r.resolve(Path::new("/s"), Path::new("/t")).is_err());
    }
}
