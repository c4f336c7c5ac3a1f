//! Condition evaluation: does a configured link apply on this machine?

use glob::Pattern;
use serde::Deserialize;

use crate::environment::{Environment, Os};

/// Predicate gating whether a link applies on the current machine.
///
/// When both fields are present, every predicate must match (AND).
#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    /// Required platform identifier.
    #[serde(default)]
    pub platform: Option<Os>,
    /// Glob pattern matched against the machine hostname
    /// (`*` any run of characters, `?` any single character).
    #[serde(default)]
    pub hostname: Option<String>,
}

/// Evaluate `condition` against `env`.
///
/// Returns `None` when the link applies, or `Some(reason)` describing the
/// first failing predicate. Platform is checked before hostname. Pure
/// function of its inputs; no I/O.
pub fn skip_reason(condition: Option<&Condition>, env: &Environment) -> Option<String> {
    let cond = condition?;
    if let Some(want) = cond.platform {
        if want != env.os {
            return Some(format!("platform {want} ≠ {}", env.os));
        }
    }
    if let Some(ref pattern) = cond.hostname {
        // Patterns are validated at config load time, so a compile failure
        // here is unreachable in practice; treat it as a mismatch.
        let matched = Pattern::new(pattern).is_ok_and(|p| p.matches(&env.hostname));
        if !matched {
            return Some(format!("{pattern} ≠ {}", env.hostname));
        }
    }
    None
}
