//! Chat hook decisions.

use super::effect::HostEffect;

/// Whether the host should deliver the original message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOutcome {
    /// Deliver the message.
    Continue,
    /// Swallow the message.
    Handled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatDecision {
    pub outcome: ChatOutcome,
    pub effects: Vec<HostEffect>,
}

impl ChatDecision {
    pub fn pass() -> Self {
        Self {
            outcome: ChatOutcome::Continue,
            effects: Vec::new(),
        }
    }

    pub fn handled(effects: Vec<HostEffect>) -> Self {
        Self {
            outcome: ChatOutcome::Handled,
            effects,
        }
    }

    pub fn is_handled(&self) -> bool {
        self.outcome == ChatOutcome::Handled
    }
}

/// Messages addressed to the server's command system.
pub fn is_command(message: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .any(|p| !p.is_empty() && message.starts_with(p.as_str()))
}

/// Team-chat messages addressed to admins.
pub fn is_admin_chat(message: &str, prefix: &str) -> bool {
    !prefix.is_empty() && message.starts_with(prefix)
}
