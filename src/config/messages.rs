//! Player- and admin-facing strings.
//!
//! Stand-ins for a localization layer: the host may load these from any
//! language file and hand them over as part of the config snapshot.

use serde::Deserialize;

use super::defaults::{
    default_admin_blocked_message, default_admin_name_change, default_chat_message_blocked,
    default_name_changed, default_prefix, default_public_chat, default_team_chat,
    default_violation_by,
};

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesConfig {
    /// Prepended to every chat notice.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_chat_message_blocked")]
    pub chat_message_blocked: String,
    /// `{0}` is replaced with `public_chat` or `team_chat`.
    #[serde(default = "default_admin_blocked_message")]
    pub admin_blocked_message: String,
    #[serde(default = "default_public_chat")]
    pub public_chat: String,
    #[serde(default = "default_team_chat")]
    pub team_chat: String,
    #[serde(default = "default_name_changed")]
    pub name_changed: String,
    #[serde(default = "default_admin_name_change")]
    pub admin_name_change: String,
    #[serde(default = "default_violation_by")]
    pub violation_by: String,
}

impl MessagesConfig {
    /// Prefix a notice for chat delivery.
    pub fn notice(&self, message: &str) -> String {
        format!("{} {}", self.prefix, message)
    }

    /// Admin notice describing a violation.
    pub fn admin_violation(
        &self,
        kind: &str,
        subject_name: &str,
        reason: &str,
        detected: &str,
    ) -> String {
        self.notice(&format!(
            "{} {} {}: {} ('{}')",
            kind, self.violation_by, subject_name, reason, detected
        ))
    }

    /// The admin label for a blocked chat message on the given channel.
    pub fn blocked_kind(&self, team: bool) -> String {
        let channel = if team { &self.team_chat } else { &self.public_chat };
        self.admin_blocked_message.replace("{0}", channel)
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            chat_message_blocked: default_chat_message_blocked(),
            admin_blocked_message: default_admin_blocked_message(),
            public_chat: default_public_chat(),
            team_chat: default_team_chat(),
            name_changed: default_name_changed(),
            admin_name_change: default_admin_name_change(),
            violation_by: default_violation_by(),
        }
    }
}
