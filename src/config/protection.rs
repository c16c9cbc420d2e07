//! Name and chat protection configuration.

use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::warn;

use super::defaults::{
    default_admin_chat_permission, default_admin_chat_prefix, default_admin_notify_permission,
    default_ban_command, default_blacklisted_names, default_command_prefixes,
    default_cooldown_secs, default_kick_command, default_max_name_length,
    default_min_name_length, default_replacement_name, default_sanction_delay_ms, default_true,
};

/// Display-name enforcement.
#[derive(Debug, Clone, Deserialize)]
pub struct NameProtectionConfig {
    /// Enable forced renames for offending names (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base of the replacement name (default: "Player").
    #[serde(default = "default_replacement_name")]
    pub replacement_name: String,
    /// Append `_<userid>` to the replacement name (default: true).
    #[serde(default = "default_true")]
    pub add_userid_suffix: bool,
    /// Name blacklist rules checked before content stages.
    #[serde(default)]
    pub name_blacklist: NameBlacklistConfig,
    /// Tell the subject their name was changed (default: true).
    #[serde(default = "default_true")]
    pub notify_player: bool,
    /// Tell admins about forced renames (default: true).
    #[serde(default = "default_true")]
    pub notify_admins: bool,
}

impl Default for NameProtectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            replacement_name: default_replacement_name(),
            add_userid_suffix: true,
            name_blacklist: NameBlacklistConfig::default(),
            notify_player: true,
            notify_admins: true,
        }
    }
}

/// Name blacklist rules.
#[derive(Debug, Clone, Deserialize)]
pub struct NameBlacklistConfig {
    /// Enable the name blacklist stage (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Reserved names, checked in list order.
    #[serde(default = "default_blacklisted_names")]
    pub blacklisted_names: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    /// Require exact equality with an entry. Takes precedence over partial matching.
    #[serde(default)]
    pub whole_name_only: bool,
    /// Block names containing an entry anywhere.
    #[serde(default)]
    pub block_partial_matches: bool,
    /// In partial mode, exempt names that are an entry followed only by digits.
    #[serde(default)]
    pub allow_numbers_suffix: bool,
    /// Minimum name length in characters (default: 2).
    #[serde(default = "default_min_name_length")]
    pub min_name_length: usize,
    /// Maximum name length in characters (default: 32).
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

impl Default for NameBlacklistConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blacklisted_names: default_blacklisted_names(),
            case_sensitive: false,
            whole_name_only: false,
            block_partial_matches: false,
            allow_numbers_suffix: false,
            min_name_length: default_min_name_length(),
            max_name_length: default_max_name_length(),
        }
    }
}

/// Action taken against a subject whose chat message was blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterAction {
    /// Suppress the message only.
    #[default]
    Block,
    Kick,
    Ban,
    /// Run `custom_command`.
    Custom,
}

impl FilterAction {
    /// Static label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Kick => "kick",
            Self::Ban => "ban",
            Self::Custom => "custom",
        }
    }

    /// Parse a configured action name, ignoring case. Unknown names fall
    /// back to `Block`.
    pub fn from_config(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "block" => Self::Block,
            "kick" => Self::Kick,
            "ban" => Self::Ban,
            "custom" => Self::Custom,
            other => {
                warn!(action = %other, "Unknown chat_protection.action; using block");
                Self::Block
            }
        }
    }
}

fn deserialize_action<'de, D>(deserializer: D) -> Result<FilterAction, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(FilterAction::from_config(&value))
}

/// Chat message protection and sanctions.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatProtectionConfig {
    /// Enable chat filtering (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Sanction for blocked messages (default: block). Case-insensitive.
    #[serde(default, deserialize_with = "deserialize_action")]
    pub action: FilterAction,
    /// Template for `kick`. Placeholders: {userid} {steamid} {name} {slot}.
    #[serde(default = "default_kick_command")]
    pub kick_command: String,
    /// Template for `ban`.
    #[serde(default = "default_ban_command")]
    pub ban_command: String,
    /// Template for `custom`. Empty disables the action.
    #[serde(default)]
    pub custom_command: String,
    #[serde(default = "default_true")]
    pub notify_player: bool,
    #[serde(default = "default_true")]
    pub notify_admins: bool,
    /// Log violations to the console (default: true).
    #[serde(default = "default_true")]
    pub log_violations: bool,
    /// Per-subject, per-channel window in which repeat violations are
    /// suppressed silently (default: 5).
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Delay before kick/ban/custom commands run (default: 500).
    #[serde(default = "default_sanction_delay_ms")]
    pub sanction_delay_ms: u64,
    /// Messages starting with one of these are commands and never filtered.
    #[serde(default = "default_command_prefixes")]
    pub command_prefixes: Vec<String>,
    /// Team-chat prefix used by admins to talk to each other.
    #[serde(default = "default_admin_chat_prefix")]
    pub admin_chat_prefix: String,
    /// Permission required for `admin_chat_prefix` to bypass filtering.
    #[serde(default = "default_admin_chat_permission")]
    pub admin_chat_permission: String,
    /// Permission that marks a subject as an admin notice recipient.
    #[serde(default = "default_admin_notify_permission")]
    pub admin_notify_permission: String,
}

impl ChatProtectionConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn sanction_delay(&self) -> Duration {
        Duration::from_millis(self.sanction_delay_ms)
    }

    /// Command template for an action, or `None` when nothing should run.
    pub fn command_for(&self, action: FilterAction) -> Option<&str> {
        let template = match action {
            FilterAction::Block => return None,
            FilterAction::Kick => &self.kick_command,
            FilterAction::Ban => &self.ban_command,
            FilterAction::Custom => &self.custom_command,
        };
        (!template.trim().is_empty()).then_some(template.as_str())
    }
}

impl Default for ChatProtectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            action: FilterAction::default(),
            kick_command: default_kick_command(),
            ban_command: default_ban_command(),
            custom_command: String::new(),
            notify_player: true,
            notify_admins: true,
            log_violations: true,
            cooldown_secs: default_cooldown_secs(),
            sanction_delay_ms: default_sanction_delay_ms(),
            command_prefixes: default_command_prefixes(),
            admin_chat_prefix: default_admin_chat_prefix(),
            admin_chat_permission: default_admin_chat_permission(),
            admin_notify_permission: default_admin_notify_permission(),
        }
    }
}
