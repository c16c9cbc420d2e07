//! Violation webhook (Discord) configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{
    default_embed_color, default_server_label, default_true, default_webhook_queue_size,
    default_webhook_timeout_secs,
};
use crate::filter::ViolationType;

/// Outbound violation logging to a Discord-compatible webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Enable webhook delivery (default: false).
    #[serde(default)]
    pub enabled: bool,
    /// Webhook endpoint.
    #[serde(default)]
    pub url: String,
    /// Embed color as `#rrggbb` (default: "#ff0000").
    #[serde(default = "default_embed_color")]
    pub embed_color: String,
    /// Role mentioned in the message body. Empty disables the mention.
    #[serde(default)]
    pub mention_role_id: String,
    /// Server name used when the host does not provide one.
    #[serde(default = "default_server_label")]
    pub server_name: String,
    /// Link subject names to their Steam community profile.
    #[serde(default = "default_true")]
    pub include_steam_profile: bool,
    #[serde(default = "default_true")]
    pub log_word_violations: bool,
    #[serde(default = "default_true")]
    pub log_url_violations: bool,
    #[serde(default = "default_true")]
    pub log_ip_violations: bool,
    #[serde(default = "default_true")]
    pub log_name_violations: bool,
    /// HTTP timeout per delivery (default: 10).
    #[serde(default = "default_webhook_timeout_secs")]
    pub timeout_secs: u64,
    /// Pending records kept before new ones are dropped (default: 256).
    #[serde(default = "default_webhook_queue_size")]
    pub queue_size: usize,
}

impl WebhookConfig {
    /// Whether a record of this type should be delivered.
    pub fn should_log(&self, violation_type: ViolationType) -> bool {
        match violation_type {
            ViolationType::BlacklistedWord => self.log_word_violations,
            ViolationType::BlockedUrl => self.log_url_violations,
            ViolationType::BlockedIp => self.log_ip_violations,
            ViolationType::BlacklistedName => self.log_name_violations,
            ViolationType::None => true,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parse `embed_color` into the integer form Discord expects.
    ///
    /// Falls back to red when the value is malformed.
    pub fn embed_color_value(&self) -> u32 {
        parse_hex_color(&self.embed_color).unwrap_or(0xFF0000)
    }
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(value: &str) -> Option<u32> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            embed_color: default_embed_color(),
            mention_role_id: String::new(),
            server_name: default_server_label(),
            include_steam_profile: true,
            log_word_violations: true,
            log_url_violations: true,
            log_ip_violations: true,
            log_name_violations: true,
            timeout_secs: default_webhook_timeout_secs(),
            queue_size: default_webhook_queue_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some(0xFF0000));
        assert_eq!(parse_hex_color("00ff00"), Some(0x00FF00));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_should_log_filters_by_type() {
        let config = WebhookConfig {
            log_url_violations: false,
            ..WebhookConfig::default()
        };
        assert!(!config.should_log(ViolationType::BlockedUrl));
        assert!(config.should_log(ViolationType::BlockedIp));
    }
}
