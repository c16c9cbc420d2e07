//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::{IpAddr, Ipv4Addr};

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server / Settings Defaults
// =============================================================================

pub fn default_server_label() -> String {
    "SpamGuard".to_string()
}

pub fn default_metrics_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

pub fn default_bypass_permission() -> String {
    "@css/root".to_string()
}

// =============================================================================
// Word Filter Defaults
// =============================================================================

pub fn default_blacklisted_words() -> Vec<String> {
    ["badword1", "badword2", "spam", "cheat"]
        .into_iter()
        .map(String::from)
        .collect()
}

// =============================================================================
// URL / IP Filter Defaults
// =============================================================================

pub fn default_url_whitelist() -> Vec<String> {
    ["steamcommunity.com", "github.com", "google.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn default_url_blacklist() -> Vec<String> {
    ["kick.com", "twitch.tv"].into_iter().map(String::from).collect()
}

pub fn default_allowed_protocols() -> Vec<String> {
    ["http", "https", "steam"].into_iter().map(String::from).collect()
}

pub fn default_whitelist_ip_ports() -> Vec<String> {
    ["0.0.0.0:27060", "127.0.0.1:27015"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn default_whitelist_ips() -> Vec<String> {
    vec!["0.0.0.0".to_string()]
}

// =============================================================================
// Name Protection Defaults
// =============================================================================

pub fn default_replacement_name() -> String {
    "Player".to_string()
}

pub fn default_blacklisted_names() -> Vec<String> {
    ["admin", "moderator", "owner"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn default_min_name_length() -> usize {
    2
}

pub fn default_max_name_length() -> usize {
    32
}

// =============================================================================
// Chat Protection Defaults
// =============================================================================

pub fn default_kick_command() -> String {
    "css_kick #{userid} \"Spam/Inappropriate content\"".to_string()
}

pub fn default_ban_command() -> String {
    "css_ban #{userid} 60 \"Spam/Inappropriate content\"".to_string()
}

pub fn default_cooldown_secs() -> u64 {
    5
}

pub fn default_sanction_delay_ms() -> u64 {
    500
}

pub fn default_command_prefixes() -> Vec<String> {
    ["!", "@", "/", "."].into_iter().map(String::from).collect()
}

pub fn default_admin_chat_prefix() -> String {
    "@".to_string()
}

pub fn default_admin_chat_permission() -> String {
    "@css/chat".to_string()
}

pub fn default_admin_notify_permission() -> String {
    "@css/admin".to_string()
}

// =============================================================================
// Webhook Defaults
// =============================================================================

pub fn default_embed_color() -> String {
    "#ff0000".to_string()
}

pub fn default_webhook_timeout_secs() -> u64 {
    10
}

pub fn default_webhook_queue_size() -> usize {
    256
}

// =============================================================================
// Reapply Schedule Defaults (seconds)
// =============================================================================

pub fn default_reapply_on_connect() -> Vec<f64> {
    vec![0.0]
}

pub fn default_name_check_delay() -> f64 {
    2.0
}

pub fn default_reapply_round_start() -> Vec<f64> {
    vec![1.0, 3.0, 5.0]
}

pub fn default_reapply_round_end() -> Vec<f64> {
    vec![1.0, 3.0]
}

pub fn default_reapply_spawn() -> Vec<f64> {
    vec![2.0]
}

pub fn default_reapply_death() -> Vec<f64> {
    vec![2.0]
}

pub fn default_name_notice_delay() -> f64 {
    0.5
}

// =============================================================================
// Message Defaults
// =============================================================================

pub fn default_prefix() -> String {
    "[SpamGuard]".to_string()
}

pub fn default_chat_message_blocked() -> String {
    "Your message was blocked because it contains forbidden content.".to_string()
}

pub fn default_admin_blocked_message() -> String {
    "Blocked {0} message".to_string()
}

pub fn default_public_chat() -> String {
    "public chat".to_string()
}

pub fn default_team_chat() -> String {
    "team chat".to_string()
}

pub fn default_name_changed() -> String {
    "Your name was changed because it violates the server naming policy.".to_string()
}

pub fn default_admin_name_change() -> String {
    "Name changed".to_string()
}

pub fn default_violation_by() -> String {
    "by".to_string()
}
