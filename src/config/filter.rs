//! Content filter configuration (word, URL and IP stages).

use serde::{Deserialize, Deserializer};
use tracing::warn;

use super::defaults::{
    default_allowed_protocols, default_blacklisted_words, default_true, default_url_blacklist,
    default_url_whitelist, default_whitelist_ip_ports, default_whitelist_ips,
};

/// Blacklisted word stage.
#[derive(Debug, Clone, Deserialize)]
pub struct WordFilterConfig {
    /// Enable the word stage (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Words checked in list order; the first match is reported.
    #[serde(default = "default_blacklisted_words")]
    pub blacklisted_words: Vec<String>,
    /// Match case exactly (default: false).
    #[serde(default)]
    pub case_sensitive: bool,
    /// Only match on word boundaries (default: true).
    /// When false, any substring occurrence blocks ("spammer" matches "spam").
    #[serde(default = "default_true")]
    pub whole_word_only: bool,
}

impl Default for WordFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blacklisted_words: default_blacklisted_words(),
            case_sensitive: false,
            whole_word_only: true,
        }
    }
}

/// How the URL stage interprets its domain lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlFilterMode {
    /// Only whitelisted domains are allowed.
    Whitelist,
    /// Everything except blacklisted domains is allowed.
    #[default]
    Blacklist,
}

impl UrlFilterMode {
    /// Parse a configured mode, ignoring case. Anything other than
    /// `whitelist` selects blacklist mode.
    pub fn from_config(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "whitelist" => Self::Whitelist,
            "blacklist" => Self::Blacklist,
            other => {
                warn!(mode = %other, "Unknown url_filter.filter_mode; using blacklist");
                Self::Blacklist
            }
        }
    }
}

fn deserialize_filter_mode<'de, D>(deserializer: D) -> Result<UrlFilterMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(UrlFilterMode::from_config(&value))
}

/// URL stage.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlFilterConfig {
    /// Enable the URL stage (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whitelist or blacklist mode (default: blacklist). Case-insensitive.
    #[serde(default, deserialize_with = "deserialize_filter_mode")]
    pub filter_mode: UrlFilterMode,
    /// Domains allowed in whitelist mode. Subdomains match too.
    #[serde(default = "default_url_whitelist")]
    pub whitelist: Vec<String>,
    /// Domains blocked in blacklist mode. Subdomains match too.
    #[serde(default = "default_url_blacklist")]
    pub blacklist: Vec<String>,
    /// Schemes allowed when a URL carries an explicit `scheme://` prefix.
    #[serde(default = "default_allowed_protocols")]
    pub allowed_protocols: Vec<String>,
}

impl Default for UrlFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter_mode: UrlFilterMode::default(),
            whitelist: default_url_whitelist(),
            blacklist: default_url_blacklist(),
            allowed_protocols: default_allowed_protocols(),
        }
    }
}

/// IP address stage.
#[derive(Debug, Clone, Deserialize)]
pub struct IpFilterConfig {
    /// Enable the IP stage (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Exact `ip:port` strings that may be posted.
    #[serde(default = "default_whitelist_ip_ports")]
    pub whitelist_ip_ports: Vec<String>,
    /// Bare addresses that may be posted.
    #[serde(default = "default_whitelist_ips")]
    pub whitelist_ips: Vec<String>,
}

impl Default for IpFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            whitelist_ip_ports: default_whitelist_ip_ports(),
            whitelist_ips: default_whitelist_ips(),
        }
    }
}
