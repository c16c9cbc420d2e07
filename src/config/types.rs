//! Core configuration types and loading.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use thiserror::Error;

use super::defaults::{default_bypass_permission, default_metrics_bind, default_server_label};
use super::filter::{IpFilterConfig, UrlFilterConfig, WordFilterConfig};
use super::messages::MessagesConfig;
use super::protection::{ChatProtectionConfig, NameProtectionConfig};
use super::reapply::ReapplyConfig;
use super::validation::{self, ValidationError};
use super::webhook::WebhookConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", format_validation(.0))]
    Invalid(Vec<ValidationError>),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Guard configuration.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Bypass and debug settings.
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub word_filter: WordFilterConfig,
    #[serde(default)]
    pub url_filter: UrlFilterConfig,
    #[serde(default)]
    pub ip_filter: IpFilterConfig,
    /// Display-name enforcement.
    #[serde(default)]
    pub name_protection: NameProtectionConfig,
    /// Chat filtering and sanctions.
    #[serde(default)]
    pub chat_protection: ChatProtectionConfig,
    /// Violation webhook.
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// Delays at which enforced names are re-applied.
    #[serde(default)]
    pub reapply: ReapplyConfig,
    /// Player-facing strings.
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validation::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Label attached to violation records (default: "SpamGuard").
    #[serde(default = "default_server_label")]
    pub label: String,
    /// Prometheus metrics HTTP port. 0 disables the endpoint (default: 0).
    #[serde(default)]
    pub metrics_port: u16,
    /// Address the metrics endpoint binds to (default: 0.0.0.0).
    #[serde(default = "default_metrics_bind")]
    pub metrics_bind: IpAddr,
}

impl ServerConfig {
    /// Socket for the metrics endpoint, or `None` when it is disabled.
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        (self.metrics_port != 0).then(|| SocketAddr::new(self.metrics_bind, self.metrics_port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            label: default_server_label(),
            metrics_port: 0,
            metrics_bind: default_metrics_bind(),
        }
    }
}

/// Bypass and diagnostics settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    /// Let subjects holding `admin_bypass_permission` skip all filtering (default: false).
    #[serde(default)]
    pub admin_bypass: bool,
    #[serde(default = "default_bypass_permission")]
    pub admin_bypass_permission: String,
    /// Default the log filter to `debug` when `RUST_LOG` is unset.
    #[serde(default)]
    pub debug_mode: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            admin_bypass: false,
            admin_bypass_permission: default_bypass_permission(),
            debug_mode: false,
        }
    }
}
