//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Root config struct, server identity, bypass settings, loading
//! - [`filter`]: Content filter stages (WordFilterConfig, UrlFilterConfig, IpFilterConfig)
//! - [`protection`]: Name and chat protection (NameProtectionConfig, ChatProtectionConfig)
//! - [`webhook`]: Violation webhook delivery (WebhookConfig)
//! - [`reapply`]: Enforced-name re-application schedule (ReapplyConfig)
//! - [`messages`]: Player- and admin-facing strings (MessagesConfig)
//! - [`validation`]: Load-time checks

mod defaults;
mod filter;
mod messages;
mod protection;
pub mod reapply;
mod types;
pub mod validation;
mod webhook;

pub use filter::{IpFilterConfig, UrlFilterConfig, UrlFilterMode, WordFilterConfig};
pub use messages::MessagesConfig;
pub use protection::{ChatProtectionConfig, FilterAction, NameBlacklistConfig, NameProtectionConfig};
pub use reapply::ReapplyConfig;
pub use types::{Config, ConfigError, ServerConfig, SettingsConfig};
pub use validation::ValidationError;
pub use webhook::WebhookConfig;
