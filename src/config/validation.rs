//! Configuration validation.
//!
//! Validates configuration at load time to catch common errors early.

use super::Config;
use super::protection::FilterAction;
use super::webhook::parse_hex_color;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(
        "name_protection.name_blacklist.min_name_length ({min}) exceeds max_name_length ({max})"
    )]
    NameLengthBounds { min: usize, max: usize },
    #[error("name_protection.replacement_name must not be blank")]
    BlankReplacementName,
    #[error("chat_protection.action is \"{0}\" but its command template is empty")]
    MissingActionCommand(&'static str),
    #[error("webhook.url is required when the webhook is enabled")]
    MissingWebhookUrl,
    #[error("webhook.url is not a valid URL: {0}")]
    InvalidWebhookUrl(String),
    #[error("webhook.embed_color must look like #rrggbb, got '{0}'")]
    InvalidEmbedColor(String),
    #[error("webhook.queue_size must be at least 1")]
    ZeroQueueSize,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let names = &config.name_protection.name_blacklist;
    if names.min_name_length > names.max_name_length {
        errors.push(ValidationError::NameLengthBounds {
            min: names.min_name_length,
            max: names.max_name_length,
        });
    }

    if config.name_protection.enabled && config.name_protection.replacement_name.trim().is_empty()
    {
        errors.push(ValidationError::BlankReplacementName);
    }

    let chat = &config.chat_protection;
    if chat.action != FilterAction::Block && chat.command_for(chat.action).is_none() {
        errors.push(ValidationError::MissingActionCommand(chat.action.as_str()));
    }

    let webhook = &config.webhook;
    if webhook.enabled {
        if webhook.url.trim().is_empty() {
            errors.push(ValidationError::MissingWebhookUrl);
        } else if url::Url::parse(&webhook.url).is_err() {
            errors.push(ValidationError::InvalidWebhookUrl(webhook.url.clone()));
        }
    }
    if parse_hex_color(&webhook.embed_color).is_none() {
        errors.push(ValidationError::InvalidEmbedColor(webhook.embed_color.clone()));
    }
    if webhook.queue_size == 0 {
        errors.push(ValidationError::ZeroQueueSize);
    }

    if config.url_filter.enabled && config.url_filter.allowed_protocols.is_empty() {
        tracing::warn!(
            "[url_filter].allowed_protocols is empty; every URL with an explicit scheme will be blocked"
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
