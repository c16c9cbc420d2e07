//! Discord-compatible webhook sink.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::{ViolationRecord, ViolationSink};
use crate::config::WebhookConfig;
use crate::error::NotifyError;
use crate::filter::ViolationType;

pub struct WebhookSink {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(config: WebhookConfig) -> Result<Self, NotifyError> {
        if config.url.trim().is_empty() {
            return Err(NotifyError::MissingUrl);
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { config, client })
    }
}

fn type_label(violation_type: ViolationType) -> (&'static str, &'static str) {
    match violation_type {
        ViolationType::BlacklistedWord => ("💬", "Blacklisted Word"),
        ViolationType::BlockedUrl => ("🔗", "Blocked URL"),
        ViolationType::BlockedIp => ("🌐", "Blocked IP"),
        ViolationType::BlacklistedName => ("👤", "Blacklisted Name"),
        ViolationType::None => ("⚠️", "Violation"),
    }
}

/// Build the webhook JSON body for one record.
pub fn build_payload(config: &WebhookConfig, record: &ViolationRecord) -> Value {
    let server = if record.server_label.trim().is_empty() {
        config.server_name.as_str()
    } else {
        record.server_label.as_str()
    };

    let subject = if config.include_steam_profile && record.stable_identity != "Unknown" {
        format!(
            "**Name** [{}](https://steamcommunity.com/profiles/{})\n**SteamID** {}",
            record.subject_name, record.stable_identity, record.stable_identity
        )
    } else {
        format!(
            "**Name** {}\n**SteamID** {}",
            record.subject_name, record.stable_identity
        )
    };

    let (emoji, label) = type_label(record.violation_type);
    let content = if config.mention_role_id.trim().is_empty() {
        String::new()
    } else {
        format!("<@&{}>", config.mention_role_id.trim())
    };

    json!({
        "content": content,
        "embeds": [{
            "title": "🚨 SpamGuard Violation",
            "description": format!("Violation detected on **{server}**"),
            "color": config.embed_color_value(),
            "fields": [
                { "name": "🎯 Player", "value": subject, "inline": false },
                { "name": "⚠️ Violation Type", "value": format!("{emoji} {label}"), "inline": true },
                { "name": "📝 Reason", "value": record.reason, "inline": true },
                { "name": "🔍 Detected Content", "value": format!("`{}`", record.detected_content), "inline": false },
                { "name": "📍 Channel", "value": record.channel.as_str(), "inline": true },
            ],
            "footer": { "text": "SpamGuard" },
            "timestamp": record.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        }]
    })
}

#[async_trait]
impl ViolationSink for WebhookSink {
    async fn deliver(&self, record: &ViolationRecord) -> Result<(), NotifyError> {
        let payload = build_payload(&self.config, record);
        let response = self.client.post(&self.config.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        debug!(id = %record.id, "Violation delivered to webhook");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
