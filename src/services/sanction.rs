//! Chat sanctions.
//!
//! A blocked chat message is always suppressed. The first violation per
//! subject and channel inside the cooldown window additionally notifies,
//! records the violation and dispatches exactly one configured action.

use std::time::Instant;
use tracing::{debug, info, warn};

use super::cooldown::{CooldownTracker, ViolationChannel};
use super::effect::{HostEffect, ScheduledTask};
use crate::config::{Config, FilterAction};
use crate::filter::FilterResult;
use crate::metrics;
use crate::notify::ViolationRecord;
use crate::subject::{Epoch, SlotId, Subject};

/// Fill `{userid}`, `{steamid}`, `{name}` and `{slot}` in a command template.
///
/// Unknown identities substitute as empty strings.
pub fn substitute_placeholders(template: &str, subject: &Subject) -> String {
    let user_id = subject.user_id.map(|id| id.to_string()).unwrap_or_default();
    let steam_id = subject.steam_id.map(|id| id.to_string()).unwrap_or_default();

    template
        .replace("{userid}", &user_id)
        .replace("{steamid}", &steam_id)
        .replace("{name}", &subject.name)
        .replace("{slot}", &subject.slot.to_string())
}

/// Cooldown-gated sanction dispatch.
#[derive(Debug, Default)]
pub struct SanctionCoordinator {
    cooldowns: CooldownTracker,
}

impl SanctionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to a blocked chat message.
    ///
    /// Returns no effects when the subject is still cooling down on this
    /// channel. A dispatched sanction is bound to the slot's `epoch`.
    pub fn handle_chat_violation(
        &mut self,
        config: &Config,
        subject: &Subject,
        epoch: Epoch,
        result: &FilterResult,
        team: bool,
        now: Instant,
    ) -> Vec<HostEffect> {
        let channel = ViolationChannel::for_chat(team);
        let chat = &config.chat_protection;

        if self
            .cooldowns
            .check_at(subject.slot, channel, now, chat.cooldown())
        {
            debug!(slot = %subject.slot, channel = %channel, "Subject in cooldown; message blocked without sanctions");
            metrics::record_cooldown_suppressed(channel.as_str());
            return Vec::new();
        }

        let mut effects = Vec::new();

        if chat.notify_player {
            effects.push(HostEffect::NotifyPlayer {
                slot: subject.slot,
                message: config.messages.notice(&config.messages.chat_message_blocked),
            });
        }

        if chat.notify_admins {
            let message = config.messages.admin_violation(
                &config.messages.blocked_kind(team),
                &subject.name,
                &result.reason,
                &result.detected_content,
            );
            info!("{}", message);
            effects.push(HostEffect::NotifyAdmins {
                permission: chat.admin_notify_permission.clone(),
                message,
            });
        }

        effects.push(record_violation(config, subject, result, channel));

        if let Some(effect) = self.dispatch(config, subject, epoch) {
            effects.push(effect);
        }

        effects
    }

    fn dispatch(&self, config: &Config, subject: &Subject, epoch: Epoch) -> Option<HostEffect> {
        let chat = &config.chat_protection;
        let action = chat.action;
        metrics::record_sanction(action.as_str());

        if action == FilterAction::Block {
            return None;
        }

        if chat.command_for(action).is_none() {
            debug!(action = action.as_str(), "No command configured for action; skipping");
            return None;
        }

        debug!(slot = %subject.slot, action = action.as_str(), delay_ms = chat.sanction_delay_ms, "Scheduling sanction");
        Some(HostEffect::Schedule {
            delay: chat.sanction_delay(),
            task: ScheduledTask::Sanction {
                slot: subject.slot,
                epoch,
                action,
            },
        })
    }

    /// Build the console command for a due sanction.
    ///
    /// The caller has already confirmed the subject is the same live session.
    pub fn fire(config: &Config, subject: &Subject, action: FilterAction) -> Option<HostEffect> {
        let template = config.chat_protection.command_for(action)?;
        let command = substitute_placeholders(template, subject);
        debug!(slot = %subject.slot, command = %command, "Executing sanction command");
        Some(HostEffect::ExecuteCommand { command })
    }

    pub fn on_subject_disconnect(&mut self, slot: SlotId) {
        self.cooldowns.purge(slot);
    }

    pub fn clear(&mut self) {
        self.cooldowns.clear();
    }

    pub fn tracked(&self) -> usize {
        self.cooldowns.len()
    }
}

/// Log a violation and wrap it as an effect.
pub fn record_violation(
    config: &Config,
    subject: &Subject,
    result: &FilterResult,
    channel: ViolationChannel,
) -> HostEffect {
    metrics::record_violation(result.violation_type.as_str(), channel.as_str());

    if config.chat_protection.log_violations {
        warn!(
            name = %subject.name,
            steam_id = %subject.stable_identity(),
            channel = %channel,
            violation = %result.violation_type,
            reason = %result.reason,
            content = %result.detected_content,
            "Violation"
        );
    }

    HostEffect::RecordViolation(ViolationRecord::new(
        subject,
        result,
        channel,
        &config.server.label,
    ))
}
