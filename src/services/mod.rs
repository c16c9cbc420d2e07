//! Guard orchestration.
//!
//! [`GuardService`] owns every piece of per-session state (the enforcement
//! set, the cooldown map, the slot epochs and the compiled classifier) and is
//! driven through `&mut self` from a single event loop. Each entry point
//! returns the [`HostEffect`]s the host must apply.
//!
//! Deferred work is bound to the slot epoch current when it was scheduled.
//! `on_disconnect` advances the epoch, so nothing scheduled for a departed
//! subject can reach the next occupant of the slot.

pub mod chat;
pub mod cooldown;
pub mod effect;
pub mod enforce;
pub mod sanction;

pub use chat::{ChatDecision, ChatOutcome};
pub use cooldown::{CooldownTracker, ViolationChannel};
pub use effect::{HostEffect, ScheduledTask};
pub use enforce::{IdentityEnforcer, replacement_name};
pub use sanction::{SanctionCoordinator, substitute_placeholders};

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::{Config, reapply};
use crate::filter::TextClassifier;
use crate::notify::Notifier;
use crate::subject::{Epoch, SessionEpochs, SlotId, Subject, SubjectDirectory};

/// Content guard for one session.
pub struct GuardService {
    config: Arc<Config>,
    classifier: TextClassifier,
    enforcer: IdentityEnforcer,
    sanctions: SanctionCoordinator,
    epochs: SessionEpochs,
    notifier: Option<Notifier>,
}

impl GuardService {
    pub fn new(config: Arc<Config>) -> Self {
        let classifier = TextClassifier::new(Arc::clone(&config));
        Self {
            config,
            classifier,
            enforcer: IdentityEnforcer::new(),
            sanctions: SanctionCoordinator::new(),
            epochs: SessionEpochs::new(),
            notifier: None,
        }
    }

    /// Forward violation records to a background notifier.
    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn classifier(&self) -> &TextClassifier {
        &self.classifier
    }

    pub fn enforcer(&self) -> &IdentityEnforcer {
        &self.enforcer
    }

    /// Current connection epoch of `slot`.
    pub fn epoch(&self, slot: SlotId) -> Epoch {
        self.epochs.current(slot)
    }

    // ========================================================================
    // Chat
    // ========================================================================

    pub fn on_chat(&mut self, subject: &Subject, message: &str, team: bool) -> ChatDecision {
        self.on_chat_at(subject, message, team, Instant::now())
    }

    /// Chat hook with an explicit clock.
    pub fn on_chat_at(
        &mut self,
        subject: &Subject,
        message: &str,
        team: bool,
        now: Instant,
    ) -> ChatDecision {
        if !subject.is_valid() || message.is_empty() {
            return ChatDecision::pass();
        }

        let chat = &self.config.chat_protection;

        if team
            && chat::is_admin_chat(message, &chat.admin_chat_prefix)
            && subject.has_permission(&chat.admin_chat_permission)
        {
            debug!(slot = %subject.slot, "Admin chat message; not filtered");
            return ChatDecision::pass();
        }

        if chat::is_command(message, &chat.command_prefixes) {
            debug!(slot = %subject.slot, "Command message; not filtered");
            return ChatDecision::pass();
        }

        if !chat.enabled {
            return ChatDecision::pass();
        }

        let result = self.classifier.classify(message, subject);
        if !result.blocked {
            return ChatDecision::pass();
        }

        debug!(slot = %subject.slot, team, reason = %result.reason, "Chat message blocked");
        let epoch = self.epochs.current(subject.slot);
        let effects = self
            .sanctions
            .handle_chat_violation(&self.config, subject, epoch, &result, team, now);
        self.forward_records(&effects);
        ChatDecision::handled(effects)
    }

    // ========================================================================
    // Names
    // ========================================================================

    /// Check a subject's current display name and enforce on violation.
    pub fn check_name(&mut self, subject: &Subject) -> Vec<HostEffect> {
        if !self.config.name_protection.enabled || !subject.is_valid() {
            return Vec::new();
        }

        let result = self.classifier.check_player_name(&subject.name, subject);
        if !result.blocked {
            return Vec::new();
        }

        debug!(slot = %subject.slot, name = %subject.name, reason = %result.reason, "Display name violation");
        let epoch = self.epochs.current(subject.slot);
        let mut effects = self
            .enforcer
            .handle_name_violation(&self.config, subject, epoch, &result);
        effects.push(sanction::record_violation(
            &self.config,
            subject,
            &result,
            ViolationChannel::Name,
        ));
        self.forward_records(&effects);
        effects
    }

    /// The host could not apply a committed rename.
    pub fn rename_rejected(&mut self, slot: SlotId, reason: &str) {
        self.enforcer.rename_rejected(slot, reason);
    }

    // ========================================================================
    // Lifecycle triggers
    // ========================================================================

    /// Subject finished connecting: schedule its name check and reapply passes.
    pub fn on_connect_full(&mut self, subject: &Subject) -> Vec<HostEffect> {
        if !subject.is_valid() {
            return Vec::new();
        }

        let schedule = &self.config.reapply;
        let delay = reapply::seconds(schedule.name_check_delay).unwrap_or(Duration::ZERO);
        let mut effects = vec![HostEffect::Schedule {
            delay,
            task: ScheduledTask::CheckName {
                slot: subject.slot,
                epoch: self.epochs.current(subject.slot),
            },
        }];
        effects.extend(effect::reapply_passes(&reapply::delays(&schedule.on_connect)));
        effects
    }

    /// Purge all slot-keyed state and advance the slot's epoch. Runs before
    /// the slot can be reused.
    pub fn on_disconnect(&mut self, slot: SlotId) {
        self.enforcer.on_subject_disconnect(slot);
        self.sanctions.on_subject_disconnect(slot);
        let epoch = self.epochs.end_session(slot);
        debug!(slot = %slot, epoch, "Cleaned up state for disconnected subject");
    }

    pub fn on_round_start(&mut self) -> Vec<HostEffect> {
        debug!("Round start; scheduling name reapplication");
        effect::reapply_passes(&reapply::delays(&self.config.reapply.round_start))
    }

    pub fn on_round_end(&mut self) -> Vec<HostEffect> {
        debug!("Round end; scheduling name reapplication");
        effect::reapply_passes(&reapply::delays(&self.config.reapply.round_end))
    }

    pub fn on_spawn(&mut self, subject: &Subject) -> Vec<HostEffect> {
        if !subject.is_valid() {
            return Vec::new();
        }
        effect::reapply_passes(&reapply::delays(&self.config.reapply.spawn))
    }

    pub fn on_death(&mut self, subject: &Subject) -> Vec<HostEffect> {
        if !subject.is_valid() {
            return Vec::new();
        }
        effect::reapply_passes(&reapply::delays(&self.config.reapply.death))
    }

    /// Run a due scheduled task.
    pub fn fire(&mut self, task: ScheduledTask, directory: &dyn SubjectDirectory) -> Vec<HostEffect> {
        debug!(task = task.kind(), "Firing scheduled task");
        match task {
            ScheduledTask::Reapply => {
                self.enforcer
                    .reapply_all(&self.config.name_protection, directory, &self.epochs)
            }
            ScheduledTask::CheckName { slot, epoch } => {
                match live(directory, &self.epochs, slot, epoch) {
                    Some(subject) => self.check_name(&subject),
                    None => Vec::new(),
                }
            }
            ScheduledTask::Sanction {
                slot,
                epoch,
                action,
            } => live(directory, &self.epochs, slot, epoch)
                .and_then(|subject| SanctionCoordinator::fire(&self.config, &subject, action))
                .into_iter()
                .collect(),
            ScheduledTask::NotifyPlayer {
                slot,
                epoch,
                message,
            } => live(directory, &self.epochs, slot, epoch)
                .map(|subject| HostEffect::NotifyPlayer {
                    slot: subject.slot,
                    message,
                })
                .into_iter()
                .collect(),
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Swap in a new policy snapshot and re-check every live name.
    pub fn reload(&mut self, config: Arc<Config>, directory: &dyn SubjectDirectory) -> Vec<HostEffect> {
        self.classifier = TextClassifier::new(Arc::clone(&config));
        self.config = config;
        info!("Configuration reloaded");
        self.check_existing_subjects(directory)
    }

    /// Check the names of everyone already connected.
    pub fn check_existing_subjects(&mut self, directory: &dyn SubjectDirectory) -> Vec<HostEffect> {
        let mut subjects = directory.subjects();
        subjects.sort_by_key(|s| s.slot);

        subjects
            .iter()
            .filter(|s| s.is_valid() && !s.name.trim().is_empty())
            .flat_map(|s| self.check_name(s))
            .collect()
    }

    /// Drop all session state.
    pub fn shutdown(&mut self) {
        self.enforcer.clear_all();
        self.sanctions.clear();
        info!("Guard state cleared");
    }

    fn forward_records(&self, effects: &[HostEffect]) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        for effect in effects {
            if let HostEffect::RecordViolation(record) = effect {
                if self.config.webhook.should_log(record.violation_type) {
                    // Queue errors are logged by the notifier.
                    let _ = notifier.submit(record.clone());
                }
            }
        }
    }
}

/// Resolve a slot only if it still holds the session a task was scheduled for.
fn live(
    directory: &dyn SubjectDirectory,
    epochs: &SessionEpochs,
    slot: SlotId,
    epoch: Epoch,
) -> Option<Subject> {
    if !epochs.is_current(slot, epoch) {
        debug!(slot = %slot, epoch, "Slot changed hands; dropping task");
        return None;
    }
    let subject = directory.subject(slot).filter(Subject::is_valid);
    if subject.is_none() {
        debug!(slot = %slot, "Subject gone; dropping task");
    }
    subject
}
