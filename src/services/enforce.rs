//! Forced display-name enforcement.
//!
//! The enforcer remembers which slots carry a replacement name and re-derives
//! that name whenever the host may have reset it. Renames are two-phase: the
//! slot is registered here synchronously, and a [`HostEffect::CommitRename`]
//! is applied by the host on its next tick.

use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, error, info};

use super::effect::{HostEffect, ScheduledTask};
use crate::config::{Config, NameProtectionConfig, reapply};
use crate::error::EnforceError;
use crate::filter::FilterResult;
use crate::metrics;
use crate::subject::{Epoch, SessionEpochs, SlotId, Subject, SubjectDirectory};

/// Replacement name for `subject`.
///
/// Deterministic when the subject has a user id. Without one the suffix is
/// random, so repeated calls (and therefore reapply passes) can produce
/// different names for the same subject. That drift is accepted.
pub fn replacement_name(config: &NameProtectionConfig, subject: &Subject) -> String {
    let base = config.replacement_name.trim();
    if !config.add_userid_suffix {
        return base.to_string();
    }

    match subject.user_id {
        Some(user_id) => format!("{base}_{user_id}"),
        None => {
            let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
            debug!(slot = %subject.slot, suffix, "No user id; using random replacement suffix");
            format!("{base}_{suffix}")
        }
    }
}

/// Enforcement set keyed by slot.
#[derive(Debug, Default)]
pub struct IdentityEnforcer {
    enforced: HashSet<SlotId>,
}

impl IdentityEnforcer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enforced(&self, slot: SlotId) -> bool {
        self.enforced.contains(&slot)
    }

    pub fn len(&self) -> usize {
        self.enforced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enforced.is_empty()
    }

    /// Enforce a replacement name after a blocked name check.
    ///
    /// `epoch` is the slot's current connection epoch; the commit and any
    /// delayed notice are bound to it. Returns the commit effect and any
    /// notices. On failure nothing is registered and no effects are returned.
    pub fn handle_name_violation(
        &mut self,
        config: &Config,
        subject: &Subject,
        epoch: Epoch,
        result: &FilterResult,
    ) -> Vec<HostEffect> {
        let protection = &config.name_protection;
        if !protection.enabled || !subject.is_valid() {
            debug!(slot = %subject.slot, "Name protection disabled or subject invalid");
            return Vec::new();
        }

        debug!(slot = %subject.slot, reason = %result.reason, "Handling name violation");

        let (new_name, commit) = match self.propose_rename(protection, subject, epoch) {
            Ok(proposed) => proposed,
            Err(e) => {
                error!(slot = %subject.slot, error = %e, code = e.error_code(), "Failed to enforce replacement name");
                metrics::record_rename("failed");
                return Vec::new();
            }
        };
        metrics::record_rename("proposed");

        let mut effects = vec![commit];

        if protection.notify_player {
            let message = config.messages.notice(&config.messages.name_changed);
            let effect = match reapply::seconds(config.reapply.name_notice_delay) {
                Some(delay) if !delay.is_zero() => HostEffect::Schedule {
                    delay,
                    task: ScheduledTask::NotifyPlayer {
                        slot: subject.slot,
                        epoch,
                        message,
                    },
                },
                _ => HostEffect::NotifyPlayer {
                    slot: subject.slot,
                    message,
                },
            };
            effects.push(effect);
        }

        if protection.notify_admins {
            let message = config.messages.admin_violation(
                &config.messages.admin_name_change,
                &new_name,
                &result.reason,
                &result.detected_content,
            );
            info!("{}", message);
            effects.push(HostEffect::NotifyAdmins {
                permission: config.chat_protection.admin_notify_permission.clone(),
                message,
            });
        }

        effects
    }

    /// Phase one of a rename: derive the name and register the slot.
    fn propose_rename(
        &mut self,
        config: &NameProtectionConfig,
        subject: &Subject,
        epoch: Epoch,
    ) -> Result<(String, HostEffect), EnforceError> {
        let new_name = replacement_name(config, subject);
        if new_name.trim().is_empty() {
            return Err(EnforceError::EmptyReplacement);
        }

        self.enforced.insert(subject.slot);
        metrics::set_enforced_subjects(self.enforced.len());
        info!(slot = %subject.slot, old_name = %subject.name, new_name = %new_name, "Enforcing replacement name");

        let commit = HostEffect::CommitRename {
            slot: subject.slot,
            epoch,
            new_name: new_name.clone(),
        };
        Ok((new_name, commit))
    }

    /// Re-apply every enforced name that the host has reset.
    ///
    /// Slots whose subject is gone are dropped. Subjects already carrying
    /// the expected name produce no effect.
    pub fn reapply_all(
        &mut self,
        config: &NameProtectionConfig,
        directory: &dyn SubjectDirectory,
        epochs: &SessionEpochs,
    ) -> Vec<HostEffect> {
        debug!(count = self.enforced.len(), "Reapplying enforced names");

        let mut slots: Vec<SlotId> = self.enforced.iter().copied().collect();
        slots.sort_unstable();

        let mut effects = Vec::new();
        for slot in slots {
            let subject = match directory.subject(slot) {
                Some(subject) if subject.is_valid() => subject,
                _ => {
                    self.enforced.remove(&slot);
                    debug!(slot = %slot, "Removed stale slot from enforcement set");
                    continue;
                }
            };

            let expected = replacement_name(config, &subject);
            if subject.name == expected {
                debug!(slot = %slot, name = %expected, "Replacement name still in place");
                continue;
            }

            debug!(slot = %slot, current = %subject.name, expected = %expected, "Reapplying replacement name");
            metrics::record_rename("reapplied");
            effects.push(HostEffect::CommitRename {
                slot,
                epoch: epochs.current(slot),
                new_name: expected,
            });
        }

        metrics::set_enforced_subjects(self.enforced.len());
        effects
    }

    /// Drop a slot on disconnect. Must run before the slot can be reused.
    pub fn on_subject_disconnect(&mut self, slot: SlotId) -> bool {
        let removed = self.enforced.remove(&slot);
        if removed {
            debug!(slot = %slot, "Cleared enforcement for disconnected subject");
            metrics::set_enforced_subjects(self.enforced.len());
        }
        removed
    }

    /// The host failed to commit a rename. Membership is revoked; no retry.
    pub fn rename_rejected(&mut self, slot: SlotId, reason: &str) -> EnforceError {
        let err = EnforceError::Rejected {
            slot,
            reason: reason.to_string(),
        };
        self.enforced.remove(&slot);
        metrics::record_rename("rejected");
        metrics::set_enforced_subjects(self.enforced.len());
        error!(slot = %slot, error = %err, code = err.error_code(), "Replacement name was not applied");
        err
    }

    pub fn clear_all(&mut self) {
        self.enforced.clear();
        metrics::set_enforced_subjects(0);
        debug!("Enforcement set cleared");
    }
}
